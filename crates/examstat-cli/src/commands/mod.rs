//! Command implementations.

pub mod analyze;
pub mod report;
pub mod validate;

use examstat::AnalysisConfig;

use crate::cli::AnalysisOpts;

/// Build a library configuration from the shared CLI options.
pub fn build_config(opts: &AnalysisOpts) -> Result<AnalysisConfig, Box<dyn std::error::Error>> {
    let mut config = AnalysisConfig::new()
        .with_pass_threshold(opts.threshold)
        .with_precision(opts.precision)
        .with_masking(opts.mask_ids)
        .with_sensitivity(opts.sensitivity);
    config.top_n = opts.top;

    for spec in &opts.subject_thresholds {
        let (subject, mark) = spec
            .split_once('=')
            .ok_or_else(|| format!("Invalid subject threshold '{}', expected SUBJECT=MARK", spec))?;
        let mark: f64 = mark
            .parse()
            .map_err(|_| format!("Invalid mark '{}' in subject threshold '{}'", mark, spec))?;
        config = config.with_subject_threshold(subject, mark);
    }

    config.validate()?;
    Ok(config)
}
