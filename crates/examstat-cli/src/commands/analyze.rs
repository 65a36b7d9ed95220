//! Analyze command - run the pipeline and print summary statistics.

use std::path::PathBuf;

use colored::Colorize;
use examstat::Examstat;

use crate::cli::AnalysisOpts;
use super::build_config;

pub fn run(
    file: PathBuf,
    json: bool,
    opts: AnalysisOpts,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let config = build_config(&opts)?;
    let pipeline = Examstat::with_config(config);
    let analysis = pipeline.analyze_file(&file)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Analyzed".cyan().bold(),
        file.display().to_string().white()
    );
    println!();

    let summary = &analysis.result.summary;
    println!(
        "  Students: {}   Subjects: {}",
        summary.total_students.to_string().white().bold(),
        summary.total_subjects.to_string().white().bold()
    );
    println!(
        "  Overall pass rate: {} ({} passed all, {} failed at least one)",
        format!("{:.1}%", summary.overall_pass_rate).white().bold(),
        summary.passed_all.to_string().green(),
        summary.failed_any.to_string().red()
    );
    if let Some(mean) = summary.mean_score {
        println!("  Mean score: {:.1}", mean);
    }

    if let Some(top) = analysis.result.top_performer() {
        // Honor masking in the terminal summary too, not just the report
        let label = if opts.mask_ids {
            analysis
                .result
                .alias_for(&top.student_id)
                .unwrap_or_else(|| "Student_????".to_string())
        } else {
            top.name.clone()
        };
        println!(
            "  Top performer: {} (average {:.1})",
            label.white().bold(),
            top.average
        );
    }
    println!();

    println!("{}", "Subjects:".yellow().bold());
    for subject in &analysis.result.subjects {
        let rate = subject
            .pass_rate
            .map(|r| format!("{:.1}%", r))
            .unwrap_or_else(|| "N/A".to_string());
        let mean = subject
            .summary
            .map(|s| format!("{:.1}", s.mean))
            .unwrap_or_else(|| "N/A".to_string());
        println!(
            "  {:20} {:3} scores   pass rate {:>7}   mean {:>6}",
            subject.subject, subject.count, rate, mean
        );
    }

    if !analysis.result.anomalies.is_empty() {
        println!();
        println!(
            "{} {}",
            analysis.result.anomalies.len().to_string().yellow().bold(),
            "anomalies flagged for review".yellow()
        );
        if verbose {
            for anomaly in &analysis.result.anomalies {
                println!("  - {}", anomaly.description);
            }
        }
    }

    if !analysis.warnings.is_empty() {
        println!();
        println!(
            "{} validation warning(s)",
            analysis.warnings.len().to_string().yellow()
        );
        if verbose {
            for warning in &analysis.warnings {
                println!("  - {}", warning.message);
            }
        }
    }

    println!();
    println!(
        "Run {} for the full report",
        format!("examstat report {}", file.display()).cyan().bold()
    );

    Ok(())
}
