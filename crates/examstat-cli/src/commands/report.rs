//! Report command - render the markdown report.

use std::fs;
use std::path::PathBuf;

use colored::Colorize;
use examstat::Examstat;

use crate::cli::AnalysisOpts;
use super::build_config;

pub fn run(
    file: PathBuf,
    output: Option<PathBuf>,
    opts: AnalysisOpts,
    _verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let config = build_config(&opts)?;
    let report = Examstat::with_config(config).report_file(&file)?;

    match output {
        Some(path) => {
            fs::write(&path, &report)?;
            eprintln!(
                "{} {}",
                "Report written to".green().bold(),
                path.display().to_string().white()
            );
        }
        None => print!("{}", report),
    }

    Ok(())
}
