//! Validate command - check a results file without analyzing it.

use std::path::PathBuf;

use colored::Colorize;
use examstat::{Examstat, Severity};

pub fn run(file: PathBuf, json: bool, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let report = Examstat::new().validate_file(&file)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{} {}",
            "Validating".cyan().bold(),
            file.display().to_string().white()
        );
        println!(
            "  {} rows, {} columns ({})",
            report.source.row_count, report.source.column_count, report.source.format
        );

        if verbose && !report.subjects.is_empty() {
            println!("  Subjects: {}", report.subjects.join(", "));
        }
        println!();

        for issue in &report.issues {
            let severity = match issue.severity {
                Severity::Error => "error".red().bold(),
                Severity::Warning => "warning".yellow(),
            };
            println!("  {}: {}", severity, issue.message);
        }

        if report.issues.is_empty() {
            println!("{}", "No issues found - data looks clean!".green());
        } else {
            let errors = report
                .issues
                .iter()
                .filter(|i| i.severity == Severity::Error)
                .count();
            let warnings = report.issues.len() - errors;
            println!();
            println!(
                "Found {} issue(s) ({} errors, {} warnings)",
                report.issues.len().to_string().white().bold(),
                errors.to_string().red(),
                warnings.to_string().yellow()
            );
        }
    }

    if !report.is_valid {
        std::process::exit(1);
    }
    Ok(())
}
