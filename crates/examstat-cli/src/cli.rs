//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Examstat: examination results analysis tool
#[derive(Parser)]
#[command(name = "examstat")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Analysis options shared by the analyze and report commands.
#[derive(Args)]
pub struct AnalysisOpts {
    /// Global pass threshold on the score scale
    #[arg(short, long, default_value = "40")]
    pub threshold: f64,

    /// Per-subject threshold override, as SUBJECT=MARK (repeatable)
    #[arg(long = "subject-threshold", value_name = "SUBJECT=MARK")]
    pub subject_thresholds: Vec<String>,

    /// Decimal places for displayed numbers
    #[arg(short, long, default_value = "2")]
    pub precision: usize,

    /// Replace student IDs and names with opaque aliases
    #[arg(long)]
    pub mask_ids: bool,

    /// Anomaly sensitivity in standard deviations
    #[arg(long, default_value = "3.0")]
    pub sensitivity: f64,

    /// How many top performers to list
    #[arg(long, default_value = "10")]
    pub top: usize,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a results file without analyzing it
    Validate {
        /// Path to the results file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Analyze a results file and print summary statistics
    Analyze {
        /// Path to the results file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output the full analysis as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        opts: AnalysisOpts,
    },

    /// Analyze a results file and render the markdown report
    Report {
        /// Path to the results file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        opts: AnalysisOpts,
    },
}
