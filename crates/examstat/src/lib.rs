//! Examstat: analysis pipeline for student examination spreadsheets.
//!
//! Examstat reads a delimited spreadsheet export of examination scores,
//! validates it, computes descriptive statistics and pass/fail analytics,
//! and renders a markdown report.
//!
//! # Core Principles
//!
//! - **Validate once**: column access is resolved at the ingestion boundary
//!   into a typed [`Roster`]; analysis never re-checks the layout
//! - **Collect, don't fail fast**: validation reports every problem in a
//!   file so it can be fixed in one pass
//! - **Pure pipeline**: each stage is a function of its inputs; nothing is
//!   persisted and repeated runs are deterministic
//!
//! # Example
//!
//! ```no_run
//! use examstat::{AnalysisConfig, Examstat};
//!
//! let pipeline = Examstat::with_config(AnalysisConfig::new().with_pass_threshold(40.0));
//! let analysis = pipeline.analyze_file("results.csv").unwrap();
//!
//! println!("Pass rate: {:.1}%", analysis.result.summary.overall_pass_rate);
//! println!("{}", pipeline.render(&analysis.result));
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod input;
pub mod report;
pub mod validation;

mod examstat;

pub use crate::examstat::{ExamAnalysis, Examstat, ValidationReport};
pub use analysis::{
    AnalysisResult, Anomaly, AnomalyKind, ExamAnalyzer, ExamSummary, StudentStats, SubjectStats,
    TopPerformer,
};
pub use config::AnalysisConfig;
pub use error::{ExamstatError, Result};
pub use input::{DataTable, Parser, SourceMetadata};
pub use report::ReportGenerator;
pub use validation::{
    IssueKind, Roster, RosterValidator, Severity, ValidationFailure, ValidationIssue,
};
