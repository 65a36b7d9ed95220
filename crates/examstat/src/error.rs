//! Error types for the examstat library.

use std::path::PathBuf;
use thiserror::Error;

use crate::validation::ValidationFailure;

/// Main error type for examstat operations.
#[derive(Debug, Error)]
pub enum ExamstatError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Empty file or no data to analyze.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The dataset failed validation; carries every collected issue.
    #[error("{0}")]
    Validation(ValidationFailure),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for examstat operations.
pub type Result<T> = std::result::Result<T, ExamstatError>;
