//! Structured validation issues.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What kind of problem a validation check found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// A required column is absent.
    MissingColumn,
    /// No subject columns beyond the required ones.
    NoSubjects,
    /// The file parsed but holds no student rows.
    EmptyDataset,
    /// A student row has no ID.
    MissingId,
    /// The same student ID appears more than once.
    DuplicateId,
    /// A score cell is present but not numeric.
    NonNumericScore,
    /// A score falls outside the configured valid range.
    ScoreOutOfRange,
    /// A student row has no name.
    MissingName,
    /// Two students share a name.
    DuplicateName,
    /// Too few students for meaningful statistics.
    SmallDataset,
    /// A subject column has no valid scores.
    EmptySubject,
    /// Every score in a subject is identical.
    ConstantSubject,
    /// A subject has a high share of missing scores.
    SparseSubject,
    /// A student has no scores in any subject.
    UnscoredStudent,
    /// Score distribution suggests data entry rounding.
    RoundedScores,
}

impl IssueKind {
    /// Get a human-readable label for the issue kind.
    pub fn label(&self) -> &'static str {
        match self {
            IssueKind::MissingColumn => "Missing Column",
            IssueKind::NoSubjects => "No Subject Columns",
            IssueKind::EmptyDataset => "Empty Dataset",
            IssueKind::MissingId => "Missing Student ID",
            IssueKind::DuplicateId => "Duplicate Student ID",
            IssueKind::NonNumericScore => "Non-numeric Score",
            IssueKind::ScoreOutOfRange => "Score Out of Range",
            IssueKind::MissingName => "Missing Student Name",
            IssueKind::DuplicateName => "Duplicate Student Name",
            IssueKind::SmallDataset => "Small Dataset",
            IssueKind::EmptySubject => "Empty Subject",
            IssueKind::ConstantSubject => "Constant Subject",
            IssueKind::SparseSubject => "Sparse Subject",
            IssueKind::UnscoredStudent => "Unscored Student",
            IssueKind::RoundedScores => "Rounded Scores",
        }
    }
}

/// Severity of a validation issue.
///
/// Errors block analysis; warnings are advisory and analysis proceeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Warning => "Warning",
            Severity::Error => "Error",
        }
    }
}

/// One problem found while validating a dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Kind of problem.
    pub kind: IssueKind,
    /// Whether this blocks analysis.
    pub severity: Severity,
    /// 1-based data row, when the issue points at a specific row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    /// Affected column, when the issue points at one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// Human-readable description.
    pub message: String,
}

impl ValidationIssue {
    /// Create an error-severity issue.
    pub fn error(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Error,
            row: None,
            column: None,
            message: message.into(),
        }
    }

    /// Create a warning-severity issue.
    pub fn warning(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: Severity::Warning,
            row: None,
            column: None,
            message: message.into(),
        }
    }

    /// Attach a 1-based row number.
    pub fn at_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    /// Attach a column name.
    pub fn in_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity.label().to_lowercase(), self.message)
    }
}

/// The collected issues of a failed validation, carried inside
/// [`ExamstatError::Validation`](crate::ExamstatError::Validation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationFailure {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationFailure {
    /// Issues with error severity.
    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let error_count = self.errors().count();
        writeln!(f, "Dataset failed validation with {} error(s):", error_count)?;
        for issue in self.errors() {
            writeln!(f, "  - {}", issue.message)?;
        }
        Ok(())
    }
}
