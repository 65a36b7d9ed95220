//! Validation of decoded datasets before analysis.

mod issue;
mod validators;

pub use issue::{IssueKind, Severity, ValidationFailure, ValidationIssue};
pub use validators::{
    Roster, RosterValidator, Subject, ValidationOutcome, ID_COLUMN, NAME_COLUMN,
};
