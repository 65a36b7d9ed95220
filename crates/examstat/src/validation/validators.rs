//! Dataset validation: structural and data-quality checks.

use std::collections::HashMap;

use crate::config::AnalysisConfig;
use crate::error::{ExamstatError, Result};
use crate::input::DataTable;

use super::issue::{IssueKind, Severity, ValidationFailure, ValidationIssue};

/// Required identifier column.
pub const ID_COLUMN: &str = "Student_ID";
/// Required name column.
pub const NAME_COLUMN: &str = "Student_Name";

/// A subject column identified during validation.
#[derive(Debug, Clone)]
pub struct Subject {
    /// Column header.
    pub name: String,
    /// Zero-based position in the table.
    pub position: usize,
}

/// A validated dataset: the table plus its resolved column layout.
///
/// A `Roster` can only be obtained through [`RosterValidator`]; holding one
/// proves the structural checks passed and every present score is numeric
/// and in range. Scores may still be missing for individual students.
#[derive(Debug, Clone)]
pub struct Roster<'a> {
    table: &'a DataTable,
    id_col: usize,
    name_col: usize,
    subjects: Vec<Subject>,
}

impl<'a> Roster<'a> {
    /// Number of student rows.
    pub fn student_count(&self) -> usize {
        self.table.row_count()
    }

    /// The identified subject columns, in file order.
    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    /// Student ID for a row.
    pub fn student_id(&self, row: usize) -> &str {
        self.table.get(row, self.id_col).unwrap_or("").trim()
    }

    /// Student name for a row.
    pub fn student_name(&self, row: usize) -> &str {
        self.table.get(row, self.name_col).unwrap_or("").trim()
    }

    /// Score for a row in one subject, `None` when missing.
    ///
    /// Non-numeric cells also yield `None`; validation has already rejected
    /// tables containing them, this only guards a hand-built roster.
    pub fn score(&self, row: usize, subject: &Subject) -> Option<f64> {
        let cell = self.table.get(row, subject.position)?;
        match DataTable::score_value(cell) {
            Some(Ok(v)) => Some(v),
            _ => None,
        }
    }

    /// All valid scores for one subject with their row indices.
    pub fn subject_scores(&self, subject: &Subject) -> Vec<(usize, f64)> {
        (0..self.student_count())
            .filter_map(|row| self.score(row, subject).map(|v| (row, v)))
            .collect()
    }
}

/// Outcome of validating one dataset.
#[derive(Debug)]
pub struct ValidationOutcome<'a> {
    /// Every issue found, errors and warnings together.
    pub issues: Vec<ValidationIssue>,
    /// The validated roster, present only when no errors were found.
    pub roster: Option<Roster<'a>>,
}

impl<'a> ValidationOutcome<'a> {
    /// Whether the dataset may proceed to analysis.
    pub fn is_valid(&self) -> bool {
        self.roster.is_some()
    }

    /// Issues with error severity.
    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    /// Issues with warning severity.
    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
    }

    /// Extract the roster and remaining warnings, or a structured failure
    /// carrying every collected issue.
    pub fn into_roster(self) -> Result<(Roster<'a>, Vec<ValidationIssue>)> {
        match self.roster {
            Some(roster) => Ok((roster, self.issues)),
            None => Err(ExamstatError::Validation(ValidationFailure {
                issues: self.issues,
            })),
        }
    }
}

/// Validates a decoded table before analysis.
///
/// All violations are collected rather than failing on the first, so a user
/// can fix a file in one pass.
pub struct RosterValidator {
    min_score: f64,
    max_score: f64,
}

impl RosterValidator {
    /// Create a validator using the score range from a configuration.
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            min_score: config.score_range.0,
            max_score: config.score_range.1,
        }
    }

    /// Run every check against a table.
    pub fn validate<'a>(&self, table: &'a DataTable) -> ValidationOutcome<'a> {
        let mut issues = Vec::new();

        // Structural checks. Later checks depend on the layout these
        // establish, so a structural failure stops here.
        if table.row_count() == 0 {
            issues.push(ValidationIssue::error(
                IssueKind::EmptyDataset,
                "The file is empty or contains no data rows",
            ));
            return ValidationOutcome {
                issues,
                roster: None,
            };
        }

        for required in [ID_COLUMN, NAME_COLUMN] {
            if table.column_position(required).is_none() {
                issues.push(
                    ValidationIssue::error(
                        IssueKind::MissingColumn,
                        format!("Missing required column '{}'", required),
                    )
                    .in_column(required),
                );
            }
        }

        let subjects: Vec<Subject> = table
            .headers
            .iter()
            .enumerate()
            .filter(|(_, h)| h.as_str() != ID_COLUMN && h.as_str() != NAME_COLUMN)
            .map(|(position, name)| Subject {
                name: name.clone(),
                position,
            })
            .collect();

        if subjects.is_empty() {
            issues.push(ValidationIssue::error(
                IssueKind::NoSubjects,
                "No subject columns found; the file needs at least one subject with numeric scores",
            ));
        }

        if !issues.is_empty() {
            return ValidationOutcome {
                issues,
                roster: None,
            };
        }

        let id_col = table.column_position(ID_COLUMN).unwrap();
        let name_col = table.column_position(NAME_COLUMN).unwrap();

        self.check_identifiers(table, id_col, &mut issues);
        self.check_names(table, name_col, &mut issues);
        for subject in &subjects {
            self.check_subject(table, subject, &mut issues);
        }
        self.check_dataset_quality(table, &subjects, &mut issues);

        let roster = if issues.iter().any(|i| i.severity == Severity::Error) {
            None
        } else {
            Some(Roster {
                table,
                id_col,
                name_col,
                subjects,
            })
        };

        ValidationOutcome { issues, roster }
    }

    /// Student IDs must be present and unique.
    fn check_identifiers(&self, table: &DataTable, id_col: usize, issues: &mut Vec<ValidationIssue>) {
        let mut first_seen: HashMap<String, usize> = HashMap::new();

        for (row_idx, value) in table.column_values(id_col).enumerate() {
            let row = row_idx + 1;
            let id = value.trim();

            if DataTable::is_null_value(id) {
                issues.push(
                    ValidationIssue::error(
                        IssueKind::MissingId,
                        format!("row {}: missing student ID", row),
                    )
                    .at_row(row)
                    .in_column(ID_COLUMN),
                );
                continue;
            }

            if let Some(&original) = first_seen.get(id) {
                issues.push(
                    ValidationIssue::error(
                        IssueKind::DuplicateId,
                        format!(
                            "row {}: duplicate student ID '{}' (first seen at row {})",
                            row, id, original
                        ),
                    )
                    .at_row(row)
                    .in_column(ID_COLUMN),
                );
            } else {
                first_seen.insert(id.to_string(), row);
            }
        }
    }

    /// Names are advisory: missing or duplicated names warn but never block.
    fn check_names(&self, table: &DataTable, name_col: usize, issues: &mut Vec<ValidationIssue>) {
        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut missing = 0usize;

        for (row_idx, value) in table.column_values(name_col).enumerate() {
            let row = row_idx + 1;
            let name = value.trim();

            if DataTable::is_null_value(name) {
                missing += 1;
                continue;
            }

            if let Some(&original) = seen.get(name) {
                issues.push(
                    ValidationIssue::warning(
                        IssueKind::DuplicateName,
                        format!(
                            "rows {} and {}: students share the name '{}'; verify they are different students",
                            original, row, name
                        ),
                    )
                    .at_row(row)
                    .in_column(NAME_COLUMN),
                );
            } else {
                seen.insert(name.to_string(), row);
            }
        }

        if missing > 0 {
            issues.push(
                ValidationIssue::warning(
                    IssueKind::MissingName,
                    format!("{} student(s) have no name", missing),
                )
                .in_column(NAME_COLUMN),
            );
        }
    }

    /// Every present score must be numeric and inside the valid range.
    fn check_subject(&self, table: &DataTable, subject: &Subject, issues: &mut Vec<ValidationIssue>) {
        let mut valid: Vec<f64> = Vec::new();
        let mut missing = 0usize;

        for (row_idx, cell) in table.column_values(subject.position).enumerate() {
            let row = row_idx + 1;
            match DataTable::score_value(cell) {
                None => missing += 1,
                Some(Err(())) => {
                    issues.push(
                        ValidationIssue::error(
                            IssueKind::NonNumericScore,
                            format!(
                                "row {}: non-numeric score '{}' for subject {}",
                                row,
                                cell.trim(),
                                subject.name
                            ),
                        )
                        .at_row(row)
                        .in_column(&subject.name),
                    );
                }
                Some(Ok(score)) => {
                    if score < self.min_score {
                        issues.push(
                            ValidationIssue::error(
                                IssueKind::ScoreOutOfRange,
                                format!(
                                    "row {}: score {} below min {} for subject {}",
                                    row, score, self.min_score, subject.name
                                ),
                            )
                            .at_row(row)
                            .in_column(&subject.name),
                        );
                    } else if score > self.max_score {
                        issues.push(
                            ValidationIssue::error(
                                IssueKind::ScoreOutOfRange,
                                format!(
                                    "row {}: score {} exceeds max {} for subject {}",
                                    row, score, self.max_score, subject.name
                                ),
                            )
                            .at_row(row)
                            .in_column(&subject.name),
                        );
                    }
                    valid.push(score);
                }
            }
        }

        let total = table.row_count();

        if valid.is_empty() {
            issues.push(
                ValidationIssue::warning(
                    IssueKind::EmptySubject,
                    format!("Subject {} has no valid scores", subject.name),
                )
                .in_column(&subject.name),
            );
            return;
        }

        if valid.len() < 3 {
            issues.push(
                ValidationIssue::warning(
                    IssueKind::SparseSubject,
                    format!(
                        "Subject {} has fewer than 3 valid scores",
                        subject.name
                    ),
                )
                .in_column(&subject.name),
            );
        }

        let (first, rest) = valid.split_first().unwrap();
        if !rest.is_empty() && rest.iter().all(|v| v == first) {
            issues.push(
                ValidationIssue::warning(
                    IssueKind::ConstantSubject,
                    format!(
                        "Subject {} has the identical score {} for every student",
                        subject.name, first
                    ),
                )
                .in_column(&subject.name),
            );
        }

        let missing_pct = (missing as f64 / total as f64) * 100.0;
        if missing_pct > 20.0 {
            issues.push(
                ValidationIssue::warning(
                    IssueKind::SparseSubject,
                    format!(
                        "Subject {} has {:.1}% missing values",
                        subject.name, missing_pct
                    ),
                )
                .in_column(&subject.name),
            );
        }

        let multiples_of_5 = valid.iter().filter(|v| *v % 5.0 == 0.0).count();
        if valid.len() >= 5 && multiples_of_5 as f64 > valid.len() as f64 * 0.8 {
            issues.push(
                ValidationIssue::warning(
                    IssueKind::RoundedScores,
                    format!(
                        "Subject {} has an unusually high share of scores that are multiples of 5",
                        subject.name
                    ),
                )
                .in_column(&subject.name),
            );
        }
    }

    /// Cross-subject quality checks over the whole dataset.
    fn check_dataset_quality(
        &self,
        table: &DataTable,
        subjects: &[Subject],
        issues: &mut Vec<ValidationIssue>,
    ) {
        if table.row_count() < 5 {
            issues.push(ValidationIssue::warning(
                IssueKind::SmallDataset,
                "Dataset contains fewer than 5 students; statistics may not be meaningful",
            ));
        }

        let mut unscored = 0usize;
        let mut any_score = false;

        for row in 0..table.row_count() {
            let has_score = subjects.iter().any(|s| {
                table
                    .get(row, s.position)
                    .map(|cell| matches!(DataTable::score_value(cell), Some(Ok(_))))
                    .unwrap_or(false)
            });
            if has_score {
                any_score = true;
            } else {
                unscored += 1;
            }
        }

        if !any_score {
            issues.push(ValidationIssue::error(
                IssueKind::EmptyDataset,
                "All subject columns are empty; no scores available for analysis",
            ));
        } else if unscored > 0 {
            issues.push(ValidationIssue::warning(
                IssueKind::UnscoredStudent,
                format!("{} student(s) have no scores in any subject", unscored),
            ));
        }
    }
}
