//! Main Examstat struct and public API.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisResult, ExamAnalyzer};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::input::{Parser, ParserConfig, SourceMetadata};
use crate::report::ReportGenerator;
use crate::validation::{RosterValidator, ValidationIssue};

/// Result of running the full pipeline over one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamAnalysis {
    /// Metadata about the source file.
    pub source: SourceMetadata,
    /// Advisory warnings collected during validation.
    pub warnings: Vec<ValidationIssue>,
    /// The computed statistics.
    pub result: AnalysisResult,
}

/// Result of validating one file without analyzing it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Metadata about the source file.
    pub source: SourceMetadata,
    /// Whether the dataset may proceed to analysis.
    pub is_valid: bool,
    /// Every collected issue, errors and warnings together.
    pub issues: Vec<ValidationIssue>,
    /// The identified subject columns, when validation passed.
    pub subjects: Vec<String>,
}

/// The examination analysis pipeline: decode, validate, analyze, report.
///
/// Holds only immutable configuration; every invocation is independent and
/// all per-run state is discarded when the call returns.
pub struct Examstat {
    config: AnalysisConfig,
    parser: Parser,
}

impl Examstat {
    /// Create a pipeline with default configuration.
    pub fn new() -> Self {
        Self::with_config(AnalysisConfig::default())
    }

    /// Create a pipeline with a custom configuration.
    pub fn with_config(config: AnalysisConfig) -> Self {
        Self {
            config,
            parser: Parser::with_config(ParserConfig::default()),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Validate a file without running the analysis.
    ///
    /// Unlike [`analyze_file`](Self::analyze_file) this never fails on a bad
    /// dataset; the collected issues are the payload.
    pub fn validate_file(&self, path: impl AsRef<Path>) -> Result<ValidationReport> {
        self.config.validate()?;
        let (table, source) = self.parser.parse_file(path)?;
        let outcome = RosterValidator::new(&self.config).validate(&table);

        let subjects = outcome
            .roster
            .as_ref()
            .map(|r| r.subjects().iter().map(|s| s.name.clone()).collect())
            .unwrap_or_default();

        Ok(ValidationReport {
            source,
            is_valid: outcome.is_valid(),
            issues: outcome.issues,
            subjects,
        })
    }

    /// Run the full pipeline: parse, validate, analyze.
    ///
    /// Fails with [`ExamstatError::Validation`](crate::ExamstatError::Validation)
    /// when the dataset has error-severity issues; an invalid dataset
    /// produces no analysis output at all.
    pub fn analyze_file(&self, path: impl AsRef<Path>) -> Result<ExamAnalysis> {
        self.config.validate()?;
        let (table, source) = self.parser.parse_file(path)?;

        let outcome = RosterValidator::new(&self.config).validate(&table);
        let (roster, warnings) = outcome.into_roster()?;

        let result = ExamAnalyzer::new(self.config.clone()).analyze(&roster)?;

        Ok(ExamAnalysis {
            source,
            warnings,
            result,
        })
    }

    /// Run the full pipeline and render the markdown report.
    pub fn report_file(&self, path: impl AsRef<Path>) -> Result<String> {
        let analysis = self.analyze_file(path)?;
        Ok(self.render(&analysis.result))
    }

    /// Render a report for an already-computed result.
    pub fn render(&self, result: &AnalysisResult) -> String {
        ReportGenerator::new(&self.config).generate(result)
    }
}

impl Default for Examstat {
    fn default() -> Self {
        Self::new()
    }
}
