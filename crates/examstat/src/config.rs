//! Analysis configuration.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ExamstatError, Result};

/// Configuration for one analysis run.
///
/// The pass rule is fixed: a score passes a subject when it is greater than
/// or equal to that subject's threshold (the per-subject override when one
/// is configured, otherwise [`pass_threshold`](Self::pass_threshold)). A
/// student passes overall only when every subject score is present and
/// passes. Thresholds are absolute cutoffs on the score scale, not
/// percentages of a per-subject maximum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Global pass threshold on the score scale.
    pub pass_threshold: f64,
    /// Per-subject overrides of the global threshold.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub subject_thresholds: IndexMap<String, f64>,
    /// Decimal places used when rendering numbers. Presentation only;
    /// internal computation is never rounded.
    pub decimal_precision: usize,
    /// Replace student IDs and names with opaque aliases in reports.
    pub mask_student_ids: bool,
    /// Z-score bound beyond which a score is flagged as anomalous.
    pub anomaly_sensitivity: f64,
    /// Inclusive valid score range, `(min, max)`.
    pub score_range: (f64, f64),
    /// How many top performers the report lists.
    pub top_n: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            pass_threshold: 40.0,
            subject_thresholds: IndexMap::new(),
            decimal_precision: 2,
            mask_student_ids: false,
            anomaly_sensitivity: 3.0,
            score_range: (0.0, 100.0),
            top_n: 10,
        }
    }
}

impl AnalysisConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the global pass threshold.
    pub fn with_pass_threshold(mut self, threshold: f64) -> Self {
        self.pass_threshold = threshold;
        self
    }

    /// Override the threshold for a single subject.
    pub fn with_subject_threshold(mut self, subject: impl Into<String>, threshold: f64) -> Self {
        self.subject_thresholds.insert(subject.into(), threshold);
        self
    }

    /// Set the display precision.
    pub fn with_precision(mut self, places: usize) -> Self {
        self.decimal_precision = places;
        self
    }

    /// Enable or disable student ID masking.
    pub fn with_masking(mut self, mask: bool) -> Self {
        self.mask_student_ids = mask;
        self
    }

    /// Set the anomaly sensitivity (standard deviations).
    pub fn with_sensitivity(mut self, sigma: f64) -> Self {
        self.anomaly_sensitivity = sigma;
        self
    }

    /// The effective threshold for a subject.
    pub fn threshold_for(&self, subject: &str) -> f64 {
        self.subject_thresholds
            .get(subject)
            .copied()
            .unwrap_or(self.pass_threshold)
    }

    /// Check the configuration for internal consistency.
    pub fn validate(&self) -> Result<()> {
        let (min, max) = self.score_range;
        if !(min < max) {
            return Err(ExamstatError::Config(format!(
                "invalid score range: min {} must be below max {}",
                min, max
            )));
        }
        if self.pass_threshold < min || self.pass_threshold > max {
            return Err(ExamstatError::Config(format!(
                "pass threshold {} outside score range [{}, {}]",
                self.pass_threshold, min, max
            )));
        }
        for (subject, threshold) in &self.subject_thresholds {
            if *threshold < min || *threshold > max {
                return Err(ExamstatError::Config(format!(
                    "threshold {} for subject '{}' outside score range [{}, {}]",
                    threshold, subject, min, max
                )));
            }
        }
        if !(self.anomaly_sensitivity > 0.0) {
            return Err(ExamstatError::Config(format!(
                "anomaly sensitivity must be positive, got {}",
                self.anomaly_sensitivity
            )));
        }
        if self.top_n == 0 {
            return Err(ExamstatError::Config(
                "top performer count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn test_threshold_override() {
        let config = AnalysisConfig::new()
            .with_pass_threshold(40.0)
            .with_subject_threshold("Math", 50.0);

        assert_eq!(config.threshold_for("Math"), 50.0);
        assert_eq!(config.threshold_for("Science"), 40.0);
    }

    #[test]
    fn test_threshold_outside_range_rejected() {
        let config = AnalysisConfig::new().with_pass_threshold(150.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_nonpositive_sensitivity_rejected() {
        let config = AnalysisConfig::new().with_sensitivity(0.0);
        assert!(config.validate().is_err());
    }
}
