//! Property-based tests for the analysis pipeline.
//!
//! These tests generate random score matrices and verify that the analyzer
//! maintains its invariants under all conditions:
//!
//! 1. **No panics**: the pipeline never crashes on any valid roster
//! 2. **Determinism**: same input always produces same output
//! 3. **Invariants**: counts, bounds, and orderings always hold

use proptest::prelude::*;

use examstat::{AnalysisConfig, DataTable, ExamAnalyzer, ReportGenerator, RosterValidator};

/// Generate a complete score matrix: rows x subjects, scores within 0-100.
fn score_matrix() -> impl Strategy<Value = Vec<Vec<f64>>> {
    (1usize..25, 1usize..5).prop_flat_map(|(rows, cols)| {
        prop::collection::vec(prop::collection::vec(0.0f64..=100.0, cols), rows)
    })
}

/// Build a DataTable from a score matrix with synthetic IDs and names.
fn table_from_matrix(matrix: &[Vec<f64>]) -> DataTable {
    let cols = matrix[0].len();
    let mut headers = vec!["Student_ID".to_string(), "Student_Name".to_string()];
    headers.extend((0..cols).map(|c| format!("Subject{}", c + 1)));

    let rows = matrix
        .iter()
        .enumerate()
        .map(|(i, scores)| {
            let mut row = vec![format!("SID{:04}", i + 1), format!("Pupil {}", i + 1)];
            row.extend(scores.iter().map(|s| format!("{}", s)));
            row
        })
        .collect();

    DataTable::new(headers, rows)
}

fn analyze(matrix: &[Vec<f64>], config: &AnalysisConfig) -> examstat::AnalysisResult {
    let table = table_from_matrix(matrix);
    let outcome = RosterValidator::new(config).validate(&table);
    let roster = outcome.roster.expect("in-range matrix must validate");
    ExamAnalyzer::new(config.clone())
        .analyze(&roster)
        .expect("analysis of a valid roster must succeed")
}

proptest! {
    #[test]
    fn prop_subject_counts_equal_student_count(matrix in score_matrix()) {
        let config = AnalysisConfig::default();
        let result = analyze(&matrix, &config);

        for subject in &result.subjects {
            prop_assert_eq!(subject.count, matrix.len());
            prop_assert_eq!(subject.pass_count + subject.fail_count, subject.count);
        }
    }

    #[test]
    fn prop_subject_means_within_score_range(matrix in score_matrix()) {
        let config = AnalysisConfig::default();
        let result = analyze(&matrix, &config);

        for subject in &result.subjects {
            let summary = subject.summary.expect("complete subject has stats");
            prop_assert!(summary.mean >= 0.0 && summary.mean <= 100.0);
            prop_assert!(summary.min <= summary.mean && summary.mean <= summary.max);
            prop_assert!(summary.std >= 0.0);
        }
    }

    #[test]
    fn prop_student_average_within_own_bounds(matrix in score_matrix()) {
        let config = AnalysisConfig::default();
        let result = analyze(&matrix, &config);

        for (student, scores) in result.students.iter().zip(matrix.iter()) {
            let avg = student.average.expect("complete row has an average");
            let min = scores.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            prop_assert!(avg >= min - 1e-9 && avg <= max + 1e-9);
        }
    }

    #[test]
    fn prop_top_performers_ordered(matrix in score_matrix()) {
        let config = AnalysisConfig::default();
        let result = analyze(&matrix, &config);

        for pair in result.top_performers.windows(2) {
            let better = &pair[0];
            let worse = &pair[1];
            prop_assert!(
                better.average > worse.average
                    || (better.average == worse.average
                        && better.student_id < worse.student_id)
            );
        }
    }

    #[test]
    fn prop_analysis_is_deterministic(matrix in score_matrix()) {
        let config = AnalysisConfig::default();
        let a = analyze(&matrix, &config);
        let b = analyze(&matrix, &config);

        prop_assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn prop_pass_counts_respect_threshold(matrix in score_matrix(), threshold in 0.0f64..=100.0) {
        let config = AnalysisConfig::default().with_pass_threshold(threshold);
        let result = analyze(&matrix, &config);

        for (c, subject) in result.subjects.iter().enumerate() {
            let expected = matrix.iter().filter(|row| row[c] >= threshold).count();
            prop_assert_eq!(subject.pass_count, expected);
        }
    }

    #[test]
    fn prop_masked_report_never_leaks_identifiers(matrix in score_matrix()) {
        let config = AnalysisConfig::default().with_masking(true);
        let result = analyze(&matrix, &config);
        let report = ReportGenerator::new(&config).generate(&result);

        prop_assert!(!report.contains("SID"));
        prop_assert!(!report.contains("Pupil"));
    }
}
