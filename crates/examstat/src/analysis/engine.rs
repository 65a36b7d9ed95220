//! The analysis engine: per-subject, per-student, and aggregate statistics.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::error::{ExamstatError, Result};
use crate::validation::{Roster, Subject};

use super::stats::{ScoreSummary, StreamingStats};

/// Statistics for one subject column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectStats {
    /// Subject name.
    pub subject: String,
    /// Effective pass threshold applied to this subject.
    pub threshold: f64,
    /// Number of valid scores.
    pub count: usize,
    /// Scores at or above the threshold.
    pub pass_count: usize,
    /// Scores below the threshold.
    pub fail_count: usize,
    /// Pass rate in percent; `None` when the subject has no valid scores.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass_rate: Option<f64>,
    /// Fail rate in percent; `None` when the subject has no valid scores.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail_rate: Option<f64>,
    /// Descriptive statistics; `None` when the subject has no valid scores.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ScoreSummary>,
    /// Highest scorer in this subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_scorer: Option<TopScorer>,
}

/// The highest scorer in one subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopScorer {
    pub student_id: String,
    pub name: String,
    pub score: f64,
}

/// Aggregate results for one student.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentStats {
    pub student_id: String,
    pub name: String,
    /// Score per subject, in subject column order. `None` marks a missing
    /// score.
    pub scores: IndexMap<String, Option<f64>>,
    /// Sum of the student's valid scores.
    pub total: f64,
    /// Average over the subjects the student has valid scores in; `None`
    /// when the student has none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average: Option<f64>,
    /// Number of subjects with a valid score.
    pub subjects_taken: usize,
    /// Overall verdict: true only when every subject score is present and
    /// at or above its threshold.
    pub passed_all: bool,
}

/// One entry in the ranked top performer list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopPerformer {
    /// 1-based rank.
    pub rank: usize,
    pub student_id: String,
    pub name: String,
    pub average: f64,
}

/// Kind of advisory anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// A score far outside its subject's distribution.
    ScoreOutlier,
    /// A subject with no valid scores at all.
    EmptySubject,
    /// Suspiciously many maximum scores in one subject.
    ExcessivePerfectScores,
    /// Scores at the bottom of the valid range.
    ZeroScores,
    /// A subject where very few students pass.
    LowPassRate,
}

impl AnomalyKind {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            AnomalyKind::ScoreOutlier => "Score Outlier",
            AnomalyKind::EmptySubject => "Empty Subject",
            AnomalyKind::ExcessivePerfectScores => "Excessive Perfect Scores",
            AnomalyKind::ZeroScores => "Zero Scores",
            AnomalyKind::LowPassRate => "Low Pass Rate",
        }
    }
}

/// An advisory finding worth review. Never a validity failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    /// Affected subject.
    pub subject: String,
    /// Human-readable description.
    pub description: String,
    /// Implicated student, for per-score anomalies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    /// The score in question.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Z-score against the subject distribution.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_score: Option<f64>,
    /// How many scores are affected, for aggregate anomalies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

/// Dataset-level aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamSummary {
    pub total_students: usize,
    pub total_subjects: usize,
    /// Students passing every subject.
    pub passed_all: usize,
    /// Students failing (or missing) at least one subject.
    pub failed_any: usize,
    /// Share of students passing every subject, in percent.
    pub overall_pass_rate: f64,
    /// Mean over every valid score in the dataset; `None` when there are
    /// no valid scores.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_score: Option<f64>,
    /// The global pass threshold the run was configured with.
    pub pass_threshold: f64,
}

/// Immutable result of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: ExamSummary,
    /// Per-subject statistics, in subject column order.
    pub subjects: Vec<SubjectStats>,
    /// Per-student aggregates, in dataset order.
    pub students: Vec<StudentStats>,
    /// All students with at least one valid score, ranked by average
    /// descending, ties broken by student ID ascending.
    pub top_performers: Vec<TopPerformer>,
    /// Advisory anomalies.
    pub anomalies: Vec<Anomaly>,
}

impl AnalysisResult {
    /// The best-ranked student, when any student has a valid score.
    pub fn top_performer(&self) -> Option<&TopPerformer> {
        self.top_performers.first()
    }

    /// Opaque alias for a student, numbered by dataset order.
    ///
    /// This is the masking token used everywhere a masked rendering needs
    /// to mention a student; positional rather than derived from the ID so
    /// the original value cannot be recovered.
    pub fn alias_for(&self, student_id: &str) -> Option<String> {
        self.students
            .iter()
            .position(|s| s.student_id == student_id)
            .map(|i| format!("Student_{:04}", i + 1))
    }
}

/// Computes an [`AnalysisResult`] from a validated roster.
///
/// Pure: no I/O, no internal rounding, deterministic over identical input.
pub struct ExamAnalyzer {
    config: AnalysisConfig,
}

impl ExamAnalyzer {
    /// Create an analyzer for one configuration.
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Analyze a validated roster.
    pub fn analyze(&self, roster: &Roster<'_>) -> Result<AnalysisResult> {
        self.config.validate()?;

        if roster.student_count() == 0 {
            return Err(ExamstatError::EmptyData(
                "roster contains no students".to_string(),
            ));
        }

        let mut anomalies = Vec::new();
        let subjects: Vec<SubjectStats> = roster
            .subjects()
            .iter()
            .map(|subject| self.analyze_subject(roster, subject, &mut anomalies))
            .collect();

        let students = self.analyze_students(roster);
        let top_performers = rank_students(&students);
        let summary = self.summarize(roster, &students);

        Ok(AnalysisResult {
            summary,
            subjects,
            students,
            top_performers,
            anomalies,
        })
    }

    /// Per-subject statistics plus the anomalies found along the way.
    fn analyze_subject(
        &self,
        roster: &Roster<'_>,
        subject: &Subject,
        anomalies: &mut Vec<Anomaly>,
    ) -> SubjectStats {
        let threshold = self.config.threshold_for(&subject.name);
        let scores = roster.subject_scores(subject);

        let mut stats = StreamingStats::new();
        for (_, score) in &scores {
            stats.add(*score);
        }

        let count = scores.len();
        let pass_count = scores.iter().filter(|(_, s)| *s >= threshold).count();
        let fail_count = count - pass_count;

        let (pass_rate, fail_rate) = if count > 0 {
            (
                Some((pass_count as f64 / count as f64) * 100.0),
                Some((fail_count as f64 / count as f64) * 100.0),
            )
        } else {
            (None, None)
        };

        // Highest score wins; earlier row wins ties.
        let top_scorer = scores
            .iter()
            .fold(None::<(usize, f64)>, |best, &(row, score)| match best {
                Some((_, best_score)) if best_score >= score => best,
                _ => Some((row, score)),
            })
            .map(|(row, score)| TopScorer {
                student_id: roster.student_id(row).to_string(),
                name: roster.student_name(row).to_string(),
                score,
            });

        self.detect_subject_anomalies(roster, subject, &scores, &stats, pass_rate, anomalies);

        SubjectStats {
            subject: subject.name.clone(),
            threshold,
            count,
            pass_count,
            fail_count,
            pass_rate,
            fail_rate,
            summary: stats.summary(),
            top_scorer,
        }
    }

    /// Advisory anomaly checks for one subject.
    fn detect_subject_anomalies(
        &self,
        roster: &Roster<'_>,
        subject: &Subject,
        scores: &[(usize, f64)],
        stats: &StreamingStats,
        pass_rate: Option<f64>,
        anomalies: &mut Vec<Anomaly>,
    ) {
        if scores.is_empty() {
            anomalies.push(Anomaly {
                kind: AnomalyKind::EmptySubject,
                subject: subject.name.clone(),
                description: format!("No valid scores found for {}", subject.name),
                student_id: None,
                score: None,
                z_score: None,
                count: None,
            });
            return;
        }

        // Individual scores far from the subject mean
        for &(row, score) in scores {
            let z = stats.z_score(score);
            if z.abs() > self.config.anomaly_sensitivity {
                anomalies.push(Anomaly {
                    kind: AnomalyKind::ScoreOutlier,
                    subject: subject.name.clone(),
                    description: format!(
                        "Score {} in {} is {:.1} standard deviations from the subject mean",
                        score, subject.name, z
                    ),
                    student_id: Some(roster.student_id(row).to_string()),
                    score: Some(score),
                    z_score: Some(z),
                    count: None,
                });
            }
        }

        let (range_min, range_max) = self.config.score_range;

        let perfect = scores.iter().filter(|(_, s)| *s == range_max).count();
        if perfect as f64 > scores.len() as f64 * 0.3 {
            anomalies.push(Anomaly {
                kind: AnomalyKind::ExcessivePerfectScores,
                subject: subject.name.clone(),
                description: format!(
                    "Unusually high number of perfect scores in {} ({} students)",
                    subject.name, perfect
                ),
                student_id: None,
                score: None,
                z_score: None,
                count: Some(perfect),
            });
        }

        let zeroes = scores.iter().filter(|(_, s)| *s == range_min).count();
        if zeroes > 0 {
            anomalies.push(Anomaly {
                kind: AnomalyKind::ZeroScores,
                subject: subject.name.clone(),
                description: format!(
                    "{} student(s) have the lowest possible score in {}",
                    zeroes, subject.name
                ),
                student_id: None,
                score: None,
                z_score: None,
                count: Some(zeroes),
            });
        }

        if let Some(rate) = pass_rate {
            if rate < 20.0 {
                anomalies.push(Anomaly {
                    kind: AnomalyKind::LowPassRate,
                    subject: subject.name.clone(),
                    description: format!("Very low pass rate in {} ({:.1}%)", subject.name, rate),
                    student_id: None,
                    score: None,
                    z_score: None,
                    count: None,
                });
            }
        }
    }

    /// Per-student aggregates, in dataset order.
    fn analyze_students(&self, roster: &Roster<'_>) -> Vec<StudentStats> {
        (0..roster.student_count())
            .map(|row| {
                let mut scores = IndexMap::new();
                let mut total = 0.0;
                let mut taken = 0usize;
                let mut passed_all = true;

                for subject in roster.subjects() {
                    let threshold = self.config.threshold_for(&subject.name);
                    let score = roster.score(row, subject);
                    match score {
                        Some(v) => {
                            total += v;
                            taken += 1;
                            if v < threshold {
                                passed_all = false;
                            }
                        }
                        None => passed_all = false,
                    }
                    scores.insert(subject.name.clone(), score);
                }

                let average = if taken > 0 {
                    Some(total / taken as f64)
                } else {
                    None
                };

                StudentStats {
                    student_id: roster.student_id(row).to_string(),
                    name: roster.student_name(row).to_string(),
                    scores,
                    total,
                    average,
                    subjects_taken: taken,
                    passed_all: passed_all && taken > 0,
                }
            })
            .collect()
    }

    /// Dataset-level aggregates.
    fn summarize(&self, roster: &Roster<'_>, students: &[StudentStats]) -> ExamSummary {
        let total_students = students.len();
        let passed_all = students.iter().filter(|s| s.passed_all).count();

        let mut all_scores = StreamingStats::new();
        for subject in roster.subjects() {
            for (_, score) in roster.subject_scores(subject) {
                all_scores.add(score);
            }
        }

        let overall_pass_rate = if total_students > 0 {
            (passed_all as f64 / total_students as f64) * 100.0
        } else {
            0.0
        };

        ExamSummary {
            total_students,
            total_subjects: roster.subjects().len(),
            passed_all,
            failed_any: total_students - passed_all,
            overall_pass_rate,
            mean_score: all_scores.summary().map(|s| s.mean),
            pass_threshold: self.config.pass_threshold,
        }
    }
}

/// Rank students by average descending, ties broken by ID ascending.
fn rank_students(students: &[StudentStats]) -> Vec<TopPerformer> {
    let mut ranked: Vec<&StudentStats> =
        students.iter().filter(|s| s.average.is_some()).collect();

    ranked.sort_by(|a, b| {
        let avg_a = a.average.unwrap_or(f64::NEG_INFINITY);
        let avg_b = b.average.unwrap_or(f64::NEG_INFINITY);
        avg_b
            .partial_cmp(&avg_a)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.student_id.cmp(&b.student_id))
    });

    ranked
        .into_iter()
        .enumerate()
        .map(|(i, s)| TopPerformer {
            rank: i + 1,
            student_id: s.student_id.clone(),
            name: s.name.clone(),
            average: s.average.unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::DataTable;
    use crate::validation::RosterValidator;

    fn table(headers: &[&str], rows: &[&[&str]]) -> DataTable {
        DataTable::new(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    fn analyze(t: &DataTable, config: AnalysisConfig) -> AnalysisResult {
        let outcome = RosterValidator::new(&config).validate(t);
        let roster = outcome.roster.expect("dataset should validate");
        ExamAnalyzer::new(config).analyze(&roster).unwrap()
    }

    #[test]
    fn test_worked_example() {
        // 2 students, {Math, Science}, threshold 40: both pass, Math mean
        // 80.5, student 002 ranked first on average 82.5 vs 81.5.
        let t = table(
            &["Student_ID", "Student_Name", "Math", "Science"],
            &[
                &["001", "Alice", "85", "78"],
                &["002", "Bob", "76", "89"],
            ],
        );

        let result = analyze(&t, AnalysisConfig::default());

        assert_eq!(result.summary.total_students, 2);
        assert_eq!(result.summary.passed_all, 2);
        assert_eq!(result.summary.overall_pass_rate, 100.0);

        let math = &result.subjects[0];
        assert_eq!(math.subject, "Math");
        assert_eq!(math.count, 2);
        assert_eq!(math.summary.unwrap().mean, 80.5);
        assert_eq!(math.pass_count, 2);

        let top = result.top_performer().unwrap();
        assert_eq!(top.student_id, "002");
        assert_eq!(top.average, 82.5);
        assert_eq!(result.top_performers[1].student_id, "001");
        assert_eq!(result.top_performers[1].average, 81.5);
    }

    #[test]
    fn test_subject_count_equals_students_for_complete_data() {
        let t = table(
            &["Student_ID", "Student_Name", "Math", "Science", "History"],
            &[
                &["001", "Alice", "85", "78", "91"],
                &["002", "Bob", "76", "89", "60"],
                &["003", "Carol", "55", "41", "72"],
            ],
        );

        let result = analyze(&t, AnalysisConfig::default());
        for subject in &result.subjects {
            assert_eq!(subject.count, 3);
        }
    }

    #[test]
    fn test_student_average_within_score_bounds() {
        let t = table(
            &["Student_ID", "Student_Name", "Math", "Science"],
            &[&["001", "Alice", "40", "90"]],
        );

        let result = analyze(&t, AnalysisConfig::default());
        let student = &result.students[0];
        let avg = student.average.unwrap();
        assert!(avg >= 40.0 && avg <= 90.0);
        assert_eq!(student.total, 130.0);
    }

    #[test]
    fn test_fail_one_subject_fails_overall() {
        let t = table(
            &["Student_ID", "Student_Name", "Math", "Science"],
            &[
                &["001", "Alice", "35", "90"],
                &["002", "Bob", "50", "60"],
            ],
        );

        let result = analyze(&t, AnalysisConfig::default());
        assert!(!result.students[0].passed_all);
        assert!(result.students[1].passed_all);
        assert_eq!(result.summary.passed_all, 1);
        assert_eq!(result.summary.failed_any, 1);
        assert_eq!(result.summary.overall_pass_rate, 50.0);
    }

    #[test]
    fn test_missing_score_fails_overall_but_not_average() {
        let t = table(
            &["Student_ID", "Student_Name", "Math", "Science"],
            &[
                &["001", "Alice", "80", "NA"],
                &["002", "Bob", "70", "75"],
            ],
        );

        let result = analyze(&t, AnalysisConfig::default());
        let alice = &result.students[0];
        assert!(!alice.passed_all);
        assert_eq!(alice.average, Some(80.0));
        assert_eq!(alice.subjects_taken, 1);

        // Science only has one valid score
        assert_eq!(result.subjects[1].count, 1);
    }

    #[test]
    fn test_tie_broken_by_ascending_id() {
        let t = table(
            &["Student_ID", "Student_Name", "Math"],
            &[
                &["B02", "Bob", "80"],
                &["A01", "Alice", "80"],
                &["C03", "Carol", "95"],
            ],
        );

        let result = analyze(&t, AnalysisConfig::default());
        let ids: Vec<&str> = result
            .top_performers
            .iter()
            .map(|p| p.student_id.as_str())
            .collect();
        assert_eq!(ids, vec!["C03", "A01", "B02"]);
        assert_eq!(result.top_performers[0].rank, 1);
    }

    #[test]
    fn test_determinism() {
        let t = table(
            &["Student_ID", "Student_Name", "Math", "Science"],
            &[
                &["001", "Alice", "85", "78"],
                &["002", "Bob", "76", "89"],
                &["003", "Carol", "55", "41"],
            ],
        );

        let a = analyze(&t, AnalysisConfig::default());
        let b = analyze(&t, AnalysisConfig::default());

        assert_eq!(
            serde_json::to_string(&a.subjects).unwrap(),
            serde_json::to_string(&b.subjects).unwrap()
        );
        assert_eq!(
            serde_json::to_string(&a.top_performers).unwrap(),
            serde_json::to_string(&b.top_performers).unwrap()
        );
    }

    #[test]
    fn test_subject_threshold_override() {
        let t = table(
            &["Student_ID", "Student_Name", "Math", "Science"],
            &[&["001", "Alice", "45", "45"]],
        );

        let config = AnalysisConfig::default().with_subject_threshold("Math", 50.0);
        let result = analyze(&t, config);

        let math = &result.subjects[0];
        let science = &result.subjects[1];
        assert_eq!(math.threshold, 50.0);
        assert_eq!(math.pass_count, 0);
        assert_eq!(science.pass_count, 1);
        assert!(!result.students[0].passed_all);
    }

    #[test]
    fn test_outlier_anomaly_flagged() {
        let mut rows: Vec<Vec<String>> = (1..=20)
            .map(|i| vec![format!("S{:03}", i), format!("Student {}", i), "70".to_string()])
            .collect();
        // One score far below the tight cluster
        rows.push(vec!["S021".into(), "Outlier".into(), "1".into()]);
        // Break the constant cluster slightly so std is nonzero
        rows[0][2] = "72".into();
        rows[1][2] = "68".into();

        let t = DataTable::new(
            vec!["Student_ID".into(), "Student_Name".into(), "Math".into()],
            rows,
        );

        let result = analyze(&t, AnalysisConfig::default());
        let outlier = result
            .anomalies
            .iter()
            .find(|a| a.kind == AnomalyKind::ScoreOutlier)
            .expect("expected outlier anomaly");
        assert_eq!(outlier.student_id.as_deref(), Some("S021"));
        assert_eq!(outlier.score, Some(1.0));
    }

    #[test]
    fn test_low_pass_rate_anomaly() {
        let t = table(
            &["Student_ID", "Student_Name", "Math"],
            &[
                &["001", "Alice", "10"],
                &["002", "Bob", "15"],
                &["003", "Carol", "20"],
                &["004", "Dan", "12"],
                &["005", "Eve", "18"],
            ],
        );

        let result = analyze(&t, AnalysisConfig::default());
        assert!(result
            .anomalies
            .iter()
            .any(|a| a.kind == AnomalyKind::LowPassRate && a.subject == "Math"));
    }

    #[test]
    fn test_alias_follows_dataset_order() {
        let t = table(
            &["Student_ID", "Student_Name", "Math"],
            &[
                &["B02", "Bob", "80"],
                &["A01", "Alice", "95"],
            ],
        );

        let result = analyze(&t, AnalysisConfig::default());

        // Aliases track dataset order, not rank order
        assert_eq!(result.alias_for("B02").as_deref(), Some("Student_0001"));
        assert_eq!(result.alias_for("A01").as_deref(), Some("Student_0002"));
        assert_eq!(result.alias_for("C03"), None);

        let top = result.top_performer().unwrap();
        assert_eq!(
            result.alias_for(&top.student_id).as_deref(),
            Some("Student_0002")
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let t = table(
            &["Student_ID", "Student_Name", "Math"],
            &[&["001", "Alice", "85"]],
        );
        let default = AnalysisConfig::default();
        let outcome = RosterValidator::new(&default).validate(&t);
        let roster = outcome.roster.unwrap();

        let bad = AnalysisConfig::default().with_pass_threshold(500.0);
        assert!(ExamAnalyzer::new(bad).analyze(&roster).is_err());
    }
}
