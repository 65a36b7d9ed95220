//! Markdown report rendering.

use std::collections::HashMap;
use std::fmt::Write;

use crate::analysis::{AnalysisResult, StudentStats, SubjectStats};
use crate::config::AnalysisConfig;

/// Renders an [`AnalysisResult`] as a markdown document.
///
/// Output is deterministic for a given result and configuration: section
/// order is fixed and numbers are rounded only here, at the configured
/// precision. No file I/O; the caller decides where the text goes.
pub struct ReportGenerator {
    precision: usize,
    mask_ids: bool,
    top_n: usize,
}

impl ReportGenerator {
    /// Create a generator from the run configuration.
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            precision: config.decimal_precision,
            mask_ids: config.mask_student_ids,
            top_n: config.top_n,
        }
    }

    /// Render the full report.
    pub fn generate(&self, result: &AnalysisResult) -> String {
        let aliases = self.build_aliases(result);
        let mut out = String::new();

        self.write_header(&mut out);
        self.write_summary(&mut out, result, &aliases);
        self.write_subjects(&mut out, result, &aliases);
        self.write_students(&mut out, result, &aliases);
        self.write_top_performers(&mut out, result, &aliases);
        self.write_anomalies(&mut out, result, &aliases);
        self.write_recommendations(&mut out, result);

        out.push_str("---\n");
        out.push_str("*Generated by the examination results analysis pipeline*\n");
        out
    }

    /// Per-report alias map built from [`AnalysisResult::alias_for`].
    fn build_aliases(&self, result: &AnalysisResult) -> HashMap<String, String> {
        if !self.mask_ids {
            return HashMap::new();
        }
        result
            .students
            .iter()
            .filter_map(|s| {
                result
                    .alias_for(&s.student_id)
                    .map(|alias| (s.student_id.clone(), alias))
            })
            .collect()
    }

    fn display_id<'a>(&self, aliases: &'a HashMap<String, String>, id: &'a str) -> &'a str {
        if self.mask_ids {
            aliases.get(id).map(|s| s.as_str()).unwrap_or("Student_????")
        } else {
            id
        }
    }

    fn display_name<'a>(
        &self,
        aliases: &'a HashMap<String, String>,
        id: &'a str,
        name: &'a str,
    ) -> &'a str {
        if self.mask_ids {
            self.display_id(aliases, id)
        } else {
            name
        }
    }

    fn num(&self, value: f64) -> String {
        format!("{:.prec$}", value, prec = self.precision)
    }

    fn opt_num(&self, value: Option<f64>) -> String {
        match value {
            Some(v) => self.num(v),
            None => "N/A".to_string(),
        }
    }

    fn write_header(&self, out: &mut String) {
        out.push_str("# Student Examination Results Analysis Report\n\n");
    }

    fn write_summary(
        &self,
        out: &mut String,
        result: &AnalysisResult,
        aliases: &HashMap<String, String>,
    ) {
        let s = &result.summary;
        out.push_str("## Executive Summary\n\n");
        let _ = writeln!(out, "- **Total students analyzed:** {}", s.total_students);
        let _ = writeln!(out, "- **Total subjects:** {}", s.total_subjects);
        let _ = writeln!(
            out,
            "- **Overall pass rate:** {}%",
            self.num(s.overall_pass_rate)
        );
        let _ = writeln!(
            out,
            "- **Pass criteria:** {} minimum per subject",
            self.num(s.pass_threshold)
        );
        let _ = writeln!(out, "- **Students passing all subjects:** {}", s.passed_all);
        let _ = writeln!(
            out,
            "- **Students failing at least one subject:** {}",
            s.failed_any
        );
        let _ = writeln!(
            out,
            "- **Mean score across all subjects:** {}",
            self.opt_num(s.mean_score)
        );

        if let Some(top) = result.top_performer() {
            let _ = writeln!(
                out,
                "- **Top performer:** {} (average {})",
                self.display_name(aliases, &top.student_id, &top.name),
                self.num(top.average)
            );
        }
        out.push('\n');
    }

    fn write_subjects(
        &self,
        out: &mut String,
        result: &AnalysisResult,
        aliases: &HashMap<String, String>,
    ) {
        out.push_str("## Subject-wise Analysis\n\n");
        out.push_str("| Subject | Students | Pass Rate | Fail Rate | Average | Highest | Lowest | Std Dev |\n");
        out.push_str("|---------|----------|-----------|-----------|---------|---------|--------|---------|\n");

        for subject in &result.subjects {
            let _ = writeln!(
                out,
                "| {} | {} | {} | {} | {} | {} | {} | {} |",
                subject.subject,
                subject.count,
                self.pct(subject.pass_rate),
                self.pct(subject.fail_rate),
                self.opt_num(subject.summary.map(|s| s.mean)),
                self.opt_num(subject.summary.map(|s| s.max)),
                self.opt_num(subject.summary.map(|s| s.min)),
                self.opt_num(subject.summary.map(|s| s.std)),
            );
        }
        out.push('\n');

        for subject in &result.subjects {
            self.write_subject_detail(out, subject, aliases);
        }
    }

    fn pct(&self, value: Option<f64>) -> String {
        match value {
            Some(v) => format!("{}%", self.num(v)),
            None => "N/A".to_string(),
        }
    }

    fn write_subject_detail(
        &self,
        out: &mut String,
        subject: &SubjectStats,
        aliases: &HashMap<String, String>,
    ) {
        let _ = writeln!(out, "### {}", subject.subject);
        let _ = writeln!(out, "- **Pass threshold:** {}", self.num(subject.threshold));
        let _ = writeln!(out, "- **Valid scores:** {}", subject.count);
        let _ = writeln!(
            out,
            "- **Passed:** {} ({})",
            subject.pass_count,
            self.pct(subject.pass_rate)
        );
        let _ = writeln!(
            out,
            "- **Failed:** {} ({})",
            subject.fail_count,
            self.pct(subject.fail_rate)
        );
        if let Some(summary) = subject.summary {
            let _ = writeln!(out, "- **Average score:** {}", self.num(summary.mean));
            let _ = writeln!(
                out,
                "- **Score range:** {} - {}",
                self.num(summary.min),
                self.num(summary.max)
            );
        }
        if let Some(ref top) = subject.top_scorer {
            let _ = writeln!(
                out,
                "- **Top scorer:** {} ({})",
                self.display_name(aliases, &top.student_id, &top.name),
                self.num(top.score)
            );
        }
        out.push('\n');
    }

    fn write_students(
        &self,
        out: &mut String,
        result: &AnalysisResult,
        aliases: &HashMap<String, String>,
    ) {
        out.push_str("## Student Performance\n\n");

        let subject_names: Vec<&str> = result
            .subjects
            .iter()
            .map(|s| s.subject.as_str())
            .collect();

        out.push_str("| Student |");
        for name in &subject_names {
            let _ = write!(out, " {} |", name);
        }
        out.push_str(" Average | Passed All |\n");

        out.push_str("|---------|");
        for _ in &subject_names {
            out.push_str("---|");
        }
        out.push_str("---------|------------|\n");

        for student in &result.students {
            let _ = write!(
                out,
                "| {} |",
                self.student_label(aliases, student)
            );
            for name in &subject_names {
                let score = student.scores.get(*name).copied().flatten();
                let _ = write!(out, " {} |", self.opt_num(score));
            }
            let _ = writeln!(
                out,
                " {} | {} |",
                self.opt_num(student.average),
                if student.passed_all { "Yes" } else { "No" }
            );
        }
        out.push('\n');
    }

    fn student_label(&self, aliases: &HashMap<String, String>, student: &StudentStats) -> String {
        if self.mask_ids {
            self.display_id(aliases, &student.student_id).to_string()
        } else {
            format!("{} ({})", student.name, student.student_id)
        }
    }

    fn write_top_performers(
        &self,
        out: &mut String,
        result: &AnalysisResult,
        aliases: &HashMap<String, String>,
    ) {
        out.push_str("## Top Performers\n\n");

        if result.top_performers.is_empty() {
            out.push_str("No students with valid scores.\n\n");
            return;
        }

        out.push_str("| Rank | Student | Average |\n");
        out.push_str("|------|---------|--------|\n");
        for performer in result.top_performers.iter().take(self.top_n) {
            let _ = writeln!(
                out,
                "| {} | {} | {} |",
                performer.rank,
                self.display_name(aliases, &performer.student_id, &performer.name),
                self.num(performer.average)
            );
        }
        out.push('\n');
    }

    fn write_anomalies(
        &self,
        out: &mut String,
        result: &AnalysisResult,
        aliases: &HashMap<String, String>,
    ) {
        if result.anomalies.is_empty() {
            return;
        }

        out.push_str("## Anomalies and Concerns\n\n");
        for anomaly in &result.anomalies {
            let mut line = format!("- **{}:** {}", anomaly.kind.label(), anomaly.description);
            if let Some(ref id) = anomaly.student_id {
                let _ = write!(line, " (student {})", self.display_id(aliases, id));
            }
            let _ = writeln!(out, "{}", line);
        }
        out.push('\n');
    }

    fn write_recommendations(&self, out: &mut String, result: &AnalysisResult) {
        out.push_str("## Recommendations\n\n");

        let mut recommendations = Vec::new();
        let summary = &result.summary;

        if summary.overall_pass_rate < 50.0 {
            recommendations.push(
                "**Critical:** overall pass rate is below 50%. Review curriculum and teaching methods."
                    .to_string(),
            );
        } else if summary.overall_pass_rate < 70.0 {
            recommendations.push(
                "Overall pass rate needs improvement. Focus on identifying struggling students early."
                    .to_string(),
            );
        }

        for subject in &result.subjects {
            match subject.pass_rate {
                Some(rate) if rate < 40.0 => recommendations.push(format!(
                    "**{}:** very low pass rate ({}%). Consider additional support or curriculum review.",
                    subject.subject,
                    self.num(rate)
                )),
                Some(rate) if rate < 60.0 => recommendations.push(format!(
                    "**{}:** below-average performance. Consider targeted interventions.",
                    subject.subject
                )),
                _ => {}
            }
        }

        if summary.failed_any as f64 > summary.total_students as f64 * 0.3 {
            recommendations.push(
                "A high number of students are failing subjects. Consider peer tutoring or additional support."
                    .to_string(),
            );
        }

        for anomaly in &result.anomalies {
            use crate::analysis::AnomalyKind;
            match anomaly.kind {
                AnomalyKind::ZeroScores => recommendations.push(format!(
                    "Investigate bottom-of-range scores in {}; they may indicate attendance or assessment issues.",
                    anomaly.subject
                )),
                AnomalyKind::ExcessivePerfectScores => recommendations.push(format!(
                    "Review assessment difficulty in {} given the number of perfect scores.",
                    anomaly.subject
                )),
                _ => {}
            }
        }

        if recommendations.is_empty() {
            recommendations.push(
                "Overall performance is satisfactory. Continue monitoring student progress."
                    .to_string(),
            );
        }

        for recommendation in recommendations {
            let _ = writeln!(out, "- {}", recommendation);
        }
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ExamAnalyzer;
    use crate::input::DataTable;
    use crate::validation::RosterValidator;

    fn sample_result(config: &AnalysisConfig) -> AnalysisResult {
        let table = DataTable::new(
            vec![
                "Student_ID".into(),
                "Student_Name".into(),
                "Math".into(),
                "Science".into(),
            ],
            vec![
                vec!["stu-14".into(), "Alice".into(), "85".into(), "78".into()],
                vec!["stu-25".into(), "Bob".into(), "76".into(), "89".into()],
                vec!["stu-36".into(), "Carol".into(), "35".into(), "41".into()],
            ],
        );
        let outcome = RosterValidator::new(config).validate(&table);
        let roster = outcome.roster.expect("sample dataset should validate");
        ExamAnalyzer::new(config.clone()).analyze(&roster).unwrap()
    }

    #[test]
    fn test_section_order_is_stable() {
        let config = AnalysisConfig::default();
        let report = ReportGenerator::new(&config).generate(&sample_result(&config));

        let summary = report.find("## Executive Summary").unwrap();
        let subjects = report.find("## Subject-wise Analysis").unwrap();
        let students = report.find("## Student Performance").unwrap();
        let top = report.find("## Top Performers").unwrap();
        assert!(summary < subjects && subjects < students && students < top);
    }

    #[test]
    fn test_report_is_deterministic() {
        let config = AnalysisConfig::default();
        let result = sample_result(&config);
        let generator = ReportGenerator::new(&config);
        assert_eq!(generator.generate(&result), generator.generate(&result));
    }

    #[test]
    fn test_masking_hides_every_identifier() {
        let config = AnalysisConfig::default().with_masking(true);
        let result = sample_result(&config);
        let report = ReportGenerator::new(&config).generate(&result);

        for needle in ["stu-14", "stu-25", "stu-36", "Alice", "Bob", "Carol"] {
            assert!(
                !report.contains(needle),
                "masked report leaked '{}'",
                needle
            );
        }
        assert!(report.contains("Student_0001"));
        assert!(report.contains("Student_0002"));
    }

    #[test]
    fn test_masking_is_consistent_within_report() {
        let config = AnalysisConfig::default().with_masking(true);
        let result = sample_result(&config);
        let report = ReportGenerator::new(&config).generate(&result);

        // Bob tops both Science and the overall ranking; both mentions must
        // use the same alias.
        let alias = "Student_0002";
        assert!(report.matches(alias).count() >= 2);
    }

    #[test]
    fn test_precision_applied() {
        let config = AnalysisConfig::default().with_precision(1);
        let result = sample_result(&config);
        let report = ReportGenerator::new(&config).generate(&result);

        // Math mean over 85, 76, 35 is 65.333...
        assert!(report.contains("65.3"));
        assert!(!report.contains("65.33"));
    }

    #[test]
    fn test_unmasked_report_shows_names() {
        let config = AnalysisConfig::default();
        let result = sample_result(&config);
        let report = ReportGenerator::new(&config).generate(&result);

        assert!(report.contains("Alice (stu-14)"));
        assert!(report.contains("Bob"));
    }
}
