//! Statistical analysis of validated exam datasets.

mod engine;
mod stats;

pub use engine::{
    AnalysisResult, Anomaly, AnomalyKind, ExamAnalyzer, ExamSummary, StudentStats, SubjectStats,
    TopPerformer, TopScorer,
};
pub use stats::{ScoreSummary, StreamingStats};
