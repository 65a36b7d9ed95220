//! Streaming descriptive statistics.

use serde::{Deserialize, Serialize};

/// Streaming statistics accumulator using Welford's algorithm.
/// Computes mean and variance in a single pass with O(1) memory.
#[derive(Debug, Clone)]
pub struct StreamingStats {
    count: usize,
    mean: f64,
    m2: f64, // Sum of squared differences from mean
    min: f64,
    max: f64,
}

impl StreamingStats {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    /// Add a value using Welford's online algorithm.
    pub fn add(&mut self, value: f64) {
        self.count += 1;

        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = value - self.mean;
        self.m2 += delta * delta2;

        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }

    /// Number of values seen.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Mean of the values seen so far.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Population variance.
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / self.count as f64
        }
    }

    /// Population standard deviation.
    pub fn std(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Z-score of a value against the accumulated distribution.
    pub fn z_score(&self, value: f64) -> f64 {
        let std = self.std();
        if std == 0.0 {
            0.0
        } else {
            (value - self.mean) / std
        }
    }

    /// Finish accumulation, yielding `None` when no values were seen.
    pub fn summary(&self) -> Option<ScoreSummary> {
        if self.count == 0 {
            return None;
        }
        Some(ScoreSummary {
            mean: self.mean,
            min: self.min,
            max: self.max,
            std: self.std(),
        })
    }
}

impl Default for StreamingStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Descriptive statistics over one set of scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub std: f64,
}
