//! Stability profile of a DI length sweep
//!
//! Holds every per-length backtest result for one symbol so callers can see
//! how sensitive alpha is to the smoothing choice.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::optimizer::ParameterRange;
use crate::ParameterResult;

/// Full sweep for one series, ordered by parameter ascending
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityProfile {
    pub range: ParameterRange,
    results: Vec<ParameterResult>,
}

impl StabilityProfile {
    pub fn new(range: ParameterRange, mut results: Vec<ParameterResult>) -> Self {
        results.sort_by_key(|r| r.parameter);
        StabilityProfile { range, results }
    }

    pub fn results(&self) -> &[ParameterResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Highest alpha; the lowest parameter wins ties
    pub fn best(&self) -> Option<&ParameterResult> {
        self.results.iter().fold(None, |best, r| match best {
            Some(b) if r.alpha_pct <= b.alpha_pct => Some(b),
            _ => Some(r),
        })
    }

    /// Lowest alpha; the lowest parameter wins ties
    pub fn worst(&self) -> Option<&ParameterResult> {
        self.results.iter().fold(None, |worst, r| match worst {
            Some(w) if r.alpha_pct >= w.alpha_pct => Some(w),
            _ => Some(r),
        })
    }

    fn alphas(&self) -> Vec<f64> {
        self.results.iter().map(|r| r.alpha_pct).collect()
    }

    pub fn average_alpha(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        Some(self.alphas().mean())
    }

    /// Sample standard deviation of alpha; needs at least two results
    pub fn alpha_std_dev(&self) -> Option<f64> {
        if self.len() < 2 {
            return None;
        }
        Some(self.alphas().std_dev())
    }

    /// (min, max) alpha across the sweep
    pub fn alpha_range(&self) -> Option<(f64, f64)> {
        Some((self.worst()?.alpha_pct, self.best()?.alpha_pct))
    }

    pub fn valid_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_valid).count()
    }

    pub fn positive_alpha_count(&self) -> usize {
        self.results.iter().filter(|r| r.alpha_pct > 0.0).count()
    }

    pub fn validity_ratio(&self) -> f64 {
        ratio(self.valid_count(), self.len())
    }

    pub fn positive_alpha_ratio(&self) -> f64 {
        ratio(self.positive_alpha_count(), self.len())
    }
}

fn ratio(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}
