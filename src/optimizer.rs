//! DI length optimization
//!
//! Sweeps every integer DI length in a range, backtests each one and keeps the
//! length with the highest alpha. Evaluations run on the rayon pool when
//! parallel mode is on; results are always collected in ascending order and
//! reduced sequentially, so ties resolve to the lowest length either way.

use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::backtest::validate_alpha;
use crate::config::{OptimizerConfig, SignalConfig};
use crate::error::{ScanError, ScanResult};
use crate::indicators::directional_indicators;
use crate::signals::impulse_state;
use crate::stability::StabilityProfile;
use crate::{AnalysisResult, Candle, ParameterResult, Symbol, TrendStrength, MIN_BARS};

/// Inclusive range of DI smoothing lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterRange {
    pub start: usize,
    pub end: usize,
}

impl Default for ParameterRange {
    fn default() -> Self {
        ParameterRange { start: 1, end: 40 }
    }
}

impl ParameterRange {
    pub fn new(start: usize, end: usize) -> ScanResult<Self> {
        let range = ParameterRange { start, end };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> ScanResult<()> {
        if self.start == 0 || self.start > self.end {
            return Err(ScanError::InvalidRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        if self.start > self.end {
            0
        } else {
            self.end - self.start + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> std::ops::RangeInclusive<usize> {
        self.start..=self.end
    }
}

impl std::fmt::Display for ParameterRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Winning configuration of a sweep
#[derive(Debug, Clone, PartialEq)]
pub struct Optimum {
    pub parameter: usize,
    pub result: ParameterResult,
}

/// Sweeps DI lengths for a single price series
#[derive(Debug, Clone)]
pub struct Optimizer {
    range: ParameterRange,
    signal: SignalConfig,
    parallel: bool,
}

impl Default for Optimizer {
    fn default() -> Self {
        Optimizer {
            range: ParameterRange::default(),
            signal: SignalConfig::default(),
            parallel: true,
        }
    }
}

impl Optimizer {
    pub fn new(config: &OptimizerConfig, signal: SignalConfig) -> ScanResult<Self> {
        let range = config.range();
        range.validate()?;
        Ok(Optimizer {
            range,
            signal,
            parallel: config.parallel,
        })
    }

    pub fn with_range(mut self, range: ParameterRange) -> Self {
        self.range = range;
        self
    }

    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn range(&self) -> ParameterRange {
        self.range
    }

    /// Evaluate every length in the range, ascending.
    fn sweep(&self, candles: &[Candle], progress: Option<&ProgressBar>) -> Vec<(usize, ScanResult<ParameterResult>)> {
        let evaluate = |parameter: usize| {
            let outcome = validate_alpha(candles, parameter);
            if let Some(pb) = progress {
                pb.inc(1);
            }
            (parameter, outcome)
        };

        if self.parallel {
            self.range.iter().into_par_iter().map(evaluate).collect()
        } else {
            self.range.iter().map(evaluate).collect()
        }
    }

    /// Select the length with strictly maximal alpha.
    ///
    /// Failed lengths are skipped. Ties keep the lowest length.
    pub fn optimize(&self, candles: &[Candle]) -> ScanResult<Optimum> {
        self.optimize_with_progress(candles, None)
    }

    pub fn optimize_with_progress(&self, candles: &[Candle], progress: Option<&ProgressBar>) -> ScanResult<Optimum> {
        self.range.validate()?;

        let mut best: Option<Optimum> = None;
        for (parameter, outcome) in self.sweep(candles, progress) {
            let result = match outcome {
                Ok(result) => result,
                Err(e) => {
                    debug!("Skipping DI length {}: {}", parameter, e);
                    continue;
                }
            };

            let replace = match &best {
                Some(incumbent) => result.alpha_pct > incumbent.result.alpha_pct,
                None => true,
            };
            if replace {
                best = Some(Optimum { parameter, result });
            }
        }

        best.ok_or(ScanError::NoViableParameter {
            start: self.range.start,
            end: self.range.end,
        })
    }

    /// Full sweep, keeping every successful result in ascending order
    pub fn inspect_stability(&self, candles: &[Candle]) -> ScanResult<StabilityProfile> {
        self.range.validate()?;

        let results: Vec<ParameterResult> = self
            .sweep(candles, None)
            .into_iter()
            .filter_map(|(parameter, outcome)| match outcome {
                Ok(result) => Some(result),
                Err(e) => {
                    warn!("DI length {} failed during inspection: {}", parameter, e);
                    None
                }
            })
            .collect();

        Ok(StabilityProfile::new(self.range, results))
    }

    /// Optimize, then read the latest-bar signal at the winning length
    pub fn analyze_symbol(&self, symbol: &Symbol, candles: &[Candle]) -> ScanResult<AnalysisResult> {
        if candles.len() < MIN_BARS {
            return Err(ScanError::InsufficientData {
                required: MIN_BARS,
                available: candles.len(),
            });
        }

        let optimum = self.optimize(candles)?;
        let di = directional_indicators(candles, optimum.parameter)?;
        let state = impulse_state(&di);

        let (plus_di, minus_di) = di.last().unwrap_or((0.0, 0.0));
        let close_price = candles.last().map(|c| c.close).unwrap_or_default();

        debug!(
            "{}: best DI length {} (alpha {:+.2}%, valid {})",
            symbol, optimum.parameter, optimum.result.alpha_pct, optimum.result.is_valid
        );

        Ok(AnalysisResult {
            symbol: symbol.clone(),
            close_price,
            best: optimum.result,
            plus_di,
            minus_di,
            trend_strength: self.signal.classify(plus_di, minus_di),
            is_buy_signal: state.ignited_on_last_bar(),
            scan_range: (self.range.start, self.range.end),
        })
    }
}

impl SignalConfig {
    /// Bucket |+DI - -DI|; thresholds are checked strongest first
    pub fn classify(&self, plus_di: f64, minus_di: f64) -> TrendStrength {
        let spread = (plus_di - minus_di).abs();
        if spread > self.strong_threshold {
            TrendStrength::Strong
        } else if spread > self.moderate_threshold {
            TrendStrength::Moderate
        } else {
            TrendStrength::Weak
        }
    }
}
