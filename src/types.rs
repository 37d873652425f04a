//! Core data types used across the scanner

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimum number of bars required before a series is backtested
pub const MIN_BARS: usize = 50;

/// OHLCV bar. A series of candles is always ordered by `datetime` ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub datetime: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: Option<f64>,
}

impl Candle {
    /// True when high, low and close are all finite numbers
    pub fn has_complete_hlc(&self) -> bool {
        self.high.is_finite() && self.low.is_finite() && self.close.is_finite()
    }
}

/// Ticker symbol
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Symbol(pub String);

impl Symbol {
    /// Tickers are normalized to trimmed upper case
    pub fn new(s: impl Into<String>) -> Self {
        Symbol(s.into().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Backtest outcome for one DI smoothing length
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterResult {
    pub parameter: usize,
    pub alpha_pct: f64,
    pub strategy_return_pct: f64,
    pub buy_hold_return_pct: f64,
    pub is_valid: bool,
    pub trade_count: usize,
}

impl ParameterResult {
    /// Result reported for a series too short to backtest
    pub fn insufficient_data(parameter: usize) -> Self {
        ParameterResult {
            parameter,
            alpha_pct: 0.0,
            strategy_return_pct: 0.0,
            buy_hold_return_pct: 0.0,
            is_valid: false,
            trade_count: 0,
        }
    }
}

/// Qualitative bucket for |+DI - -DI| on the latest bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendStrength {
    Strong,
    Moderate,
    Weak,
}

impl TrendStrength {
    /// Short label used in tables
    pub fn short_label(&self) -> &'static str {
        match self {
            TrendStrength::Strong => "Strong",
            TrendStrength::Moderate => "Mod",
            TrendStrength::Weak => "Weak",
        }
    }
}

impl std::fmt::Display for TrendStrength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            TrendStrength::Strong => "Strong",
            TrendStrength::Moderate => "Moderate",
            TrendStrength::Weak => "Weak",
        };
        write!(f, "{}", label)
    }
}

/// Direction implied by which DI line is on top
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Bull,
    Bear,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trend::Bull => write!(f, "BULL"),
            Trend::Bear => write!(f, "BEAR"),
        }
    }
}

/// Best-of-sweep analysis for one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub symbol: Symbol,
    pub close_price: f64,
    pub best: ParameterResult,
    pub plus_di: f64,
    pub minus_di: f64,
    pub trend_strength: TrendStrength,
    pub is_buy_signal: bool,
    pub scan_range: (usize, usize),
}

impl AnalysisResult {
    pub fn optimal_length(&self) -> usize {
        self.best.parameter
    }

    pub fn is_valid(&self) -> bool {
        self.best.is_valid
    }

    pub fn alpha_pct(&self) -> f64 {
        self.best.alpha_pct
    }

    /// Fresh ignition on a configuration that passed both guardrails
    pub fn is_actionable(&self) -> bool {
        self.is_buy_signal && self.best.is_valid
    }

    pub fn trend(&self) -> Trend {
        if self.plus_di > self.minus_di {
            Trend::Bull
        } else {
            Trend::Bear
        }
    }
}
