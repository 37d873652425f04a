//! Impulse Ignition Alpha Scanner
//!
//! Scans a universe of daily price series for DI impulse ignitions. For each
//! symbol the DI smoothing length is optimized by backtesting a long-only
//! ignition strategy and keeping the length with the best alpha over
//! buy-and-hold, subject to the profitability guardrails.

pub mod backtest;
pub mod config;
pub mod data;
pub mod error;
pub mod indicators;
pub mod optimizer;
pub mod report;
pub mod scanner;
pub mod signals;
pub mod stability;
pub mod types;
pub mod universe;

pub use config::Config;
pub use error::{ScanError, ScanResult};
pub use optimizer::{Optimizer, ParameterRange};
pub use scanner::{AlphaScanner, ScanReport};
pub use types::*;
