//! Universe scanner
//!
//! Fetches history for every symbol in a universe, runs the DI length
//! optimization on each and ranks the outcomes. A symbol that fails (no data,
//! too few bars, no viable length) is logged and recorded in the report; it
//! never aborts the scan.

use indicatif::ProgressBar;
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::Serialize;
use std::cmp::Reverse;
use tracing::{debug, info, warn};

use crate::data::PriceHistoryProvider;
use crate::error::{ScanError, ScanResult};
use crate::optimizer::Optimizer;
use crate::stability::StabilityProfile;
use crate::universe::TickerUniverse;
use crate::{AnalysisResult, Candle, Symbol, MIN_BARS};

/// Default history window in calendar days
pub const DEFAULT_LOOKBACK_DAYS: u32 = 730;

/// A symbol that dropped out of a scan
#[derive(Debug, Clone, PartialEq)]
pub struct ScanFailure {
    pub symbol: Symbol,
    pub error: ScanError,
}

/// Ranked scan output
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub results: Vec<AnalysisResult>,
    pub failures: Vec<ScanFailure>,
}

impl ScanReport {
    pub fn total_scanned(&self) -> usize {
        self.results.len() + self.failures.len()
    }

    /// Results that pass the alpha guardrails
    pub fn opportunities(&self) -> impl Iterator<Item = &AnalysisResult> {
        self.results.iter().filter(|r| r.is_valid())
    }

    /// Valid results with a bullish ignition on the latest bar
    pub fn signals(&self) -> impl Iterator<Item = &AnalysisResult> {
        self.results.iter().filter(|r| r.is_actionable())
    }

    pub fn opportunity_count(&self) -> usize {
        self.opportunities().count()
    }

    pub fn signal_count(&self) -> usize {
        self.signals().count()
    }
}

/// Deep-dive output for one symbol
#[derive(Debug, Clone, Serialize)]
pub struct Inspection {
    pub symbol: Symbol,
    pub bar_count: usize,
    pub close_price: f64,
    pub profile: StabilityProfile,
}

/// Order results: actionable first, then valid, then alpha descending.
///
/// Each key fully partitions the list before the next applies. The sort is
/// stable, so equal results keep universe order.
pub fn rank_results(results: &mut [AnalysisResult]) {
    results.sort_by_key(|r| {
        (
            Reverse(r.is_actionable()),
            Reverse(r.is_valid()),
            Reverse(OrderedFloat(r.alpha_pct())),
        )
    });
}

/// Runs the optimizer across a ticker universe
pub struct AlphaScanner<P, U> {
    provider: P,
    universe: U,
    optimizer: Optimizer,
    lookback_days: u32,
    parallel: bool,
}

impl<P, U> AlphaScanner<P, U>
where
    P: PriceHistoryProvider,
    U: TickerUniverse,
{
    pub fn new(provider: P, universe: U, optimizer: Optimizer) -> Self {
        AlphaScanner {
            provider,
            universe,
            optimizer,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            parallel: true,
        }
    }

    pub fn with_lookback_days(mut self, days: u32) -> Self {
        self.lookback_days = days;
        self
    }

    /// Toggle parallelism across symbols
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Fetch history; provider errors and empty series both become `UpstreamData`
    fn load(&self, symbol: &Symbol) -> ScanResult<Vec<Candle>> {
        let candles = self
            .provider
            .fetch_history(symbol, self.lookback_days)
            .map_err(|e| ScanError::UpstreamData {
                symbol: symbol.to_string(),
                reason: format!("{:#}", e),
            })?;

        if candles.is_empty() {
            return Err(ScanError::UpstreamData {
                symbol: symbol.to_string(),
                reason: "empty price history".to_string(),
            });
        }
        Ok(candles)
    }

    /// Full analysis of a single symbol
    pub fn analyze(&self, symbol: &Symbol) -> ScanResult<AnalysisResult> {
        let candles = self.load(symbol)?;
        self.optimizer.analyze_symbol(symbol, &candles)
    }

    /// Every DI length in the range for a single symbol
    pub fn inspect(&self, symbol: &Symbol) -> ScanResult<Inspection> {
        let candles = self.load(symbol)?;
        if candles.len() < MIN_BARS {
            return Err(ScanError::InsufficientData {
                required: MIN_BARS,
                available: candles.len(),
            });
        }

        let profile = self.optimizer.inspect_stability(&candles)?;
        info!(
            "Inspected {} over {} bars ({} lengths, {} valid)",
            symbol,
            candles.len(),
            profile.len(),
            profile.valid_count()
        );

        Ok(Inspection {
            symbol: symbol.clone(),
            bar_count: candles.len(),
            close_price: candles.last().map(|c| c.close).unwrap_or_default(),
            profile,
        })
    }

    pub fn scan(&self) -> ScanReport {
        self.run(None)
    }

    /// Scan with one progress tick per finished symbol
    pub fn scan_with_progress(&self, progress: &ProgressBar) -> ScanReport {
        self.run(Some(progress))
    }

    fn run(&self, progress: Option<&ProgressBar>) -> ScanReport {
        let symbols: Vec<Symbol> = self.universe.list_symbols().into_iter().collect();
        info!(
            "Scanning {} symbols (DI {}, {} day lookback)",
            symbols.len(),
            self.optimizer.range(),
            self.lookback_days
        );

        let analyze = |symbol: &Symbol| {
            let outcome = self.analyze(symbol);
            if let Some(pb) = progress {
                pb.set_message(symbol.to_string());
                pb.inc(1);
            }
            (symbol.clone(), outcome)
        };

        let outcomes: Vec<(Symbol, ScanResult<AnalysisResult>)> = if self.parallel {
            symbols.par_iter().map(analyze).collect()
        } else {
            symbols.iter().map(analyze).collect()
        };

        let mut report = ScanReport::default();
        for (symbol, outcome) in outcomes {
            match outcome {
                Ok(result) => {
                    debug!(
                        "{}: DI {} alpha {:+.2}% valid={} buy={}",
                        symbol,
                        result.optimal_length(),
                        result.alpha_pct(),
                        result.is_valid(),
                        result.is_buy_signal
                    );
                    report.results.push(result);
                }
                Err(error) => {
                    warn!("Skipping {}: {}", symbol, error);
                    report.failures.push(ScanFailure { symbol, error });
                }
            }
        }

        rank_results(&mut report.results);
        info!(
            "Scan finished: {} analyzed, {} failed, {} opportunities, {} signals",
            report.results.len(),
            report.failures.len(),
            report.opportunity_count(),
            report.signal_count()
        );
        report
    }
}
