//! Impulse-ignition backtest
//!
//! Long-only, one position at a time. A bullish ignition opens the position at
//! the bar's close, a bearish ignition closes it. Anything still open on the
//! final bar is closed at the last close.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{ScanError, ScanResult};
use crate::indicators::directional_indicators;
use crate::signals::{impulse_state, ImpulseState};
use crate::{Candle, ParameterResult, MIN_BARS};

/// Completed round trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundTrip {
    pub entry_index: usize,
    pub exit_index: usize,
    pub entry_price: f64,
    pub exit_price: f64,
    /// Closed by end of data rather than a bearish ignition
    pub forced_exit: bool,
}

impl RoundTrip {
    pub fn return_fraction(&self) -> f64 {
        (self.exit_price - self.entry_price) / self.entry_price
    }

    pub fn return_pct(&self) -> f64 {
        self.return_fraction() * 100.0
    }
}

/// Outcome of running the trading rule over one series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeSimulation {
    pub strategy_return_pct: f64,
    pub trades: Vec<RoundTrip>,
}

impl TradeSimulation {
    pub fn trade_count(&self) -> usize {
        self.trades.len()
    }
}

/// Run the ignition entry/exit rule over `candles`.
///
/// `state` must be aligned with `candles`; bars beyond the shorter of the two
/// are not traded.
pub fn simulate_trades(candles: &[Candle], state: &ImpulseState) -> TradeSimulation {
    let n = candles.len().min(state.len());
    let mut trades = Vec::new();
    let mut open: Option<(usize, f64)> = None;
    let mut multiplier = 1.0;

    for i in 1..n {
        let price = candles[i].close;

        match open {
            None if state.bullish_ignition(i) => {
                trace!(bar = i, price, "entry");
                open = Some((i, price));
            }
            Some((entry_index, entry_price)) if state.bearish_ignition(i) => {
                let trade = RoundTrip {
                    entry_index,
                    exit_index: i,
                    entry_price,
                    exit_price: price,
                    forced_exit: false,
                };
                trace!(bar = i, price, ret = trade.return_pct(), "exit");
                multiplier *= 1.0 + trade.return_fraction();
                trades.push(trade);
                open = None;
            }
            _ => {}
        }
    }

    if let Some((entry_index, entry_price)) = open {
        let last = n - 1;
        let trade = RoundTrip {
            entry_index,
            exit_index: last,
            entry_price,
            exit_price: candles[last].close,
            forced_exit: true,
        };
        multiplier *= 1.0 + trade.return_fraction();
        trades.push(trade);
    }

    TradeSimulation {
        strategy_return_pct: (multiplier - 1.0) * 100.0,
        trades,
    }
}

/// Passive return from first to last close, in percent
pub fn buy_hold_return_pct(candles: &[Candle]) -> f64 {
    match (candles.first(), candles.last()) {
        (Some(first), Some(last)) => (last.close - first.close) / first.close * 100.0,
        _ => 0.0,
    }
}

/// Backtest one DI length and apply the dual guardrail:
/// the strategy must be profitable AND beat buy-and-hold.
///
/// Series shorter than [`MIN_BARS`] are not an error; they produce an
/// invalid result with zero alpha.
pub fn validate_alpha(candles: &[Candle], parameter: usize) -> ScanResult<ParameterResult> {
    if parameter == 0 {
        return Err(ScanError::InvalidParameter(parameter));
    }
    if candles.len() < MIN_BARS {
        return Ok(ParameterResult::insufficient_data(parameter));
    }

    let di = directional_indicators(candles, parameter)?;
    let state = impulse_state(&di);
    let simulation = simulate_trades(candles, &state);

    let strategy_return_pct = simulation.strategy_return_pct;
    let buy_hold_return_pct = buy_hold_return_pct(candles);
    let alpha_pct = strategy_return_pct - buy_hold_return_pct;

    if !alpha_pct.is_finite() {
        return Err(ScanError::NonFiniteResult { parameter });
    }

    let profitable = strategy_return_pct > 0.0;
    let beats_market = strategy_return_pct > buy_hold_return_pct;

    Ok(ParameterResult {
        parameter,
        alpha_pct,
        strategy_return_pct,
        buy_hold_return_pct,
        is_valid: profitable && beats_market,
        trade_count: simulation.trade_count(),
    })
}
