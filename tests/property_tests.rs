//! Property tests for indicator, signal and backtest invariants.
//!
//! Uses proptest to verify:
//! 1. DI lines are never negative
//! 2. Bullish and bearish runs are mutually exclusive
//! 3. Impulse state only depends on past bars
//! 4. Every simulated entry is matched by an exit
//! 5. The optimizer's pick dominates every swept length

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use alpha_scanner::backtest::simulate_trades;
use alpha_scanner::indicators::directional_indicators;
use alpha_scanner::signals::{impulse_counts, impulse_state};
use alpha_scanner::{Candle, Optimizer, ParameterRange};

// ── Strategies (proptest) ────────────────────────────────────────────

/// Random walk of bars; each step is (close change, upper wick, lower wick)
fn arb_candles(min: usize, max: usize) -> impl Strategy<Value = Vec<Candle>> {
    prop::collection::vec((-3.0..3.0_f64, 0.0..2.0_f64, 0.0..2.0_f64), min..max).prop_map(|steps| {
        let start = Utc.with_ymd_and_hms(2022, 6, 1, 0, 0, 0).unwrap();
        let mut close = 100.0_f64;
        steps
            .into_iter()
            .enumerate()
            .map(|(i, (change, upper, lower))| {
                let open = close;
                close = (close + change).max(5.0);
                Candle {
                    datetime: start + Duration::days(i as i64),
                    open,
                    high: open.max(close) + upper,
                    low: (open.min(close) - lower).max(1.0),
                    close,
                    volume: None,
                }
            })
            .collect()
    })
}

fn arb_length() -> impl Strategy<Value = usize> {
    1..=40_usize
}

// ── 1-3. Indicators and impulse state ────────────────────────────────

proptest! {
    #[test]
    fn di_is_non_negative(candles in arb_candles(1, 150), length in arb_length()) {
        let di = directional_indicators(&candles, length).unwrap();
        prop_assert_eq!(di.len(), candles.len());
        for i in 0..di.len() {
            prop_assert!(di.plus[i] >= 0.0);
            prop_assert!(di.minus[i] >= 0.0);
        }
    }

    #[test]
    fn runs_are_mutually_exclusive(candles in arb_candles(1, 150), length in arb_length()) {
        let state = impulse_state(&directional_indicators(&candles, length).unwrap());
        for i in 0..state.len() {
            prop_assert!(state.positive[i] == 0 || state.negative[i] == 0);
        }
        prop_assert_eq!(state.positive.first().copied(), Some(0));
        prop_assert_eq!(state.negative.first().copied(), Some(0));
    }

    #[test]
    fn impulse_counts_prefix_deterministic(
        plus in prop::collection::vec(0.0..100.0_f64, 1..120),
        minus in prop::collection::vec(0.0..100.0_f64, 1..120),
        cut in 1..120_usize,
    ) {
        let n = plus.len().min(minus.len());
        let k = cut.min(n);
        let full = impulse_counts(&plus[..n], &minus[..n]);
        let prefix = impulse_counts(&plus[..k], &minus[..k]);

        prop_assert_eq!(&prefix.positive[..], &full.positive[..k]);
        prop_assert_eq!(&prefix.negative[..], &full.negative[..k]);
    }

    #[test]
    fn state_ignores_future_bars(candles in arb_candles(2, 150), length in arb_length(), cut in 1..150_usize) {
        let k = cut.min(candles.len());
        let full = impulse_state(&directional_indicators(&candles, length).unwrap());
        let prefix = impulse_state(&directional_indicators(&candles[..k], length).unwrap());

        prop_assert_eq!(&prefix.positive[..], &full.positive[..k]);
        prop_assert_eq!(&prefix.negative[..], &full.negative[..k]);
    }
}

// ── 4. Trade simulation ──────────────────────────────────────────────

proptest! {
    #[test]
    fn every_entry_has_an_exit(candles in arb_candles(2, 200), length in arb_length()) {
        let state = impulse_state(&directional_indicators(&candles, length).unwrap());
        let sim = simulate_trades(&candles, &state);
        let last = candles.len() - 1;

        for trade in &sim.trades {
            prop_assert!(trade.entry_index >= 1);
            prop_assert!(trade.exit_index >= trade.entry_index);
            prop_assert!(trade.exit_index <= last);
            prop_assert!(state.bullish_ignition(trade.entry_index));
            if trade.forced_exit {
                prop_assert_eq!(trade.exit_index, last);
            } else {
                prop_assert!(state.bearish_ignition(trade.exit_index));
            }
        }
        // one position at a time
        for pair in sim.trades.windows(2) {
            prop_assert!(pair[1].entry_index > pair[0].exit_index);
        }
        // only the final trade can be force-closed
        let forced = sim.trades.iter().filter(|t| t.forced_exit).count();
        prop_assert!(forced <= 1);
        if forced == 1 {
            prop_assert!(sim.trades.last().map(|t| t.forced_exit).unwrap_or(false));
        }
    }
}

// ── 5. Optimizer dominance ───────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn optimum_dominates_sweep(candles in arb_candles(50, 160), end in 5..=40_usize) {
        let optimizer = Optimizer::default().with_range(ParameterRange { start: 1, end });
        let optimum = optimizer.optimize(&candles).unwrap();
        let profile = optimizer.inspect_stability(&candles).unwrap();

        prop_assert_eq!(profile.len(), end);
        for result in profile.results() {
            prop_assert!(optimum.result.alpha_pct >= result.alpha_pct);
            if result.parameter < optimum.parameter {
                prop_assert!(result.alpha_pct < optimum.result.alpha_pct);
            }
        }
    }
}
