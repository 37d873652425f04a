//! Integration tests for the alpha scanner
//!
//! These tests verify that all components work together correctly.

use anyhow::{anyhow, Result};
use approx::assert_relative_eq;
use chrono::{Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::fs;

use alpha_scanner::backtest::validate_alpha;
use alpha_scanner::data::{CsvHistoryProvider, PriceHistoryProvider};
use alpha_scanner::indicators::directional_indicators;
use alpha_scanner::signals::impulse_state;
use alpha_scanner::universe::StaticUniverse;
use alpha_scanner::{
    AlphaScanner, Candle, Optimizer, ParameterRange, ScanError, Symbol, TrendStrength, MIN_BARS,
};

// =============================================================================
// Test Utilities
// =============================================================================

fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
    let start = Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Candle {
            datetime: start + Duration::days(i as i64),
            open: close,
            high: close + 0.5,
            low: close - 0.5,
            close,
            volume: Some(10_000.0),
        })
        .collect()
}

/// 100, 101, ..., steadily rising
fn generate_ramp_candles(count: usize) -> Vec<Candle> {
    let closes: Vec<f64> = (0..count).map(|i| 100.0 + i as f64).collect();
    candles_from_closes(&closes)
}

/// 100, 101, 100, 101, ...
fn generate_sawtooth_candles(count: usize) -> Vec<Candle> {
    let closes: Vec<f64> = (0..count).map(|i| if i % 2 == 0 { 100.0 } else { 101.0 }).collect();
    candles_from_closes(&closes)
}

/// Generate mock candle data with alternating swings
fn generate_mock_candles(count: usize, base_price: f64, volatility: f64) -> Vec<Candle> {
    let mut candles = Vec::with_capacity(count);
    let mut price = base_price;
    let start = Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap();

    for i in 0..count {
        let change = match i % 7 {
            0 | 1 | 2 => volatility,
            3 => -volatility * 2.0,
            4 => volatility * 0.5,
            _ => -volatility * 0.8,
        };

        price += change;
        candles.push(Candle {
            datetime: start + Duration::days(i as i64),
            open: price - change * 0.3,
            high: price + volatility * 0.6,
            low: price - volatility * 0.4,
            close: price,
            volume: Some(1000.0 + i as f64 * 10.0),
        });
    }

    candles
}

/// In-memory provider; symbols without data fail like a missing file would
struct MockProvider {
    data: HashMap<Symbol, Vec<Candle>>,
}

impl MockProvider {
    fn new(entries: Vec<(&str, Vec<Candle>)>) -> Self {
        MockProvider {
            data: entries
                .into_iter()
                .map(|(s, candles)| (Symbol::new(s), candles))
                .collect(),
        }
    }
}

impl PriceHistoryProvider for MockProvider {
    fn fetch_history(&self, symbol: &Symbol, _lookback_days: u32) -> Result<Vec<Candle>> {
        self.data
            .get(symbol)
            .cloned()
            .ok_or_else(|| anyhow!("unknown symbol {}", symbol))
    }
}

// =============================================================================
// Reference Scenarios
// =============================================================================

#[test]
fn test_ramp_single_ignition_is_invalid() {
    let candles = generate_ramp_candles(60);

    for parameter in 1..=40 {
        let di = directional_indicators(&candles, parameter).unwrap();
        let state = impulse_state(&di);
        let ignitions: Vec<usize> = (0..state.len()).filter(|&i| state.bullish_ignition(i)).collect();
        assert_eq!(ignitions, vec![1], "DI length {}", parameter);
        assert!(di.plus[59] > di.minus[59]);

        let result = validate_alpha(&candles, parameter).unwrap();
        assert_relative_eq!(result.buy_hold_return_pct, 59.0, epsilon = 1e-9);
        assert_relative_eq!(result.strategy_return_pct, 58.0 / 101.0 * 100.0, epsilon = 1e-9);
        assert_eq!(result.trade_count, 1);
        assert!(!result.is_valid);
        assert!(result.alpha_pct < 0.0);
    }
}

#[test]
fn test_sawtooth_never_valid() {
    let candles = generate_sawtooth_candles(60);
    let profile = Optimizer::default().inspect_stability(&candles).unwrap();

    assert_eq!(profile.len(), 40);
    assert_eq!(profile.valid_count(), 0);
    for result in profile.results() {
        assert!(result.strategy_return_pct <= 0.0, "DI length {}", result.parameter);
        assert_relative_eq!(result.buy_hold_return_pct, 1.0, epsilon = 1e-9);
    }
    // no smoothing: every up bar ignites and every down bar exits
    assert_eq!(profile.results()[0].trade_count, 30);
}

#[test]
fn test_flat_series_analysis() {
    let candles = candles_from_closes(&[250.0; 60]);
    let analysis = Optimizer::default()
        .analyze_symbol(&Symbol::new("FLAT"), &candles)
        .unwrap();

    assert_eq!(analysis.optimal_length(), 1);
    assert_eq!(analysis.best.strategy_return_pct, 0.0);
    assert_eq!(analysis.best.buy_hold_return_pct, 0.0);
    assert!(!analysis.is_valid());
    assert!(!analysis.is_buy_signal);
    assert_eq!(analysis.trend_strength, TrendStrength::Weak);
}

// =============================================================================
// Optimization
// =============================================================================

#[test]
fn test_optimize_matches_brute_force() {
    for (count, volatility) in [(80, 1.5), (150, 3.0), (260, 0.7)] {
        let candles = generate_mock_candles(count, 100.0, volatility);
        let optimizer = Optimizer::default();

        let optimum = optimizer.optimize(&candles).unwrap();
        let profile = optimizer.inspect_stability(&candles).unwrap();

        for result in profile.results() {
            assert!(optimum.result.alpha_pct >= result.alpha_pct);
        }
        let first_max = profile
            .results()
            .iter()
            .find(|r| r.alpha_pct == optimum.result.alpha_pct)
            .map(|r| r.parameter);
        assert_eq!(first_max, Some(optimum.parameter));
        assert_eq!(profile.best(), Some(&optimum.result));
    }
}

#[test]
fn test_inspect_stability_covers_range_in_order() {
    let candles = generate_mock_candles(120, 50.0, 1.0);
    let profile = Optimizer::default().inspect_stability(&candles).unwrap();

    assert_eq!(profile.len(), 40);
    for (k, result) in profile.results().iter().enumerate() {
        assert_eq!(result.parameter, k + 1);
    }
}

#[test]
fn test_custom_range() {
    let candles = generate_mock_candles(120, 50.0, 1.0);
    let optimizer = Optimizer::default().with_range(ParameterRange::new(10, 14).unwrap());

    let profile = optimizer.inspect_stability(&candles).unwrap();
    let params: Vec<usize> = profile.results().iter().map(|r| r.parameter).collect();
    assert_eq!(params, vec![10, 11, 12, 13, 14]);

    let optimum = optimizer.optimize(&candles).unwrap();
    assert!((10..=14).contains(&optimum.parameter));
}

#[test]
fn test_invalid_range_is_error() {
    let candles = generate_mock_candles(60, 50.0, 1.0);
    let optimizer = Optimizer::default().with_range(ParameterRange { start: 0, end: 5 });

    assert_eq!(
        optimizer.optimize(&candles),
        Err(ScanError::InvalidRange { start: 0, end: 5 })
    );
}

// =============================================================================
// Scanner
// =============================================================================

#[test]
fn test_scan_isolates_failures() {
    let provider = MockProvider::new(vec![
        ("RAMP", generate_ramp_candles(60)),
        ("SHORT", generate_ramp_candles(MIN_BARS - 1)),
        ("EMPTY", Vec::new()),
        ("MOCK", generate_mock_candles(200, 80.0, 2.0)),
    ]);
    let universe = StaticUniverse::from_symbols(["ramp", "short", "missing", "empty", "mock"]);
    let scanner = AlphaScanner::new(provider, universe, Optimizer::default());

    let report = scanner.scan();

    assert_eq!(report.total_scanned(), 5);
    assert_eq!(report.results.len(), 2);

    let failures: HashMap<&str, &ScanError> = report
        .failures
        .iter()
        .map(|f| (f.symbol.as_str(), &f.error))
        .collect();
    assert_eq!(
        failures["SHORT"],
        &ScanError::InsufficientData {
            required: MIN_BARS,
            available: MIN_BARS - 1
        }
    );
    assert!(matches!(failures["MISSING"], ScanError::UpstreamData { .. }));
    assert!(matches!(failures["EMPTY"], ScanError::UpstreamData { .. }));
}

#[test]
fn test_scan_records_symbol_with_no_viable_length() {
    // a zero first close makes every buy-and-hold return infinite
    let mut broken = generate_ramp_candles(60);
    broken[0].close = 0.0;

    let provider = MockProvider::new(vec![
        ("BROKEN", broken),
        ("RAMP", generate_ramp_candles(60)),
        ("MOCK", generate_mock_candles(200, 80.0, 2.0)),
    ]);
    let universe = StaticUniverse::from_symbols(["BROKEN", "RAMP", "MOCK"]);
    let report = AlphaScanner::new(provider, universe, Optimizer::default()).scan();

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].symbol.as_str(), "BROKEN");
    assert_eq!(
        report.failures[0].error,
        ScanError::NoViableParameter { start: 1, end: 40 }
    );

    let mut analyzed: Vec<&str> = report.results.iter().map(|r| r.symbol.as_str()).collect();
    analyzed.sort_unstable();
    assert_eq!(analyzed, vec!["MOCK", "RAMP"]);
}

#[test]
fn test_scan_is_deterministic_across_modes() {
    let make_scanner = |parallel: bool| {
        let provider = MockProvider::new(vec![
            ("AAA", generate_mock_candles(150, 40.0, 1.0)),
            ("BBB", generate_mock_candles(150, 90.0, 2.5)),
            ("CCC", generate_ramp_candles(90)),
            ("DDD", generate_sawtooth_candles(90)),
        ]);
        let universe = StaticUniverse::from_symbols(["AAA", "BBB", "CCC", "DDD"]);
        AlphaScanner::new(provider, universe, Optimizer::default().with_parallelism(parallel))
            .with_parallelism(parallel)
    };

    let parallel = make_scanner(true).scan();
    let sequential = make_scanner(false).scan();

    assert_eq!(parallel.results, sequential.results);
}

#[test]
fn test_scan_results_are_ranked() {
    let provider = MockProvider::new(vec![
        ("AAA", generate_mock_candles(150, 40.0, 1.0)),
        ("BBB", generate_mock_candles(220, 90.0, 2.5)),
        ("CCC", generate_ramp_candles(90)),
        ("DDD", generate_sawtooth_candles(90)),
    ]);
    let universe = StaticUniverse::from_symbols(["AAA", "BBB", "CCC", "DDD"]);
    let report = AlphaScanner::new(provider, universe, Optimizer::default()).scan();

    let keys: Vec<(bool, bool, f64)> = report
        .results
        .iter()
        .map(|r| (r.is_actionable(), r.is_valid(), r.alpha_pct()))
        .collect();
    for pair in keys.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        assert!(a.0 >= b.0);
        if a.0 == b.0 {
            assert!(a.1 >= b.1);
            if a.1 == b.1 {
                assert!(a.2 >= b.2);
            }
        }
    }
}

#[test]
fn test_csv_provider_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let mut body = String::from("date,open,high,low,close,volume\n");
    for candle in generate_mock_candles(120, 60.0, 1.2) {
        body.push_str(&format!(
            "{},{},{},{},{},{}\n",
            candle.datetime.format("%Y-%m-%d"),
            candle.open,
            candle.high,
            candle.low,
            candle.close,
            candle.volume.unwrap_or_default()
        ));
    }
    fs::write(dir.path().join("FPT.csv"), body).unwrap();

    let scanner = AlphaScanner::new(
        CsvHistoryProvider::new(dir.path()),
        StaticUniverse::from_symbols(["FPT", "HPG"]),
        Optimizer::default(),
    );

    let report = scanner.scan();
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].symbol.as_str(), "HPG");

    let inspection = scanner.inspect(&Symbol::new("FPT")).unwrap();
    assert_eq!(inspection.bar_count, 120);
    assert_eq!(inspection.profile.len(), 40);
    assert_eq!(
        inspection.profile.best().map(|r| r.parameter),
        Some(report.results[0].optimal_length())
    );

    // a short window leaves too few bars
    let short = AlphaScanner::new(
        CsvHistoryProvider::new(dir.path()),
        StaticUniverse::from_symbols(["FPT"]),
        Optimizer::default(),
    )
    .with_lookback_days(30);
    assert!(matches!(
        short.inspect(&Symbol::new("FPT")),
        Err(ScanError::InsufficientData { available: 31, .. })
    ));
}
