//! Data loading and management
//!
//! Loads daily OHLCV history from per-symbol CSV files, cleans it and trims it
//! to the configured lookback window. The scanner only sees data through the
//! [`PriceHistoryProvider`] trait.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use csv::StringRecord;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::{Candle, Symbol};

// =============================================================================
// Provider
// =============================================================================

/// Source of daily price history for one symbol.
///
/// Implementations return candles ascending by datetime with no duplicate
/// timestamps and no missing OHLC values. Any failure is reported as an error
/// or an empty series, never a partially valid one.
pub trait PriceHistoryProvider: Send + Sync {
    fn fetch_history(&self, symbol: &Symbol, lookback_days: u32) -> Result<Vec<Candle>>;
}

/// Reads `{data_dir}/{SYMBOL}.csv`
#[derive(Debug, Clone)]
pub struct CsvHistoryProvider {
    data_dir: PathBuf,
}

impl CsvHistoryProvider {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        CsvHistoryProvider {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, symbol: &Symbol) -> PathBuf {
        self.data_dir.join(format!("{}.csv", symbol.as_str()))
    }
}

impl PriceHistoryProvider for CsvHistoryProvider {
    fn fetch_history(&self, symbol: &Symbol, lookback_days: u32) -> Result<Vec<Candle>> {
        let path = self.path_for(symbol);
        if !path.exists() {
            bail!("Data file not found: {}", path.display());
        }

        let raw = load_csv(&path).context(format!("Failed to load data for {}", symbol))?;
        let raw_len = raw.len();

        // Validate the file as written; cleaning below repairs ordering and duplicates
        let validation = validate_candles(&raw);
        for warning in &validation.warnings {
            warn!("{}: {}", symbol, warning);
        }
        if !validation.is_valid() {
            for error in &validation.errors {
                warn!("{}: {}", symbol, error);
            }
        }

        let candles = keep_lookback(clean_series(raw), lookback_days);

        debug!(
            "Loaded {} candles for {} ({} raw rows, {} day window)",
            candles.len(),
            symbol,
            raw_len,
            lookback_days
        );
        Ok(candles)
    }
}

// =============================================================================
// CSV Data Loading
// =============================================================================

/// Column positions resolved from the CSV header
struct Columns {
    datetime: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
        };

        Ok(Columns {
            datetime: find(&["datetime", "date", "time"]).context("Missing datetime column")?,
            open: find(&["open"]).context("Missing open column")?,
            high: find(&["high"]).context("Missing high column")?,
            low: find(&["low"]).context("Missing low column")?,
            close: find(&["close"]).context("Missing close column")?,
            volume: find(&["volume"]),
        })
    }
}

/// Parse a timestamp as RFC 3339, `%Y-%m-%d %H:%M:%S` or a bare `%Y-%m-%d`
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();
    s.parse::<DateTime<Utc>>()
        .or_else(|_| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .map(|ndt| DateTime::<Utc>::from_naive_utc_and_offset(ndt, Utc))
        })
        .or_else(|_| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map(|d| DateTime::<Utc>::from_naive_utc_and_offset(d.and_time(NaiveTime::MIN), Utc))
        })
        .context(format!("Failed to parse datetime: {}", s))
}

/// Empty cells load as NaN and are dropped by [`clean_series`]
fn parse_price(record: &StringRecord, idx: usize, name: &str) -> Result<f64> {
    let raw = record.get(idx).context(format!("Missing {} column", name))?.trim();
    if raw.is_empty() {
        return Ok(f64::NAN);
    }
    raw.parse().context(format!("Failed to parse {}: {}", name, raw))
}

/// Load OHLCV data from CSV file
pub fn load_csv(path: impl AsRef<Path>) -> Result<Vec<Candle>> {
    let mut reader = csv::Reader::from_path(path.as_ref()).context("Failed to open CSV file")?;
    let columns = Columns::from_headers(reader.headers().context("Failed to read CSV header")?)?;

    let mut candles = Vec::new();

    for (row_idx, result) in reader.records().enumerate() {
        let record = result.context(format!("Failed to read row {}", row_idx + 1))?;

        let dt_str = record.get(columns.datetime).context("Missing datetime column")?;
        let datetime = parse_datetime(dt_str)?;

        let volume = match columns.volume {
            Some(idx) => Some(parse_price(&record, idx, "volume")?).filter(|v| v.is_finite()),
            None => None,
        };

        candles.push(Candle {
            datetime,
            open: parse_price(&record, columns.open, "open")?,
            high: parse_price(&record, columns.high, "high")?,
            low: parse_price(&record, columns.low, "low")?,
            close: parse_price(&record, columns.close, "close")?,
            volume,
        });
    }

    Ok(candles)
}

// =============================================================================
// Cleaning
// =============================================================================

/// Drop rows with missing OHLC, sort ascending and keep the first row per timestamp
pub fn clean_series(mut candles: Vec<Candle>) -> Vec<Candle> {
    let before = candles.len();
    candles.retain(|c| c.open.is_finite() && c.has_complete_hlc());
    let dropped = before - candles.len();
    if dropped > 0 {
        debug!("Dropped {} rows with missing OHLC", dropped);
    }

    candles.sort_by_key(|c| c.datetime);
    candles.dedup_by_key(|c| c.datetime);
    candles
}

/// Keep bars within `lookback_days` calendar days of the latest bar
pub fn keep_lookback(candles: Vec<Candle>, lookback_days: u32) -> Vec<Candle> {
    let Some(latest) = candles.last().map(|c| c.datetime) else {
        return candles;
    };
    // a window reaching past the earliest representable date keeps everything
    let Some(cutoff) = latest.checked_sub_signed(Duration::days(i64::from(lookback_days))) else {
        return candles;
    };
    candles.into_iter().filter(|c| c.datetime >= cutoff).collect()
}

// =============================================================================
// Data Validation
// =============================================================================

/// Validate candle data for consistency
pub fn validate_candles(candles: &[Candle]) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if candles.is_empty() {
        errors.push("No candles provided".to_string());
        return ValidationResult { errors, warnings };
    }

    for (i, candle) in candles.iter().enumerate() {
        if candle.high < candle.low {
            errors.push(format!("Candle {}: high ({}) < low ({})", i, candle.high, candle.low));
        }
        if candle.close <= 0.0 {
            errors.push(format!("Candle {}: invalid close price ({})", i, candle.close));
        }
        if candle.close > candle.high || candle.close < candle.low {
            warnings.push(format!(
                "Candle {}: close ({}) outside range [{}, {}]",
                i, candle.close, candle.low, candle.high
            ));
        }
        if let Some(volume) = candle.volume.filter(|v| *v < 0.0) {
            errors.push(format!("Candle {}: negative volume ({})", i, volume));
        }
        if i > 0 {
            let prev = candles[i - 1].datetime;
            if candle.datetime == prev {
                warnings.push(format!("Candle {}: duplicate timestamp {}", i, candle.datetime));
            } else if candle.datetime < prev {
                warnings.push(format!("Candle {}: not chronological", i));
            }
        }
    }

    ValidationResult { errors, warnings }
}

/// Result of data validation
#[derive(Debug)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
