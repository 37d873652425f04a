//! Directional indicators
//!
//! Wilder-smoothed +DI / -DI computed over a full candle series. Every output
//! vector is aligned index-for-index with the input candles.

use crate::error::{ScanError, ScanResult};
use crate::Candle;

/// Aligned +DI / -DI series
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalIndicators {
    pub plus: Vec<f64>,
    pub minus: Vec<f64>,
}

impl DirectionalIndicators {
    pub fn len(&self) -> usize {
        self.plus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plus.is_empty()
    }

    /// (+DI, -DI) on the last bar
    pub fn last(&self) -> Option<(f64, f64)> {
        Some((*self.plus.last()?, *self.minus.last()?))
    }
}

// =============================================================================
// Smoothing
// =============================================================================

/// Wilder's smoothing (RMA), an EMA with factor 1/length seeded with the
/// first input value.
///
/// `out[0] = in[0]`, `out[i] = out[i-1] + (in[i] - out[i-1]) / length`
pub fn smooth(values: &[f64], length: usize) -> ScanResult<Vec<f64>> {
    if length == 0 {
        return Err(ScanError::InvalidParameter(length));
    }

    let factor = length as f64;
    let mut result = Vec::with_capacity(values.len());
    let mut iter = values.iter();

    if let Some(&first) = iter.next() {
        let mut smoothed = first;
        result.push(smoothed);
        for &value in iter {
            smoothed += (value - smoothed) / factor;
            result.push(smoothed);
        }
    }

    Ok(result)
}

// =============================================================================
// Directional Movement
// =============================================================================

/// Calculate True Range
pub fn true_range(candles: &[Candle]) -> Vec<f64> {
    let Some(first) = candles.first() else {
        return Vec::new();
    };

    let mut tr = Vec::with_capacity(candles.len());
    tr.push(first.high - first.low);

    for w in candles.windows(2) {
        let (prev, c) = (&w[0], &w[1]);
        let hl = c.high - c.low;
        let hc = (c.high - prev.close).abs();
        let lc = (c.low - prev.close).abs();
        tr.push(hl.max(hc).max(lc));
    }

    tr
}

/// Raw +DM / -DM per bar. Bar 0 has no predecessor and is 0 for both.
pub fn directional_movement(candles: &[Candle]) -> (Vec<f64>, Vec<f64>) {
    let mut plus_dm = vec![0.0; candles.len()];
    let mut minus_dm = vec![0.0; candles.len()];

    for i in 1..candles.len() {
        let up_move = candles[i].high - candles[i - 1].high;
        let down_move = candles[i - 1].low - candles[i].low;

        if up_move > down_move && up_move > 0.0 {
            plus_dm[i] = up_move;
        }
        if down_move > up_move && down_move > 0.0 {
            minus_dm[i] = down_move;
        }
    }

    (plus_dm, minus_dm)
}

/// Calculate +DI / -DI with Wilder smoothing of TR and DM.
///
/// Bars where smoothed TR is zero report 0 for both lines.
pub fn directional_indicators(candles: &[Candle], length: usize) -> ScanResult<DirectionalIndicators> {
    let (plus_dm, minus_dm) = directional_movement(candles);

    let smoothed_tr = smooth(&true_range(candles), length)?;
    let smoothed_plus = smooth(&plus_dm, length)?;
    let smoothed_minus = smooth(&minus_dm, length)?;

    let mut plus = Vec::with_capacity(candles.len());
    let mut minus = Vec::with_capacity(candles.len());

    for ((&tr, &pdm), &mdm) in smoothed_tr.iter().zip(&smoothed_plus).zip(&smoothed_minus) {
        if tr == 0.0 {
            plus.push(0.0);
            minus.push(0.0);
        } else {
            plus.push(pdm / tr * 100.0);
            minus.push(mdm / tr * 100.0);
        }
    }

    Ok(DirectionalIndicators { plus, minus })
}

// =============================================================================
// Tests
// =============================================================================
