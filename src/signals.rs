//! Impulse state machine
//!
//! Tracks run lengths of "rising and dominant" DI bars. The count at bar `i`
//! depends on the count at `i - 1`, so the series is built with a sequential
//! scan carrying `(positive, negative)` rather than per-bar formulas.

use crate::indicators::DirectionalIndicators;

/// Run-length counts on a single bar
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImpulseCounts {
    pub positive: u32,
    pub negative: u32,
}

impl ImpulseCounts {
    /// Apply one transition given (+DI, -DI) on the previous and current bar
    pub fn advance(self, prev: (f64, f64), curr: (f64, f64)) -> Self {
        let (prev_plus, prev_minus) = prev;
        let (plus, minus) = curr;

        if plus > prev_plus && plus > minus {
            ImpulseCounts {
                positive: self.positive + 1,
                negative: 0,
            }
        } else if minus > prev_minus && minus > plus {
            ImpulseCounts {
                positive: 0,
                negative: self.negative + 1,
            }
        } else {
            self
        }
    }
}

/// Aligned bullish / bearish run-length series
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImpulseState {
    pub positive: Vec<u32>,
    pub negative: Vec<u32>,
}

impl ImpulseState {
    pub fn len(&self) -> usize {
        self.positive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positive.is_empty()
    }

    /// A bullish run starts at `i` (count went 0 -> 1)
    pub fn bullish_ignition(&self, i: usize) -> bool {
        i > 0 && i < self.positive.len() && self.positive[i] == 1 && self.positive[i - 1] == 0
    }

    /// A bearish run starts at `i` (count went 0 -> 1)
    pub fn bearish_ignition(&self, i: usize) -> bool {
        i > 0 && i < self.negative.len() && self.negative[i] == 1 && self.negative[i - 1] == 0
    }

    /// Bullish ignition on the final bar
    pub fn ignited_on_last_bar(&self) -> bool {
        match self.positive.len() {
            0 => false,
            1 => self.positive[0] == 1,
            n => self.bullish_ignition(n - 1),
        }
    }
}

/// Build the impulse state from +DI / -DI series.
///
/// Bar 0 starts at (0, 0). The series are read pairwise and any excess in the
/// longer input is ignored.
pub fn impulse_counts(plus_di: &[f64], minus_di: &[f64]) -> ImpulseState {
    let pairs: Vec<(f64, f64)> = plus_di.iter().copied().zip(minus_di.iter().copied()).collect();
    if pairs.is_empty() {
        return ImpulseState::default();
    }

    std::iter::once(ImpulseCounts::default())
        .chain(pairs.windows(2).scan(ImpulseCounts::default(), |state, w| {
            *state = state.advance(w[0], w[1]);
            Some(*state)
        }))
        .map(|c| (c.positive, c.negative))
        .unzip::<u32, u32, Vec<u32>, Vec<u32>>()
        .into()
}

impl From<(Vec<u32>, Vec<u32>)> for ImpulseState {
    fn from((positive, negative): (Vec<u32>, Vec<u32>)) -> Self {
        ImpulseState { positive, negative }
    }
}

/// Convenience wrapper over a computed indicator pair
pub fn impulse_state(di: &DirectionalIndicators) -> ImpulseState {
    impulse_counts(&di.plus, &di.minus)
}
