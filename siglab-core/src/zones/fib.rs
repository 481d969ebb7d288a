//! Fibonacci retracement levels over a rolling window.

use crate::domain::Candle;
use crate::indicators::{rolling_max, rolling_min};

/// A retracement level measured down from the window high.
pub fn retracement(window_high: f64, window_low: f64, ratio: f64) -> f64 {
    window_high - (window_high - window_low) * ratio
}

/// Per-bar retracement levels derived from the rolling high/low of the
/// last `window` bars. Warmup bars carry NaN extremes and are never near
/// any level.
#[derive(Debug, Clone)]
pub struct FibLevels {
    window_high: Vec<f64>,
    window_low: Vec<f64>,
    ratios: Vec<f64>,
}

impl FibLevels {
    pub fn compute(candles: &[Candle], window: usize, ratios: &[f64]) -> Self {
        let highs: Vec<f64> = candles.iter().map(|c| c.high).collect();
        let lows: Vec<f64> = candles.iter().map(|c| c.low).collect();
        Self {
            window_high: rolling_max(&highs, window),
            window_low: rolling_min(&lows, window),
            ratios: ratios.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.window_high.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window_high.is_empty()
    }

    /// The retracement level for one ratio at bar `i` (NaN during warmup).
    pub fn level(&self, i: usize, ratio: f64) -> f64 {
        retracement(self.window_high[i], self.window_low[i], ratio)
    }

    /// True if `price` is within `tolerance` (relative) of any configured
    /// retracement level at bar `i`.
    pub fn is_near(&self, i: usize, price: f64, tolerance: f64) -> bool {
        self.ratios.iter().any(|&ratio| {
            let level = self.level(i, ratio);
            (price - level).abs() / price < tolerance
        })
    }
}
