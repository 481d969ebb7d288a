//! Candlestick pattern detectors.
//!
//! All detectors are stateless per-bar boolean functions over the candle
//! sequence. Bars too early for a pattern's lookback simply report false.
//! `detect_patterns` folds the individual detectors into one bullish and
//! one bearish confirmation flag per bar.

pub mod candlestick;
pub mod reversal;

use serde::{Deserialize, Serialize};

use crate::domain::Candle;

pub use candlestick::{
    bearish_engulfing, bullish_engulfing, doji, evening_star, hammer, morning_star, shooting_star,
};
pub use reversal::{double_bottom, double_top, triple_bottom, triple_top};

/// Knobs for the reversal detectors plus the optional extended set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Bars between the two extremes of a double top/bottom.
    pub double_lookback: usize,
    /// Bars spanned by the three extremes of a triple top/bottom.
    pub triple_lookback: usize,
    /// Relative deviation below which extremes count as equal.
    pub tolerance: f64,
    /// Also accept star/hammer shapes as pattern confirmation.
    pub extended_set: bool,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            double_lookback: 20,
            triple_lookback: 30,
            tolerance: 0.005,
            extended_set: false,
        }
    }
}

/// Per-bar pattern confirmation flags.
#[derive(Debug, Clone)]
pub struct PatternFlags {
    pub bullish: Vec<bool>,
    pub bearish: Vec<bool>,
}

/// Evaluate every configured detector across the sequence.
pub fn detect_patterns(candles: &[Candle], cfg: &PatternConfig) -> PatternFlags {
    let n = candles.len();
    let mut bullish = vec![false; n];
    let mut bearish = vec![false; n];

    for i in 0..n {
        let mut bull = bullish_engulfing(candles, i)
            || double_bottom(candles, i, cfg.double_lookback, cfg.tolerance)
            || triple_bottom(candles, i, cfg.triple_lookback, cfg.tolerance);
        let mut bear = bearish_engulfing(candles, i)
            || double_top(candles, i, cfg.double_lookback, cfg.tolerance)
            || triple_top(candles, i, cfg.triple_lookback, cfg.tolerance);
        if cfg.extended_set {
            bull = bull || morning_star(candles, i) || hammer(candles, i);
            bear = bear || evening_star(candles, i) || shooting_star(candles, i);
        }
        bullish[i] = bull;
        bearish[i] = bear;
    }

    PatternFlags { bullish, bearish }
}
