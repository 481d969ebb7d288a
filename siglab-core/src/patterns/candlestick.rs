//! Single- and multi-bar candlestick shapes.
//!
//! Each function inspects the bar at `i` (plus up to two preceding bars)
//! and returns false when there is not enough history or `i` is past the
//! end of the series.

use crate::domain::Candle;

/// Prior bar bearish, current bar bullish with a body that opens below the
/// prior close and closes above the prior open.
pub fn bullish_engulfing(candles: &[Candle], i: usize) -> bool {
    let Some(cur) = candles.get(i) else {
        return false;
    };
    if i < 1 {
        return false;
    }
    let prev = &candles[i - 1];
    prev.close < prev.open
        && cur.close > cur.open
        && cur.close > prev.open
        && cur.open < prev.close
}

/// Mirror of `bullish_engulfing`.
pub fn bearish_engulfing(candles: &[Candle], i: usize) -> bool {
    let Some(cur) = candles.get(i) else {
        return false;
    };
    if i < 1 {
        return false;
    }
    let prev = &candles[i - 1];
    prev.close > prev.open
        && cur.close < cur.open
        && cur.close < prev.open
        && cur.open > prev.close
}

/// Two bearish bars followed by a bullish bar closing above the first
/// bar's open.
pub fn morning_star(candles: &[Candle], i: usize) -> bool {
    let Some(cur) = candles.get(i) else {
        return false;
    };
    if i < 2 {
        return false;
    }
    let first = &candles[i - 2];
    let second = &candles[i - 1];
    first.close < first.open
        && second.close < second.open
        && cur.close > cur.open
        && cur.close > first.open
}

/// Mirror of `morning_star`.
pub fn evening_star(candles: &[Candle], i: usize) -> bool {
    let Some(cur) = candles.get(i) else {
        return false;
    };
    if i < 2 {
        return false;
    }
    let first = &candles[i - 2];
    let second = &candles[i - 1];
    first.close > first.open
        && second.close > second.open
        && cur.close < cur.open
        && cur.close < first.open
}

/// Bullish bar whose lower shadow is more than twice its body.
pub fn hammer(candles: &[Candle], i: usize) -> bool {
    let Some(cur) = candles.get(i) else {
        return false;
    };
    let lower_shadow = cur.open - cur.low;
    cur.close > cur.open && lower_shadow > 2.0 * cur.body()
}

/// Bearish bar whose upper shadow is more than twice its body.
pub fn shooting_star(candles: &[Candle], i: usize) -> bool {
    let Some(cur) = candles.get(i) else {
        return false;
    };
    let upper_shadow = cur.high - cur.close;
    cur.close < cur.open && upper_shadow > 2.0 * cur.body()
}

/// Body smaller than a tenth of the bar's range. A zero-range bar never
/// qualifies (0/0 is NaN and NaN comparisons are false).
pub fn doji(candles: &[Candle], i: usize) -> bool {
    let Some(cur) = candles.get(i) else {
        return false;
    };
    cur.body() / cur.range() < 0.1
}
