//! Multi-bar reversal structures: double and triple tops/bottoms.
//!
//! Extremes are compared by relative deviation; the final bar must also
//! close in the reversal direction (above the prior close for bottoms,
//! below it for tops).

use crate::domain::Candle;

/// Two lows `lookback` bars apart within `tolerance` of each other, with a
/// rising close on the final bar.
pub fn double_bottom(candles: &[Candle], i: usize, lookback: usize, tolerance: f64) -> bool {
    if lookback == 0 || i < lookback || i >= candles.len() {
        return false;
    }
    let first = candles[i - lookback].low;
    let second = candles[i].low;
    let diff = (first - second).abs() / candles[i].low;
    diff < tolerance && candles[i].close > candles[i - 1].close
}

/// Mirror of `double_bottom` on highs with a falling close.
pub fn double_top(candles: &[Candle], i: usize, lookback: usize, tolerance: f64) -> bool {
    if lookback == 0 || i < lookback || i >= candles.len() {
        return false;
    }
    let first = candles[i - lookback].high;
    let second = candles[i].high;
    let diff = (first - second).abs() / candles[i].high;
    diff < tolerance && candles[i].close < candles[i - 1].close
}

/// Three lows at `i - lookback`, `i - lookback/2` and `i`, each within
/// `tolerance` of their mean, with a rising close on the final bar.
pub fn triple_bottom(candles: &[Candle], i: usize, lookback: usize, tolerance: f64) -> bool {
    if lookback < 2 || i < lookback || i >= candles.len() {
        return false;
    }
    let first = candles[i - lookback].low;
    let middle = candles[i - lookback / 2].low;
    let last = candles[i].low;
    let avg = (first + middle + last) / 3.0;
    (first - avg).abs() / avg < tolerance
        && (middle - avg).abs() / avg < tolerance
        && (last - avg).abs() / avg < tolerance
        && candles[i].close > candles[i - 1].close
}

/// Mirror of `triple_bottom` on highs with a falling close.
pub fn triple_top(candles: &[Candle], i: usize, lookback: usize, tolerance: f64) -> bool {
    if lookback < 2 || i < lookback || i >= candles.len() {
        return false;
    }
    let first = candles[i - lookback].high;
    let middle = candles[i - lookback / 2].high;
    let last = candles[i].high;
    let avg = (first + middle + last) / 3.0;
    (first - avg).abs() / avg < tolerance
        && (middle - avg).abs() / avg < tolerance
        && (last - avg).abs() / avg < tolerance
        && candles[i].close < candles[i - 1].close
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Candle;
    use chrono::TimeZone;

    /// Flat candles whose low and close can be pinned per bar.
    fn candles_with(lows: &[f64], closes: &[f64]) -> Vec<Candle> {
        let base = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        lows.iter()
            .zip(closes)
            .enumerate()
            .map(|(i, (&low, &close))| Candle {
                time: base + chrono::Duration::hours(i as i64),
                open: close,
                high: close + 1.0,
                low,
                close,
            })
            .collect()
    }

    /// Flat candles whose high and close can be pinned per bar.
    fn candles_with_highs(highs: &[f64], closes: &[f64]) -> Vec<Candle> {
        let base = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        highs
            .iter()
            .zip(closes)
            .enumerate()
            .map(|(i, (&high, &close))| Candle {
                time: base + chrono::Duration::hours(i as i64),
                open: close,
                high,
                low: close - 1.0,
                close,
            })
            .collect()
    }

    #[test]
    fn double_bottom_on_matching_lows() {
        // lows at index 0 and 4 nearly equal, close rising into bar 4
        let lows = [100.0, 103.0, 104.0, 103.0, 100.2];
        let closes = [105.0, 106.0, 106.5, 106.0, 107.0];
        let candles = candles_with(&lows, &closes);
        assert!(double_bottom(&candles, 4, 4, 0.005));
    }

    #[test]
    fn double_bottom_rejects_diverging_lows() {
        let lows = [100.0, 103.0, 104.0, 103.0, 102.0];
        let closes = [105.0, 106.0, 106.5, 106.0, 107.0];
        let candles = candles_with(&lows, &closes);
        assert!(!double_bottom(&candles, 4, 4, 0.005));
    }

    #[test]
    fn double_bottom_requires_rising_close() {
        let lows = [100.0, 103.0, 104.0, 103.0, 100.2];
        let closes = [105.0, 106.0, 106.5, 106.0, 105.5]; // falling into bar 4
        let candles = candles_with(&lows, &closes);
        assert!(!double_bottom(&candles, 4, 4, 0.005));
    }

    #[test]
    fn double_bottom_needs_enough_history() {
        let lows = [100.0, 100.1];
        let closes = [101.0, 102.0];
        let candles = candles_with(&lows, &closes);
        assert!(!double_bottom(&candles, 1, 4, 0.005));
        assert!(!double_bottom(&candles, 0, 0, 0.005));
    }

    #[test]
    fn double_top_on_matching_highs() {
        let highs = [110.0, 107.0, 106.0, 107.0, 109.8];
        let closes = [105.0, 104.5, 104.0, 104.5, 103.9];
        let candles = candles_with_highs(&highs, &closes);
        assert!(double_top(&candles, 4, 4, 0.005));
    }

    #[test]
    fn triple_bottom_on_three_matching_lows() {
        // lows at 0, 2, 4 near 100, rising close into bar 4
        let lows = [100.0, 104.0, 100.3, 104.0, 99.9];
        let closes = [105.0, 106.0, 105.5, 106.0, 107.0];
        let candles = candles_with(&lows, &closes);
        assert!(triple_bottom(&candles, 4, 4, 0.005));
    }

    #[test]
    fn triple_bottom_rejects_one_outlier() {
        let lows = [100.0, 104.0, 103.0, 104.0, 99.9];
        let closes = [105.0, 106.0, 105.5, 106.0, 107.0];
        let candles = candles_with(&lows, &closes);
        assert!(!triple_bottom(&candles, 4, 4, 0.005));
    }

    #[test]
    fn triple_top_on_three_matching_highs() {
        let highs = [110.0, 106.0, 110.2, 106.0, 109.9];
        let closes = [105.0, 104.5, 105.0, 104.5, 103.9];
        let candles = candles_with_highs(&highs, &closes);
        assert!(triple_top(&candles, 4, 4, 0.005));
    }

    #[test]
    fn out_of_range_index_is_false_for_every_detector() {
        let lows = [100.0, 103.0, 104.0, 103.0, 100.2];
        let closes = [105.0, 106.0, 106.5, 106.0, 107.0];
        let candles = candles_with(&lows, &closes);
        for i in [candles.len(), candles.len() + 4] {
            assert!(!double_bottom(&candles, i, 4, 0.005));
            assert!(!double_top(&candles, i, 4, 0.005));
            assert!(!triple_bottom(&candles, i, 4, 0.005));
            assert!(!triple_top(&candles, i, 4, 0.005));
        }
        assert!(!double_bottom(&[], 0, 4, 0.005));
    }
}
