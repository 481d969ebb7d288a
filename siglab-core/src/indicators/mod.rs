//! Rolling-window indicators over raw f64 series.
//!
//! Every function returns a vector the same length as its input, with NaN
//! for indexes where the window is not yet full. Downstream comparisons
//! against NaN evaluate to false, so warmup bars simply never qualify.

pub mod ema;
pub mod rolling;

pub use ema::ema;
pub use rolling::{rolling_max, rolling_mean, rolling_min, rolling_std};

/// Create synthetic hourly candles from close prices for testing.
///
/// Generates plausible OHL: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0. Timestamps
/// start at 2024-01-02 00:00 UTC and advance one hour per bar.
#[cfg(test)]
pub fn make_candles(closes: &[f64]) -> Vec<crate::domain::Candle> {
    use crate::domain::Candle;
    use chrono::TimeZone;
    let base = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            let high = open.max(close) + 1.0;
            let low = open.min(close) - 1.0;
            Candle {
                time: base + chrono::Duration::hours(i as i64),
                open,
                high,
                low,
                close,
            }
        })
        .collect()
}

/// Create hourly candles from explicit (open, high, low, close) tuples.
#[cfg(test)]
pub fn candles_from_ohlc(bars: &[(f64, f64, f64, f64)]) -> Vec<crate::domain::Candle> {
    use crate::domain::Candle;
    use chrono::TimeZone;
    let base = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    bars.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close))| Candle {
            time: base + chrono::Duration::hours(i as i64),
            open,
            high,
            low,
            close,
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
