//! Fixed-window rolling aggregates.
//!
//! The window must be completely filled before a value is emitted; the
//! first `window - 1` outputs are NaN. A NaN anywhere inside the window
//! makes that output NaN.

/// Rolling maximum over `window` values.
pub fn rolling_max(values: &[f64], window: usize) -> Vec<f64> {
    rolling_fold(values, window, f64::NEG_INFINITY, |acc, v| acc.max(v))
}

/// Rolling minimum over `window` values.
pub fn rolling_min(values: &[f64], window: usize) -> Vec<f64> {
    rolling_fold(values, window, f64::INFINITY, |acc, v| acc.min(v))
}

/// Rolling arithmetic mean over `window` values.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if window == 0 || n < window {
        return result;
    }
    for i in (window - 1)..n {
        let slice = &values[i + 1 - window..=i];
        let sum: f64 = slice.iter().sum();
        result[i] = sum / window as f64;
    }
    result
}

/// Rolling sample standard deviation (one delta degree of freedom).
///
/// A window of 1 has no dispersion estimate and yields NaN throughout.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if window < 2 || n < window {
        return result;
    }
    for i in (window - 1)..n {
        let slice = &values[i + 1 - window..=i];
        let mean: f64 = slice.iter().sum::<f64>() / window as f64;
        let sum_sq: f64 = slice.iter().map(|v| (v - mean) * (v - mean)).sum();
        result[i] = (sum_sq / (window as f64 - 1.0)).sqrt();
    }
    result
}

fn rolling_fold(
    values: &[f64],
    window: usize,
    init: f64,
    fold: impl Fn(f64, f64) -> f64,
) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if window == 0 || n < window {
        return result;
    }
    for i in (window - 1)..n {
        let slice = &values[i + 1 - window..=i];
        if slice.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[i] = slice.iter().fold(init, |acc, &v| fold(acc, v));
    }
    result
}
