//! Exponential Moving Average, weight-adjusted form.
//!
//! EMA[t] = (Σ_{k=0..t} (1-α)^k · x[t-k]) / (Σ_{k=0..t} (1-α)^k)
//! with α = 2 / (span + 1).
//!
//! Unlike an SMA-seeded EMA, the adjusted form is defined from the very
//! first bar: early values are a normalized weighted mean of everything
//! seen so far, converging to the plain recursive EMA as t grows.

/// Compute the adjusted EMA of a series for the given span.
///
/// `span == 0` yields all NaN. A NaN input taints every output from that
/// index onward.
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if span == 0 || n == 0 {
        return result;
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let decay = 1.0 - alpha;

    // Running numerator and normalizer, both decayed each step.
    let mut num = 0.0;
    let mut den = 0.0;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            return result;
        }
        num = v + decay * num;
        den = 1.0 + decay * den;
        result[i] = num / den;
    }

    result
}
