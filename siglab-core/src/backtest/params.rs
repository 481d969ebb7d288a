//! Simulator parameters: bracket geometry and account sizing policy.

use serde::{Deserialize, Serialize};

/// Bracket geometry and cooldown tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BracketParams {
    /// Take-profit distance as a multiple of the stop distance.
    pub reward_risk: f64,
    /// Stop distance as a multiple of the volatility estimate.
    pub stop_vol_multiple: f64,
    /// Bars a direction stays suppressed after a realized loss.
    pub cooldown_bars: usize,
}

impl Default for BracketParams {
    fn default() -> Self {
        Self {
            reward_risk: 2.0,
            stop_vol_multiple: 1.0,
            cooldown_bars: 10,
        }
    }
}

/// Fractional-risk account sizing.
///
/// Lot size is the risk budget divided by the monetary risk per lot implied
/// by the stop distance, truncated down to `lot_step` and floored at
/// `min_lot`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountPolicy {
    pub balance: f64,
    pub risk_fraction: f64,
    pub lot_step: f64,
    pub min_lot: f64,
}

impl Default for AccountPolicy {
    fn default() -> Self {
        Self {
            balance: 5000.0,
            risk_fraction: 0.005,
            lot_step: 0.01,
            min_lot: 0.01,
        }
    }
}

impl AccountPolicy {
    /// Money put at risk per trade.
    pub fn risk_amount(&self) -> f64 {
        self.balance * self.risk_fraction
    }

    /// Lot size for a stop of `stop_pips` pips at `pip_value` per pip per
    /// lot. None for a degenerate stop distance, which the caller must skip
    /// rather than divide through.
    pub fn lot_size(&self, stop_pips: f64, pip_value: f64) -> Option<f64> {
        if !(stop_pips > 0.0) || !(pip_value > 0.0) {
            return None;
        }
        let raw = self.risk_amount() / (stop_pips * pip_value);
        if !raw.is_finite() {
            return None;
        }
        let stepped = (raw / self.lot_step).floor() * self.lot_step;
        Some(stepped.max(self.min_lot))
    }
}
