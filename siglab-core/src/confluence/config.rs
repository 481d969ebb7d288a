//! Signal engine configuration.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::patterns::PatternConfig;

/// How per-bar condition flags are folded into a signal decision.
///
/// `AllOf` demands the full confluence set (trend, pattern, structure
/// break, Fibonacci proximity, opposing-zone proximity). `ThresholdScore`
/// instead counts the seven scored conditions and fires once `min` of
/// them hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoringPolicy {
    AllOf,
    ThresholdScore { min: u32 },
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        ScoringPolicy::AllOf
    }
}

/// All knobs of the confluence scan.
///
/// Every field has a default matching the production tuning; a partial
/// config file only overrides what it names. Degenerate values (zero
/// windows, zero spans) disable the affected condition rather than panic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Span of the trend EMA over H1 closes.
    pub ema_span: usize,
    /// Bars on each side required to confirm a swing extreme.
    pub swing_lookback: usize,
    /// Window of the rolling close deviation used as the volatility proxy.
    pub vol_window: usize,
    /// Window of the rolling mean the volatility proxy must exceed.
    pub vol_baseline_window: usize,
    /// Gate bars on volatility being above its own baseline.
    pub require_vol_regime: bool,
    /// Inclusive UTC hour band in which signals may fire.
    pub session_start_hour: u32,
    pub session_end_hour: u32,
    /// Body must exceed this fraction of the bar range to count as strong.
    pub strong_body_ratio: f64,
    /// Rolling window for the Fibonacci swing extremes.
    pub fib_window: usize,
    /// Retracement ratios measured down from the window high.
    pub fib_ratios: Vec<f64>,
    /// Relative tolerance for "near a Fibonacci level".
    pub fib_tolerance: f64,
    /// Relative tolerance for a retest of the broken structure level.
    pub retest_tolerance: f64,
    /// Bars on each side a raw H4 extreme must dominate.
    pub zone_window: usize,
    /// Relative tolerance at which raw extremes collapse into one zone.
    pub zone_cluster_tolerance: f64,
    /// Relative tolerance for "near a support/resistance zone".
    pub zone_proximity_tolerance: f64,
    pub patterns: PatternConfig,
    pub policy: ScoringPolicy,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            ema_span: 21,
            swing_lookback: 5,
            vol_window: 14,
            vol_baseline_window: 50,
            require_vol_regime: true,
            session_start_hour: 3,
            session_end_hour: 12,
            strong_body_ratio: 0.5,
            fib_window: 20,
            fib_ratios: vec![0.3, 0.5, 0.618],
            fib_tolerance: 0.002,
            retest_tolerance: 0.003,
            zone_window: 5,
            zone_cluster_tolerance: 0.002,
            zone_proximity_tolerance: 0.01,
            patterns: PatternConfig::default(),
            policy: ScoringPolicy::default(),
        }
    }
}

impl SignalConfig {
    /// True if the timestamp's UTC hour falls inside the session band.
    pub fn in_session(&self, time: DateTime<Utc>) -> bool {
        let hour = time.hour();
        hour >= self.session_start_hour && hour <= self.session_end_hour
    }
}
