//! The per-bar confluence scan.
//!
//! All series are computed over the full H1 sequence; the session and
//! volatility gates then decide per bar whether it may emit at all.
//! Warmup NaNs compare false, so early bars fail their conditions
//! naturally instead of needing explicit exclusion.

use tracing::debug;

use crate::domain::{Candle, Direction, Signal, Timeframe};
use crate::indicators::{ema, rolling_mean, rolling_std};
use crate::patterns::{detect_patterns, PatternFlags};
use crate::structure::{mark_structure, StructureMark};
use crate::zones::{FibLevels, ZoneKind, ZoneSet};

use super::config::{ScoringPolicy, SignalConfig};

/// One symbol's candle batch across the scanned timeframes.
///
/// The signal scan reads H1 for conditions and H4 for zones; D1 is
/// fetched alongside them so a symbol with any dead feed is skipped
/// before analysis starts.
#[derive(Debug, Clone, Default)]
pub struct SymbolCandles {
    pub symbol: String,
    pub d1: Vec<Candle>,
    pub h4: Vec<Candle>,
    pub h1: Vec<Candle>,
}

impl SymbolCandles {
    /// The first timeframe with no data, if any.
    pub fn missing_timeframe(&self) -> Option<Timeframe> {
        if self.d1.is_empty() {
            Some(Timeframe::D1)
        } else if self.h4.is_empty() {
            Some(Timeframe::H4)
        } else if self.h1.is_empty() {
            Some(Timeframe::H1)
        } else {
            None
        }
    }
}

/// Independent boolean conditions evaluated on one bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConditionFlags {
    pub trend_up: bool,
    pub trend_down: bool,
    pub strong_body: bool,
    pub bullish_pattern: bool,
    pub bearish_pattern: bool,
    pub mss_long: bool,
    pub mss_short: bool,
    pub choch_long: bool,
    pub choch_short: bool,
    pub retest_long: bool,
    pub retest_short: bool,
    pub near_fib: bool,
    /// Kind-blind zone proximity, used by the scored policy.
    pub near_zone: bool,
    /// Opposing-kind proximity, used by the strict policy.
    pub near_resistance: bool,
    pub near_support: bool,
}

impl ConditionFlags {
    /// The strict confluence set for a long entry.
    pub fn all_long(&self) -> bool {
        self.trend_up && self.bullish_pattern && self.mss_long && self.near_fib && self.near_resistance
    }

    /// The strict confluence set for a short entry.
    pub fn all_short(&self) -> bool {
        self.trend_down && self.bearish_pattern && self.mss_short && self.near_fib && self.near_support
    }

    /// Additive long score over the seven scored conditions.
    pub fn score_long(&self) -> u32 {
        [
            self.trend_up,
            self.strong_body,
            self.choch_long,
            self.mss_long,
            self.retest_long,
            self.near_fib,
            self.near_zone,
        ]
        .iter()
        .filter(|&&flag| flag)
        .count() as u32
    }

    /// Additive short score over the seven scored conditions.
    pub fn score_short(&self) -> u32 {
        [
            self.trend_down,
            self.strong_body,
            self.choch_short,
            self.mss_short,
            self.retest_short,
            self.near_fib,
            self.near_zone,
        ]
        .iter()
        .filter(|&&flag| flag)
        .count() as u32
    }
}

/// Fold flags into a direction under the given policy.
///
/// When both directions qualify on the same bar, long wins.
pub fn decide(flags: &ConditionFlags, policy: ScoringPolicy) -> Option<Direction> {
    let (long, short) = match policy {
        ScoringPolicy::AllOf => (flags.all_long(), flags.all_short()),
        ScoringPolicy::ThresholdScore { min } => {
            (flags.score_long() >= min, flags.score_short() >= min)
        }
    };
    if long {
        Some(Direction::Long)
    } else if short {
        Some(Direction::Short)
    } else {
        None
    }
}

struct ScanSeries {
    trend_ema: Vec<f64>,
    vol: Vec<f64>,
    vol_baseline: Vec<f64>,
    marks: Vec<StructureMark>,
    fibs: FibLevels,
    zones: ZoneSet,
    patterns: PatternFlags,
}

fn precompute(candles: &SymbolCandles, cfg: &SignalConfig) -> ScanSeries {
    let closes: Vec<f64> = candles.h1.iter().map(|c| c.close).collect();
    let vol = rolling_std(&closes, cfg.vol_window);
    let vol_baseline = rolling_mean(&vol, cfg.vol_baseline_window);
    ScanSeries {
        trend_ema: ema(&closes, cfg.ema_span),
        vol,
        vol_baseline,
        marks: mark_structure(&candles.h1, cfg.swing_lookback),
        fibs: FibLevels::compute(&candles.h1, cfg.fib_window, &cfg.fib_ratios),
        zones: ZoneSet::detect(&candles.h4, cfg.zone_window, cfg.zone_cluster_tolerance),
        patterns: detect_patterns(&candles.h1, &cfg.patterns),
    }
}

fn condition_flags(
    candle: &Candle,
    i: usize,
    series: &ScanSeries,
    cfg: &SignalConfig,
) -> ConditionFlags {
    let close = candle.close;
    let mark = &series.marks[i];
    let zone_tol = cfg.zone_proximity_tolerance;

    let choch_long = mark.choch_long;
    let choch_short = mark.choch_short;
    let retest_long = choch_long
        && mark
            .last_high
            .map_or(false, |h| (candle.low - h).abs() / candle.low < cfg.retest_tolerance);
    let retest_short = choch_short
        && mark
            .last_low
            .map_or(false, |l| (candle.high - l).abs() / candle.high < cfg.retest_tolerance);

    ConditionFlags {
        trend_up: close > series.trend_ema[i],
        trend_down: close < series.trend_ema[i],
        strong_body: candle.body() > cfg.strong_body_ratio * candle.range(),
        bullish_pattern: series.patterns.bullish[i],
        bearish_pattern: series.patterns.bearish[i],
        mss_long: mark.mss_long,
        mss_short: mark.mss_short,
        choch_long,
        choch_short,
        retest_long,
        retest_short,
        near_fib: series.fibs.is_near(i, close, cfg.fib_tolerance),
        near_zone: series.zones.is_near(close, zone_tol),
        near_resistance: series.zones.is_near_kind(close, ZoneKind::Resistance, zone_tol),
        near_support: series.zones.is_near_kind(close, ZoneKind::Support, zone_tol),
    }
}

/// Scan a symbol's candle batch and emit its time-ordered signals.
///
/// At most one signal per bar. The target level is the nearest opposing
/// zone (resistance for longs, support for shorts) when one exists.
pub fn generate_signals(candles: &SymbolCandles, cfg: &SignalConfig) -> Vec<Signal> {
    if candles.h1.is_empty() {
        return Vec::new();
    }
    let series = precompute(candles, cfg);

    let mut signals = Vec::new();
    for (i, candle) in candles.h1.iter().enumerate() {
        if !cfg.in_session(candle.time) {
            continue;
        }
        if cfg.require_vol_regime && !(series.vol[i] > series.vol_baseline[i]) {
            continue;
        }

        let flags = condition_flags(candle, i, &series, cfg);
        let Some(direction) = decide(&flags, cfg.policy) else {
            continue;
        };
        let opposing = match direction {
            Direction::Long => ZoneKind::Resistance,
            Direction::Short => ZoneKind::Support,
        };
        let target_level = series.zones.nearest(candle.close, opposing);
        debug!(
            symbol = %candles.symbol,
            time = %candle.time,
            %direction,
            entry = candle.close,
            "confluence signal"
        );
        signals.push(Signal {
            symbol: candles.symbol.clone(),
            time: candle.time,
            direction,
            entry_price: candle.close,
            target_level,
        });
    }
    signals
}
