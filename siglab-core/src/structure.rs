//! Market structure detection: swing confirmation, forward-filled extremes,
//! and structure-break flags.
//!
//! A swing high at index `i` is confirmed only once `lookback` bars exist on
//! both sides, so confirmation lags price by `lookback` bars. The forward
//! fill is carried as an explicit state machine across a single left-to-right
//! pass: break flags for bar `i` are evaluated against the state as of bar
//! `i - 1`, then bar `i`'s own confirmed swing (if any) is absorbed.

use serde::{Deserialize, Serialize};

use crate::domain::Candle;

/// The most recent confirmed swing extremes, forward-filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StructureState {
    pub last_high: Option<f64>,
    pub last_low: Option<f64>,
}

/// Per-bar structure annotations.
///
/// `swing_high`/`swing_low` carry the extreme confirmed at this bar, if any.
/// `last_high`/`last_low` are the forward-filled state after absorbing this
/// bar. The break flags are evaluated against the pre-absorb state: MSS
/// compares the bar's extreme, CHoCH its close.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StructureMark {
    pub swing_high: Option<f64>,
    pub swing_low: Option<f64>,
    pub last_high: Option<f64>,
    pub last_low: Option<f64>,
    pub mss_long: bool,
    pub mss_short: bool,
    pub choch_long: bool,
    pub choch_short: bool,
}

/// True if the bar's high strictly exceeds the highs at offsets
/// -1, +1, -lookback and +lookback.
pub fn is_swing_high(candles: &[Candle], i: usize, lookback: usize) -> bool {
    if lookback == 0 || i < lookback || i + lookback >= candles.len() {
        return false;
    }
    let h = candles[i].high;
    h > candles[i - 1].high
        && h > candles[i + 1].high
        && h > candles[i - lookback].high
        && h > candles[i + lookback].high
}

/// Mirror of `is_swing_high` on lows.
pub fn is_swing_low(candles: &[Candle], i: usize, lookback: usize) -> bool {
    if lookback == 0 || i < lookback || i + lookback >= candles.len() {
        return false;
    }
    let l = candles[i].low;
    l < candles[i - 1].low
        && l < candles[i + 1].low
        && l < candles[i - lookback].low
        && l < candles[i + lookback].low
}

/// Annotate every bar with swing confirmations, forward-filled extremes and
/// break flags.
pub fn mark_structure(candles: &[Candle], lookback: usize) -> Vec<StructureMark> {
    let n = candles.len();
    let mut marks = Vec::with_capacity(n);
    let mut state = StructureState::default();

    for i in 0..n {
        let candle = &candles[i];
        let mss_long = state.last_high.map_or(false, |h| candle.high > h);
        let mss_short = state.last_low.map_or(false, |l| candle.low < l);
        let choch_long = state.last_high.map_or(false, |h| candle.close > h);
        let choch_short = state.last_low.map_or(false, |l| candle.close < l);

        let swing_high = is_swing_high(candles, i, lookback).then_some(candle.high);
        let swing_low = is_swing_low(candles, i, lookback).then_some(candle.low);
        if let Some(h) = swing_high {
            state.last_high = Some(h);
        }
        if let Some(l) = swing_low {
            state.last_low = Some(l);
        }

        marks.push(StructureMark {
            swing_high,
            swing_low,
            last_high: state.last_high,
            last_low: state.last_low,
            mss_long,
            mss_short,
            choch_long,
            choch_short,
        });
    }

    marks
}
