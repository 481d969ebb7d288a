//! The bar-by-bar bracket simulator.
//!
//! Signals are replayed in time order against the H1 series. Each signal
//! either resolves at the first future bar whose range touches its stop or
//! target (stop checked first within a bar), or is skipped with a reason.
//! The whole pass is deterministic: identical inputs produce an identical
//! trade sequence.

use tracing::debug;

use crate::domain::{Candle, Direction, PipSpec, Signal, Trade, TradeOutcome};

use super::params::{AccountPolicy, BracketParams};

/// Per-direction last-loss bar index, scoped to one simulation run.
///
/// An explicit context object rather than process state, so parallel runs
/// over different symbols never interfere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CooldownState {
    last_loss_long: Option<usize>,
    last_loss_short: Option<usize>,
}

impl CooldownState {
    /// True if `index` falls within `cooldown_bars` of the direction's last
    /// recorded loss.
    pub fn suppresses(&self, index: usize, direction: Direction, cooldown_bars: usize) -> bool {
        let anchor = match direction {
            Direction::Long => self.last_loss_long,
            Direction::Short => self.last_loss_short,
        };
        anchor.map_or(false, |loss| index.saturating_sub(loss) <= cooldown_bars)
    }

    /// Move the direction's anchor to the losing signal's bar index.
    pub fn record_loss(&mut self, index: usize, direction: Direction) {
        match direction {
            Direction::Long => self.last_loss_long = Some(index),
            Direction::Short => self.last_loss_short = Some(index),
        }
    }
}

/// Why a signal produced no trade row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No H1 bar matches the signal time, or the volatility estimate at
    /// that bar is still in warmup.
    VolatilityUndefined,
    /// Within the cooldown window after a same-direction loss.
    Cooldown,
    /// Zero-width stop; sizing would divide by zero.
    DegenerateStop,
    /// Neither bracket level was touched before data ended.
    Unresolved,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::VolatilityUndefined => "volatility undefined",
            SkipReason::Cooldown => "cooldown",
            SkipReason::DegenerateStop => "degenerate stop",
            SkipReason::Unresolved => "unresolved",
        }
    }
}

/// A signal the simulator declined, with its reason.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSignal {
    pub signal: Signal,
    pub reason: SkipReason,
}

/// Full simulation output: the trade ledger plus every skip decision, so a
/// dry run can be audited against a live run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BacktestReport {
    pub trades: Vec<Trade>,
    pub skips: Vec<SkippedSignal>,
}

/// The SL/TP bracket for one signal.
#[derive(Debug, Clone, Copy)]
struct Bracket {
    stop: f64,
    target: f64,
}

fn bracket_for(entry: f64, vol: f64, direction: Direction, params: &BracketParams) -> Bracket {
    let stop_distance = vol * params.stop_vol_multiple;
    match direction {
        Direction::Long => {
            let stop = entry - stop_distance;
            Bracket {
                stop,
                target: entry + (entry - stop) * params.reward_risk,
            }
        }
        Direction::Short => {
            let stop = entry + stop_distance;
            Bracket {
                stop,
                target: entry - (stop - entry) * params.reward_risk,
            }
        }
    }
}

/// First touch of the bracket in `bar`, stop checked before target.
fn touch(bar: &Candle, bracket: Bracket, direction: Direction) -> Option<(f64, TradeOutcome)> {
    match direction {
        Direction::Long => {
            if bar.low <= bracket.stop {
                Some((bracket.stop, TradeOutcome::Loss))
            } else if bar.high >= bracket.target {
                Some((bracket.target, TradeOutcome::Win))
            } else {
                None
            }
        }
        Direction::Short => {
            if bar.high >= bracket.stop {
                Some((bracket.stop, TradeOutcome::Loss))
            } else if bar.low <= bracket.target {
                Some((bracket.target, TradeOutcome::Win))
            } else {
                None
            }
        }
    }
}

/// Replay signals against the H1 series and return the resolved trades.
///
/// `volatility` must be aligned index-for-index with `h1` (NaN during
/// warmup); `rolling_std(close, 14)` is the production estimate.
pub fn simulate(
    signals: &[Signal],
    h1: &[Candle],
    pip: PipSpec,
    volatility: &[f64],
    params: &BracketParams,
    account: &AccountPolicy,
) -> Vec<Trade> {
    simulate_report(signals, h1, pip, volatility, params, account).trades
}

/// Like [`simulate`], but also reports every skipped signal and its reason.
pub fn simulate_report(
    signals: &[Signal],
    h1: &[Candle],
    pip: PipSpec,
    volatility: &[f64],
    params: &BracketParams,
    account: &AccountPolicy,
) -> BacktestReport {
    let mut report = BacktestReport::default();
    let mut cooldown = CooldownState::default();

    for signal in signals {
        let skip = |reason: SkipReason, report: &mut BacktestReport| {
            debug!(
                symbol = %signal.symbol,
                time = %signal.time,
                direction = %signal.direction,
                reason = reason.as_str(),
                "signal skipped"
            );
            report.skips.push(SkippedSignal {
                signal: signal.clone(),
                reason,
            });
        };

        let Ok(index) = h1.binary_search_by_key(&signal.time, |c| c.time) else {
            skip(SkipReason::VolatilityUndefined, &mut report);
            continue;
        };
        let vol = volatility.get(index).copied().unwrap_or(f64::NAN);
        if vol.is_nan() {
            skip(SkipReason::VolatilityUndefined, &mut report);
            continue;
        }

        if cooldown.suppresses(index, signal.direction, params.cooldown_bars) {
            skip(SkipReason::Cooldown, &mut report);
            continue;
        }

        let entry = signal.entry_price;
        let bracket = bracket_for(entry, vol, signal.direction, params);
        let stop_pips = pip.pips((entry - bracket.stop).abs());
        let Some(lot_size) = account.lot_size(stop_pips, pip.pip_value) else {
            skip(SkipReason::DegenerateStop, &mut report);
            continue;
        };

        let resolution = h1[index + 1..]
            .iter()
            .find_map(|bar| touch(bar, bracket, signal.direction).map(|hit| (bar.time, hit)));
        let Some((exit_time, (exit_price, outcome))) = resolution else {
            skip(SkipReason::Unresolved, &mut report);
            continue;
        };

        let mut pnl_pips = pip.pips(exit_price - entry);
        if signal.direction == Direction::Short {
            pnl_pips = -pnl_pips;
        }
        let pnl_money = pnl_pips * pip.pip_value * lot_size;

        if outcome == TradeOutcome::Loss {
            cooldown.record_loss(index, signal.direction);
        }

        report.trades.push(Trade {
            symbol: signal.symbol.clone(),
            direction: signal.direction,
            entry_time: signal.time,
            exit_time,
            entry_price: entry,
            exit_price,
            stop_loss: bracket.stop,
            take_profit: bracket.target,
            stop_pips,
            lot_size,
            outcome,
            pnl_pips,
            pnl_money,
        });
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::assert_approx;
    use chrono::{Duration, TimeZone, Utc};

    fn bar(i: i64, open: f64, high: f64, low: f64, close: f64) -> Candle {
        let base = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        Candle {
            time: base + Duration::hours(i),
            open,
            high,
            low,
            close,
        }
    }

    fn signal_at(i: i64, direction: Direction, entry: f64) -> Signal {
        let base = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        Signal {
            symbol: "XAUUSDm".to_string(),
            time: base + Duration::hours(i),
            direction,
            entry_price: entry,
            target_level: None,
        }
    }

    fn pip() -> PipSpec {
        PipSpec::new(0.01, 1.0)
    }

    #[test]
    fn long_win_resolves_at_target() {
        // entry 100, vol 1 => stop 99, target 102; bar 2 tags the target
        let h1 = vec![
            bar(0, 100.0, 100.5, 99.5, 100.0),
            bar(1, 100.0, 101.0, 99.5, 100.8),
            bar(2, 100.8, 102.5, 100.5, 102.2),
        ];
        let vol = vec![1.0; 3];
        let signals = vec![signal_at(0, Direction::Long, 100.0)];
        let trades = simulate(
            &signals,
            &h1,
            pip(),
            &vol,
            &BracketParams::default(),
            &AccountPolicy::default(),
        );
        assert_eq!(trades.len(), 1);
        let t = &trades[0];
        assert_eq!(t.outcome, TradeOutcome::Win);
        assert_approx(t.exit_price, 102.0, 1e-9);
        assert_eq!(t.exit_time, h1[2].time);
        assert_approx(t.stop_pips, 100.0, 1e-9);
        // risk 25 over 100 pips at 1.0/pip
        assert_approx(t.lot_size, 0.25, 1e-9);
        assert_approx(t.pnl_pips, 200.0, 1e-9);
        assert_approx(t.pnl_money, 50.0, 1e-9);
    }

    #[test]
    fn stop_checked_before_target_within_a_bar() {
        // bar 1 spans both levels; the loss wins the tie
        let h1 = vec![
            bar(0, 100.0, 100.5, 99.5, 100.0),
            bar(1, 100.0, 103.0, 98.5, 101.0),
        ];
        let vol = vec![1.0; 2];
        let signals = vec![signal_at(0, Direction::Long, 100.0)];
        let trades = simulate(
            &signals,
            &h1,
            pip(),
            &vol,
            &BracketParams::default(),
            &AccountPolicy::default(),
        );
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].outcome, TradeOutcome::Loss);
        assert_approx(trades[0].exit_price, 99.0, 1e-9);
    }

    #[test]
    fn short_side_mirrors_bracket_and_pnl_sign() {
        // entry 100, vol 1 => stop 101, target 98
        let h1 = vec![
            bar(0, 100.0, 100.4, 99.6, 100.0),
            bar(1, 100.0, 100.6, 97.5, 98.0),
        ];
        let vol = vec![1.0; 2];
        let signals = vec![signal_at(0, Direction::Short, 100.0)];
        let trades = simulate(
            &signals,
            &h1,
            pip(),
            &vol,
            &BracketParams::default(),
            &AccountPolicy::default(),
        );
        assert_eq!(trades.len(), 1);
        let t = &trades[0];
        assert_eq!(t.outcome, TradeOutcome::Win);
        assert_approx(t.stop_loss, 101.0, 1e-9);
        assert_approx(t.take_profit, 98.0, 1e-9);
        assert!(t.pnl_pips > 0.0);
        assert!(t.pnl_money > 0.0);
    }

    #[test]
    fn unresolved_signal_produces_no_row() {
        // price never reaches stop 99 or target 102 again
        let h1 = vec![
            bar(0, 100.0, 100.5, 99.5, 100.0),
            bar(1, 100.0, 100.8, 99.6, 100.5),
            bar(2, 100.5, 101.0, 99.8, 100.9),
        ];
        let vol = vec![1.0; 3];
        let signals = vec![signal_at(0, Direction::Long, 100.0)];
        let report = simulate_report(
            &signals,
            &h1,
            pip(),
            &vol,
            &BracketParams::default(),
            &AccountPolicy::default(),
        );
        assert!(report.trades.is_empty());
        assert_eq!(report.skips.len(), 1);
        assert_eq!(report.skips[0].reason, SkipReason::Unresolved);
    }

    #[test]
    fn nan_volatility_skips_the_signal() {
        let h1 = vec![bar(0, 100.0, 100.5, 99.5, 100.0), bar(1, 100.0, 103.0, 99.5, 102.0)];
        let vol = vec![f64::NAN, 1.0];
        let signals = vec![signal_at(0, Direction::Long, 100.0)];
        let report = simulate_report(
            &signals,
            &h1,
            pip(),
            &vol,
            &BracketParams::default(),
            &AccountPolicy::default(),
        );
        assert!(report.trades.is_empty());
        assert_eq!(report.skips[0].reason, SkipReason::VolatilityUndefined);
    }

    #[test]
    fn unknown_signal_time_skips_the_signal() {
        let h1 = vec![bar(0, 100.0, 100.5, 99.5, 100.0)];
        let vol = vec![1.0];
        let signals = vec![signal_at(7, Direction::Long, 100.0)];
        let report = simulate_report(
            &signals,
            &h1,
            pip(),
            &vol,
            &BracketParams::default(),
            &AccountPolicy::default(),
        );
        assert!(report.trades.is_empty());
        assert_eq!(report.skips[0].reason, SkipReason::VolatilityUndefined);
    }

    #[test]
    fn zero_volatility_is_a_degenerate_stop() {
        let h1 = vec![bar(0, 100.0, 100.5, 99.5, 100.0), bar(1, 100.0, 101.0, 99.0, 100.0)];
        let vol = vec![0.0; 2];
        let signals = vec![signal_at(0, Direction::Long, 100.0)];
        let report = simulate_report(
            &signals,
            &h1,
            pip(),
            &vol,
            &BracketParams::default(),
            &AccountPolicy::default(),
        );
        assert!(report.trades.is_empty());
        assert_eq!(report.skips[0].reason, SkipReason::DegenerateStop);
    }

    #[test]
    fn loss_cooldown_suppresses_at_ten_bars_not_eleven() {
        // bar 0 long loses immediately; later longs at distances 10 and 11
        let mut h1 = vec![
            bar(0, 100.0, 100.5, 99.5, 100.0),
            bar(1, 100.0, 100.2, 98.5, 99.2), // stop 99 hit => loss
        ];
        for i in 2..30 {
            h1.push(bar(i, 100.0, 100.4, 99.6, 100.0));
        }
        // make both later signals resolvable as wins
        h1.push(bar(30, 100.0, 103.0, 99.9, 102.5));
        let vol = vec![1.0; h1.len()];
        let suppressed = vec![
            signal_at(0, Direction::Long, 100.0),
            signal_at(10, Direction::Long, 100.0),
        ];
        let trades = simulate(
            &suppressed,
            &h1,
            pip(),
            &vol,
            &BracketParams::default(),
            &AccountPolicy::default(),
        );
        assert_eq!(trades.len(), 1, "distance-10 signal must be suppressed");

        let allowed = vec![
            signal_at(0, Direction::Long, 100.0),
            signal_at(11, Direction::Long, 100.0),
        ];
        let trades = simulate(
            &allowed,
            &h1,
            pip(),
            &vol,
            &BracketParams::default(),
            &AccountPolicy::default(),
        );
        assert_eq!(trades.len(), 2, "distance-11 signal must pass");
    }

    #[test]
    fn cooldown_is_per_direction() {
        // long loss at bar 0 must not suppress a short at bar 3
        let mut h1 = vec![
            bar(0, 100.0, 100.5, 99.5, 100.0),
            bar(1, 100.0, 100.2, 98.5, 99.2), // long stop hit
            bar(2, 99.2, 100.1, 99.0, 100.0),
            bar(3, 100.0, 100.4, 99.6, 100.0),
        ];
        for i in 4..10 {
            h1.push(bar(i, 100.0, 100.4, 97.5, 98.0));
        }
        let vol = vec![1.0; h1.len()];
        let signals = vec![
            signal_at(0, Direction::Long, 100.0),
            signal_at(3, Direction::Short, 100.0),
        ];
        let trades = simulate(
            &signals,
            &h1,
            pip(),
            &vol,
            &BracketParams::default(),
            &AccountPolicy::default(),
        );
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].direction, Direction::Long);
        assert_eq!(trades[1].direction, Direction::Short);
    }

    #[test]
    fn win_does_not_move_the_cooldown_anchor() {
        let mut state = CooldownState::default();
        assert!(!state.suppresses(5, Direction::Long, 10));
        state.record_loss(5, Direction::Long);
        assert!(state.suppresses(15, Direction::Long, 10));
        assert!(!state.suppresses(16, Direction::Long, 10));
        assert!(!state.suppresses(15, Direction::Short, 10));
    }

    #[test]
    fn replay_is_deterministic() {
        let mut h1 = Vec::new();
        for i in 0..40 {
            let drift = (i as f64 * 0.7).sin() * 2.0;
            h1.push(bar(i, 100.0 + drift, 101.5 + drift, 98.5 + drift, 100.5 + drift));
        }
        let vol = vec![1.2; h1.len()];
        let signals = vec![
            signal_at(0, Direction::Long, 100.0),
            signal_at(5, Direction::Short, 100.5),
            signal_at(20, Direction::Long, 99.8),
        ];
        let params = BracketParams::default();
        let account = AccountPolicy::default();
        let first = simulate(&signals, &h1, pip(), &vol, &params, &account);
        let second = simulate(&signals, &h1, pip(), &vol, &params, &account);
        assert_eq!(first, second);
    }
}
