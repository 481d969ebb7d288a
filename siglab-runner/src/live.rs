//! The live polling cycle.
//!
//! One cycle walks the configured symbols: fetch, scan, dedup, size, and
//! hand the newest signal to the executor. A dry run takes every decision
//! identically and stops just short of placement, so its report can be
//! diffed against a live run. Collaborators (broker, notification channel)
//! enter through traits; the notifier is best-effort and never fatal.

use chrono::{DateTime, Datelike, Utc, Weekday};
use thiserror::Error;
use tracing::{debug, info, warn};

use siglab_core::confluence::{generate_signals, SymbolCandles};
use siglab_core::data::CandleProvider;
use siglab_core::domain::{Direction, Timeframe};
use siglab_core::indicators::rolling_std;
use siglab_core::memory::SignalMemory;

use crate::config::RunConfig;
use crate::ledger::{append_live_trade, LiveTradeRecord};

/// Broker-facing order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "buy",
            OrderSide::Sell => "sell",
        }
    }
}

impl From<Direction> for OrderSide {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Long => OrderSide::Buy,
            Direction::Short => OrderSide::Sell,
        }
    }
}

/// A fully sized bracket order handed to the executor.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: OrderSide,
    pub lot_size: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
}

/// A successful placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fill {
    pub price: f64,
    pub order_id: u64,
}

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("order rejected: {0}")]
    Rejected(String),

    #[error("broker unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification failed: {0}")]
    Send(String),
}

/// Order execution collaborator. No retries happen here; a failure
/// surfaces in the cycle report and the signal stays unmarked.
pub trait TradeExecutor {
    fn place(&self, request: &OrderRequest) -> Result<Fill, ExecutionError>;
}

/// Outbound text alerts, best-effort.
pub trait Notifier {
    fn notify(&self, message: &str) -> Result<(), NotifyError>;
}

/// Why a symbol produced no placement this cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The candle source itself failed for this symbol.
    ProviderFailure(String),
    /// A timeframe came back empty.
    MissingData(Timeframe),
    NoSignal,
    AlreadyTraded,
    VolatilityUndefined,
    DegenerateStop,
    ExecutionFailed(String),
}

/// The terminal state of one symbol in one cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Placed { request: OrderRequest, fill: Fill },
    /// Dry run: every check passed, placement withheld.
    WouldPlace { request: OrderRequest },
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolAction {
    pub symbol: String,
    pub outcome: CycleOutcome,
}

/// Everything that happened in one polling cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    /// True if the weekend gate halted the cycle before any symbol ran.
    pub halted_for_weekend: bool,
    pub actions: Vec<SymbolAction>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn is_weekend(now: DateTime<Utc>) -> bool {
    matches!(now.weekday(), Weekday::Sat | Weekday::Sun)
}

/// One pass of the live loop. The caller owns the cadence around it.
pub struct LiveCycle<'a> {
    provider: &'a dyn CandleProvider,
    executor: &'a dyn TradeExecutor,
    notifier: Option<&'a dyn Notifier>,
    memory: &'a mut SignalMemory,
    config: &'a RunConfig,
    dry_run: bool,
}

impl<'a> LiveCycle<'a> {
    pub fn new(
        provider: &'a dyn CandleProvider,
        executor: &'a dyn TradeExecutor,
        notifier: Option<&'a dyn Notifier>,
        memory: &'a mut SignalMemory,
        config: &'a RunConfig,
        dry_run: bool,
    ) -> Self {
        Self {
            provider,
            executor,
            notifier,
            memory,
            config,
            dry_run,
        }
    }

    /// Run one cycle over every configured symbol at the given clock.
    pub fn run(&mut self, now: DateTime<Utc>) -> CycleReport {
        if self.config.weekend_gate && is_weekend(now) {
            info!(%now, "weekend gate: market closed, cycle halted");
            return CycleReport {
                halted_for_weekend: true,
                actions: Vec::new(),
            };
        }
        let symbols = self.config.symbols.clone();
        let actions = symbols
            .iter()
            .map(|symbol| SymbolAction {
                symbol: symbol.clone(),
                outcome: self.run_symbol(symbol, now),
            })
            .collect();
        CycleReport {
            halted_for_weekend: false,
            actions,
        }
    }

    fn run_symbol(&mut self, symbol: &str, now: DateTime<Utc>) -> CycleOutcome {
        let skip = |reason: SkipReason| {
            debug!(symbol, ?reason, "symbol skipped");
            CycleOutcome::Skipped(reason)
        };

        let counts = self.config.candles;
        let fetched = (|| {
            Ok::<_, siglab_core::data::ProviderError>(SymbolCandles {
                symbol: symbol.to_string(),
                d1: self.provider.candles(symbol, Timeframe::D1, counts.d1)?,
                h4: self.provider.candles(symbol, Timeframe::H4, counts.h4)?,
                h1: self.provider.candles(symbol, Timeframe::H1, counts.h1)?,
            })
        })();
        let candles = match fetched {
            Ok(candles) => candles,
            Err(err) => {
                warn!(symbol, %err, "candle fetch failed");
                return skip(SkipReason::ProviderFailure(err.to_string()));
            }
        };
        if let Some(timeframe) = candles.missing_timeframe() {
            return skip(SkipReason::MissingData(timeframe));
        }

        let signals = generate_signals(&candles, &self.config.signal);
        let Some(latest) = signals.last() else {
            return skip(SkipReason::NoSignal);
        };

        if self
            .memory
            .already_traded_at(symbol, latest.time, latest.direction, now)
        {
            return skip(SkipReason::AlreadyTraded);
        }

        let closes: Vec<f64> = candles.h1.iter().map(|c| c.close).collect();
        let volatility = rolling_std(&closes, self.config.signal.vol_window);
        let vol = candles
            .h1
            .binary_search_by_key(&latest.time, |c| c.time)
            .ok()
            .and_then(|i| volatility.get(i).copied())
            .unwrap_or(f64::NAN);
        if vol.is_nan() {
            return skip(SkipReason::VolatilityUndefined);
        }

        // live prices go to the broker rounded to 2 decimals
        let entry = latest.entry_price;
        let stop_distance = vol * self.config.backtest.stop_vol_multiple;
        let (stop_loss, take_profit) = match latest.direction {
            Direction::Long => (
                round2(entry - stop_distance),
                round2(entry + stop_distance * self.config.backtest.reward_risk),
            ),
            Direction::Short => (
                round2(entry + stop_distance),
                round2(entry - stop_distance * self.config.backtest.reward_risk),
            ),
        };
        let pip = self.config.pip_table().spec_for(symbol);
        let stop_pips = pip.pips((entry - stop_loss).abs());
        let Some(lot_size) = self.config.account.lot_size(stop_pips, pip.pip_value) else {
            return skip(SkipReason::DegenerateStop);
        };

        let request = OrderRequest {
            symbol: symbol.to_string(),
            side: latest.direction.into(),
            lot_size,
            stop_loss,
            take_profit,
        };
        info!(
            symbol,
            direction = %latest.direction,
            entry,
            stop_loss,
            take_profit,
            lot_size,
            dry_run = self.dry_run,
            "confluence entry ready"
        );
        if self.dry_run {
            return CycleOutcome::WouldPlace { request };
        }

        let fill = match self.executor.place(&request) {
            Ok(fill) => fill,
            Err(err) => {
                warn!(symbol, %err, "trade placement failed");
                return skip(SkipReason::ExecutionFailed(err.to_string()));
            }
        };

        let record = LiveTradeRecord {
            symbol: symbol.to_string(),
            time: now,
            direction: latest.direction,
            lot_size,
            entry_price: fill.price,
            stop_loss,
            take_profit,
            order_id: fill.order_id,
        };
        if let Err(err) = append_live_trade(&self.config.paths.live_log, &record) {
            warn!(symbol, %err, "live ledger append failed");
        }
        if let Err(err) = self
            .memory
            .mark_traded_at(symbol, latest.time, latest.direction, now)
        {
            warn!(symbol, %err, "memory store persist failed");
        }
        if let Some(notifier) = self.notifier {
            let message = format!(
                "{} {} {:.2} lots @ {:.5} (SL {:.5} / TP {:.5})",
                symbol,
                request.side.as_str(),
                lot_size,
                fill.price,
                stop_loss,
                take_profit
            );
            if let Err(err) = notifier.notify(&message) {
                warn!(symbol, %err, "notification failed");
            }
        }
        info!(symbol, order_id = fill.order_id, price = fill.price, "trade placed");
        CycleOutcome::Placed { request, fill }
    }
}
