//! The per-symbol backtest pipeline.
//!
//! Fetch candles, scan for signals, simulate the brackets, summarize.
//! Symbols are independent — cooldown state is scoped per run — so
//! `run_all` fans them out across the rayon pool.

use rayon::prelude::*;
use thiserror::Error;
use tracing::info;

use siglab_core::backtest::{simulate_report, BacktestReport};
use siglab_core::confluence::{generate_signals, SymbolCandles};
use siglab_core::data::{CandleProvider, ProviderError};
use siglab_core::domain::Timeframe;
use siglab_core::indicators::rolling_std;

use crate::config::RunConfig;
use crate::summary::Summary;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Ledger(#[from] crate::ledger::LedgerError),
}

/// One symbol's completed backtest.
#[derive(Debug, Clone)]
pub struct SymbolReport {
    pub symbol: String,
    pub signal_count: usize,
    pub report: BacktestReport,
    pub summary: Summary,
}

/// What happened to a symbol during the run.
#[derive(Debug, Clone)]
pub enum SymbolOutcome {
    Completed(SymbolReport),
    /// The first timeframe that came back empty; the symbol is skipped.
    NoData { symbol: String, timeframe: Timeframe },
}

/// Fetch, scan and simulate one symbol.
pub fn run_symbol(
    provider: &dyn CandleProvider,
    symbol: &str,
    cfg: &RunConfig,
) -> Result<SymbolOutcome, RunError> {
    let candles = SymbolCandles {
        symbol: symbol.to_string(),
        d1: provider.candles(symbol, Timeframe::D1, cfg.candles.d1)?,
        h4: provider.candles(symbol, Timeframe::H4, cfg.candles.h4)?,
        h1: provider.candles(symbol, Timeframe::H1, cfg.candles.h1)?,
    };
    if let Some(timeframe) = candles.missing_timeframe() {
        info!(symbol, %timeframe, "no data, skipping symbol");
        return Ok(SymbolOutcome::NoData {
            symbol: symbol.to_string(),
            timeframe,
        });
    }

    let signals = generate_signals(&candles, &cfg.signal);
    let closes: Vec<f64> = candles.h1.iter().map(|c| c.close).collect();
    let volatility = rolling_std(&closes, cfg.signal.vol_window);
    let pip = cfg.pip_table().spec_for(symbol);
    let report = simulate_report(
        &signals,
        &candles.h1,
        pip,
        &volatility,
        &cfg.backtest,
        &cfg.account,
    );
    let summary = Summary::compute(&report.trades);
    info!(
        symbol,
        signals = signals.len(),
        trades = summary.trade_count,
        wins = summary.wins,
        net_money = summary.net_money,
        "backtest complete"
    );
    Ok(SymbolOutcome::Completed(SymbolReport {
        symbol: symbol.to_string(),
        signal_count: signals.len(),
        report,
        summary,
    }))
}

/// Backtest every configured symbol in parallel.
///
/// Outcomes come back in the configured symbol order regardless of which
/// finished first.
pub fn run_all(
    provider: &dyn CandleProvider,
    cfg: &RunConfig,
) -> Result<Vec<SymbolOutcome>, RunError> {
    cfg.symbols
        .par_iter()
        .map(|symbol| run_symbol(provider, symbol, cfg))
        .collect()
}

/// [`run_all`], then write each completed symbol's ledger to the
/// configured reports directory.
pub fn run_and_export(
    provider: &dyn CandleProvider,
    cfg: &RunConfig,
) -> Result<Vec<SymbolOutcome>, RunError> {
    let outcomes = run_all(provider, cfg)?;
    for outcome in &outcomes {
        if let SymbolOutcome::Completed(report) = outcome {
            crate::ledger::write_backtest_ledger(
                &cfg.paths.reports_dir,
                &report.symbol,
                &report.report.trades,
            )?;
        }
    }
    Ok(outcomes)
}
