//! SigLab CLI — confluence scanning and bracket backtesting.
//!
//! Commands:
//! - `backtest` — run the full pipeline over CSV candle files and export
//!   per-symbol trade ledgers
//! - `scan` — print the signals a symbol batch produces, without simulating
//! - `run` — execute live polling cycles (dry-run prints decisions only)
//! - `memory` — inspect or clear the signal memory store

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;

use siglab_core::data::CandleProvider;
use siglab_core::memory::SignalMemory;
use siglab_runner::{
    run_and_export, CsvProvider, CycleOutcome, ExecutionError, Fill, LiveCycle, OrderRequest,
    RunConfig, SymbolOutcome, TradeExecutor,
};

#[derive(Parser)]
#[command(name = "siglab", about = "SigLab — confluence signal engine and bracket backtester")]
struct Cli {
    /// Path to a TOML run config. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Backtest every configured symbol and export trade ledgers.
    Backtest {
        /// Candle directory of `{symbol}_{timeframe}.csv` files.
        /// Overrides the configured path.
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Ledger output directory. Overrides the configured path.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Scan for signals and print them without simulating.
    Scan {
        /// Candle directory. Overrides the configured path.
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Restrict the scan to one symbol.
        #[arg(long)]
        symbol: Option<String>,
    },
    /// Execute live polling cycles.
    Run {
        /// Candle directory. Overrides the configured path.
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Take every decision but place nothing.
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        /// Run a single cycle instead of looping.
        #[arg(long, default_value_t = false)]
        once: bool,
    },
    /// Signal memory store management.
    Memory {
        #[command(subcommand)]
        action: MemoryAction,
    },
}

#[derive(Subcommand)]
enum MemoryAction {
    /// Print every remembered signal.
    Show,
    /// Forget everything.
    Clear,
}

/// Placeholder executor: this build carries no broker bridge, so live
/// placement is only reachable behind `--dry-run`.
struct NoBroker;

impl TradeExecutor for NoBroker {
    fn place(&self, _request: &OrderRequest) -> Result<Fill, ExecutionError> {
        Err(ExecutionError::Unavailable(
            "no broker bridge configured".to_string(),
        ))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => RunConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RunConfig::default(),
    };

    match cli.command {
        Commands::Backtest { data_dir, output_dir } => {
            cmd_backtest(config, data_dir, output_dir)
        }
        Commands::Scan { data_dir, symbol } => cmd_scan(config, data_dir, symbol),
        Commands::Run { data_dir, dry_run, once } => cmd_run(config, data_dir, dry_run, once),
        Commands::Memory { action } => cmd_memory(config, action),
    }
}

fn provider_for(config: &RunConfig, data_dir: Option<PathBuf>) -> CsvProvider {
    CsvProvider::new(data_dir.unwrap_or_else(|| config.paths.data_dir.clone()))
}

fn cmd_backtest(
    mut config: RunConfig,
    data_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let provider = provider_for(&config, data_dir);
    if let Some(dir) = output_dir {
        config.paths.reports_dir = dir;
    }
    let outcomes = run_and_export(&provider, &config).context("backtest run failed")?;

    for outcome in &outcomes {
        match outcome {
            SymbolOutcome::Completed(report) => {
                let path = config
                    .paths
                    .reports_dir
                    .join(format!("{}_trades.csv", report.symbol));
                let s = &report.summary;
                println!(
                    "{:<10} signals {:>4}  trades {:>4}  win rate {:>5.1}%  pf {:>6.2}  net ${:>9.2}  -> {}",
                    report.symbol,
                    report.signal_count,
                    s.trade_count,
                    s.win_rate * 100.0,
                    s.profit_factor,
                    s.net_money,
                    path.display()
                );
            }
            SymbolOutcome::NoData { symbol, timeframe } => {
                println!("{symbol:<10} no {timeframe} data, skipped");
            }
        }
    }
    Ok(())
}

fn cmd_scan(mut config: RunConfig, data_dir: Option<PathBuf>, symbol: Option<String>) -> Result<()> {
    let provider = provider_for(&config, data_dir);
    if let Some(symbol) = symbol {
        config.symbols = vec![symbol];
    }
    for symbol in config.symbols.clone() {
        let counts = config.candles;
        let candles = siglab_core::confluence::SymbolCandles {
            symbol: symbol.clone(),
            d1: provider.candles(&symbol, siglab_core::domain::Timeframe::D1, counts.d1)?,
            h4: provider.candles(&symbol, siglab_core::domain::Timeframe::H4, counts.h4)?,
            h1: provider.candles(&symbol, siglab_core::domain::Timeframe::H1, counts.h1)?,
        };
        if let Some(timeframe) = candles.missing_timeframe() {
            println!("{symbol}: no {timeframe} data");
            continue;
        }
        let signals = siglab_core::confluence::generate_signals(&candles, &config.signal);
        if signals.is_empty() {
            println!("{symbol}: no signals");
            continue;
        }
        for signal in &signals {
            match signal.target_level {
                Some(target) => println!(
                    "{} {} {} @ {:.5} (target {:.5})",
                    signal.time, signal.symbol, signal.direction, signal.entry_price, target
                ),
                None => println!(
                    "{} {} {} @ {:.5}",
                    signal.time, signal.symbol, signal.direction, signal.entry_price
                ),
            }
        }
    }
    Ok(())
}

fn cmd_run(config: RunConfig, data_dir: Option<PathBuf>, dry_run: bool, once: bool) -> Result<()> {
    if !dry_run {
        bail!("no broker bridge is configured in this build; use --dry-run");
    }
    let provider = provider_for(&config, data_dir);
    let executor = NoBroker;
    let mut memory = SignalMemory::load(&config.paths.memory_file);

    loop {
        let report = LiveCycle::new(&provider, &executor, None, &mut memory, &config, dry_run)
            .run(Utc::now());
        if report.halted_for_weekend {
            println!("market closed (weekend), cycle halted");
        }
        for action in &report.actions {
            match &action.outcome {
                CycleOutcome::WouldPlace { request } => println!(
                    "{}: would place {} {:.2} lots (SL {:.5} / TP {:.5})",
                    action.symbol,
                    request.side.as_str(),
                    request.lot_size,
                    request.stop_loss,
                    request.take_profit
                ),
                CycleOutcome::Placed { request, fill } => println!(
                    "{}: placed {} {:.2} lots @ {:.5}, order {}",
                    action.symbol,
                    request.side.as_str(),
                    request.lot_size,
                    fill.price,
                    fill.order_id
                ),
                CycleOutcome::Skipped(reason) => {
                    println!("{}: skipped ({reason:?})", action.symbol)
                }
            }
        }
        if once {
            return Ok(());
        }
        info!(
            minutes = config.poll_interval_minutes,
            "sleeping until next cycle"
        );
        std::thread::sleep(std::time::Duration::from_secs(
            config.poll_interval_minutes * 60,
        ));
    }
}

fn cmd_memory(config: RunConfig, action: MemoryAction) -> Result<()> {
    let mut memory = SignalMemory::load(&config.paths.memory_file);
    match action {
        MemoryAction::Show => {
            if memory.is_empty() {
                println!("memory store is empty");
            }
            for (key, record) in memory.iter() {
                println!(
                    "{key}: signal {} (marked {})",
                    record.signal_time, record.marked_at
                );
            }
            Ok(())
        }
        MemoryAction::Clear => {
            let count = memory.len();
            memory.clear().context("clearing memory store")?;
            println!("cleared {count} record(s)");
            Ok(())
        }
    }
}
