//! SigLab Runner — orchestration around the engine crate.
//!
//! This crate builds on `siglab-core` to provide:
//! - TOML run configuration with production defaults
//! - CSV candle loading and a directory-backed `CandleProvider`
//! - The per-symbol backtest pipeline, parallel across symbols
//! - Trade-ledger CSV export (per-symbol backtest files, append-only live log)
//! - Summary statistics over a trade list
//! - The live polling cycle with executor/notifier collaborator traits

pub mod backtest;
pub mod config;
pub mod data_loader;
pub mod ledger;
pub mod live;
pub mod summary;

pub use backtest::{run_all, run_and_export, run_symbol, RunError, SymbolOutcome, SymbolReport};
pub use config::{CandleCounts, ConfigError, PathsConfig, RunConfig};
pub use data_loader::{load_candles, CsvProvider, LoadError};
pub use ledger::{append_live_trade, write_backtest_ledger, LedgerError, LiveTradeRecord};
pub use live::{
    CycleOutcome, CycleReport, ExecutionError, Fill, LiveCycle, Notifier, NotifyError,
    OrderRequest, OrderSide, SkipReason, SymbolAction, TradeExecutor,
};
pub use summary::Summary;
