//! TOML run configuration.
//!
//! Every field carries a production default, so a config file only needs
//! to name what it changes. The empty string (no file at all) is a valid
//! configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use siglab_core::backtest::{AccountPolicy, BracketParams};
use siglab_core::confluence::SignalConfig;
use siglab_core::domain::PipSpec;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// How many candles to request per timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandleCounts {
    pub d1: usize,
    pub h4: usize,
    pub h1: usize,
}

impl Default for CandleCounts {
    fn default() -> Self {
        Self {
            d1: 200,
            h4: 500,
            h1: 1000,
        }
    }
}

/// Filesystem locations used by the runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory of `{symbol}_{timeframe}.csv` candle files.
    pub data_dir: PathBuf,
    /// Directory receiving per-symbol backtest ledgers.
    pub reports_dir: PathBuf,
    /// The signal memory document.
    pub memory_file: PathBuf,
    /// The append-only live trade log.
    pub live_log: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            reports_dir: PathBuf::from("reports"),
            memory_file: PathBuf::from("live_trading/trade_memory.json"),
            live_log: PathBuf::from("logs/live_trades.csv"),
        }
    }
}

/// Everything one scan/backtest/live run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub symbols: Vec<String>,
    pub account: AccountPolicy,
    pub candles: CandleCounts,
    pub signal: SignalConfig,
    pub backtest: BracketParams,
    /// Per-symbol pip spec overrides layered over the built-in table.
    pub pip_overrides: BTreeMap<String, PipSpec>,
    pub paths: PathsConfig,
    /// Minutes between live polling cycles.
    pub poll_interval_minutes: u64,
    /// Halt live cycles on Saturday/Sunday UTC. Off for crypto books.
    pub weekend_gate: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            symbols: vec![
                "XAUUSDm".to_string(),
                "USDJPYm".to_string(),
                "US500m".to_string(),
            ],
            account: AccountPolicy::default(),
            candles: CandleCounts::default(),
            signal: SignalConfig::default(),
            backtest: BracketParams::default(),
            pip_overrides: BTreeMap::new(),
            paths: PathsConfig::default(),
            poll_interval_minutes: 15,
            weekend_gate: true,
        }
    }
}

impl RunConfig {
    /// Load a TOML config file, filling unnamed fields with defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The pip table with configured overrides applied.
    pub fn pip_table(&self) -> siglab_core::domain::PipTable {
        siglab_core::domain::PipTable::builtin().with_overrides(&self.pip_overrides)
    }
}
