//! Trade ledger CSV export.
//!
//! Two shapes: per-symbol backtest ledgers rewritten whole after each run,
//! and the append-only live log whose header is written exactly once.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use siglab_core::domain::{Direction, Trade};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ledger CSV write failed for {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

const BACKTEST_HEADER: [&str; 13] = [
    "symbol",
    "direction",
    "entry_time",
    "exit_time",
    "entry_price",
    "exit_price",
    "stop_loss",
    "take_profit",
    "stop_pips",
    "lot_size",
    "outcome",
    "pnl_pips",
    "pnl_money",
];

/// Write a symbol's backtest ledger to `{dir}/{symbol}_trades.csv`,
/// replacing any previous run's file.
pub fn write_backtest_ledger(
    dir: impl AsRef<Path>,
    symbol: &str,
    trades: &[Trade],
) -> Result<PathBuf, LedgerError> {
    let dir = dir.as_ref();
    let path = dir.join(format!("{symbol}_trades.csv"));
    std::fs::create_dir_all(dir).map_err(|source| LedgerError::Io {
        path: path.clone(),
        source,
    })?;
    let mut writer = csv::Writer::from_path(&path).map_err(|source| LedgerError::Csv {
        path: path.clone(),
        source,
    })?;
    let csv_err = |source| LedgerError::Csv {
        path: path.clone(),
        source,
    };
    writer.write_record(BACKTEST_HEADER).map_err(csv_err)?;
    for t in trades {
        writer
            .write_record([
                t.symbol.as_str(),
                t.direction.as_str(),
                &t.entry_time.to_rfc3339(),
                &t.exit_time.to_rfc3339(),
                &format!("{:.5}", t.entry_price),
                &format!("{:.5}", t.exit_price),
                &format!("{:.5}", t.stop_loss),
                &format!("{:.5}", t.take_profit),
                &format!("{:.1}", t.stop_pips),
                &format!("{:.2}", t.lot_size),
                t.outcome.as_str(),
                &format!("{:.1}", t.pnl_pips),
                &format!("{:.2}", t.pnl_money),
            ])
            .map_err(csv_err)?;
    }
    writer.flush().map_err(|source| LedgerError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// One row of the append-only live log, captured at placement time.
///
/// The exit is unknown when the row is written, so unlike the backtest
/// ledger there is no outcome column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveTradeRecord {
    pub symbol: String,
    pub time: DateTime<Utc>,
    pub direction: Direction,
    pub lot_size: f64,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub order_id: u64,
}

/// Append one live trade, writing the header only if the file is new.
pub fn append_live_trade(
    path: impl AsRef<Path>,
    record: &LiveTradeRecord,
) -> Result<(), LedgerError> {
    let path = path.as_ref();
    let io_err = |source| LedgerError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
    }
    let is_new = !path.exists();
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(io_err)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    let csv_err = |source| LedgerError::Csv {
        path: path.to_path_buf(),
        source,
    };
    if is_new {
        writer
            .write_record([
                "symbol",
                "time",
                "direction",
                "lot_size",
                "entry_price",
                "stop_loss",
                "take_profit",
                "order_id",
            ])
            .map_err(csv_err)?;
    }
    writer
        .write_record([
            record.symbol.as_str(),
            &record.time.to_rfc3339(),
            record.direction.as_str(),
            &format!("{:.2}", record.lot_size),
            &format!("{:.5}", record.entry_price),
            &format!("{:.5}", record.stop_loss),
            &format!("{:.5}", record.take_profit),
            &record.order_id.to_string(),
        ])
        .map_err(csv_err)?;
    writer.flush().map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use siglab_core::domain::TradeOutcome;

    fn sample_trade() -> Trade {
        Trade {
            symbol: "XAUUSDm".to_string(),
            direction: Direction::Long,
            entry_time: Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap(),
            exit_time: Utc.with_ymd_and_hms(2024, 1, 2, 13, 0, 0).unwrap(),
            entry_price: 2034.5,
            exit_price: 2040.5,
            stop_loss: 2031.5,
            take_profit: 2040.5,
            stop_pips: 300.0,
            lot_size: 0.08,
            outcome: TradeOutcome::Win,
            pnl_pips: 600.0,
            pnl_money: 48.0,
        }
    }

    fn sample_live_record() -> LiveTradeRecord {
        LiveTradeRecord {
            symbol: "USDJPYm".to_string(),
            time: Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap(),
            direction: Direction::Short,
            lot_size: 0.13,
            entry_price: 155.2,
            stop_loss: 155.4,
            take_profit: 154.8,
            order_id: 42,
        }
    }

    #[test]
    fn backtest_ledger_has_exact_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_backtest_ledger(dir.path(), "XAUUSDm", &[sample_trade()]).unwrap();
        assert!(path.ends_with("XAUUSDm_trades.csv"));
        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), BACKTEST_HEADER.join(","));
        let row = lines.next().unwrap();
        assert!(row.starts_with("XAUUSDm,long,"));
        assert!(row.contains(",win,"));
        assert!(row.ends_with(",48.00"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn rerun_replaces_the_backtest_ledger() {
        let dir = tempfile::tempdir().unwrap();
        write_backtest_ledger(dir.path(), "XAUUSDm", &[sample_trade(), sample_trade()]).unwrap();
        let path = write_backtest_ledger(dir.path(), "XAUUSDm", &[sample_trade()]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2); // header + one row
    }

    #[test]
    fn live_log_writes_header_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/live_trades.csv");
        append_live_trade(&path, &sample_live_record()).unwrap();
        append_live_trade(&path, &sample_live_record()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let headers = text.lines().filter(|l| l.starts_with("symbol,")).count();
        assert_eq!(headers, 1);
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn live_log_rows_carry_no_outcome() {
        // exits are unknown at append time, so unlike the backtest ledger
        // the live log has no outcome column at all
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("live_trades.csv");
        append_live_trade(&path, &sample_live_record()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text.lines().next().unwrap(),
            "symbol,time,direction,lot_size,entry_price,stop_loss,take_profit,order_id"
        );
        assert!(!text.contains("outcome"));
    }
}
