//! CSV candle loading and the directory-backed provider.
//!
//! Candle files are `time,open,high,low,close` with one of two timestamp
//! forms: RFC 3339 or the broker export's naive `YYYY-MM-DD HH:MM:SS`
//! (interpreted as UTC). A missing file means the symbol has no data on
//! that timeframe, which the pipeline treats as skip, not failure.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use thiserror::Error;
use tracing::warn;

use siglab_core::data::{CandleProvider, ProviderError};
use siglab_core::domain::{Candle, Timeframe};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("bad record in {path} at line {line}: {reason}")]
    BadRecord {
        path: PathBuf,
        line: u64,
        reason: String,
    },
}

fn parse_time(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(text) {
        return Some(t.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Load a candle file, oldest first.
///
/// Rows that break timestamp order are dropped with a warning; malformed
/// fields are an error.
pub fn load_candles(path: impl AsRef<Path>) -> Result<Vec<Candle>, LoadError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(text.as_bytes());

    let mut candles: Vec<Candle> = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let line = record.position().map_or(0, |p| p.line());
        let bad = |reason: String| LoadError::BadRecord {
            path: path.to_path_buf(),
            line,
            reason,
        };
        if record.len() < 5 {
            return Err(bad(format!("expected 5 columns, got {}", record.len())));
        }
        let time = parse_time(record[0].trim())
            .ok_or_else(|| bad(format!("unparseable timestamp '{}'", &record[0])))?;
        let mut fields = [0.0f64; 4];
        for (slot, idx) in fields.iter_mut().zip(1..5) {
            *slot = record[idx]
                .trim()
                .parse()
                .map_err(|_| bad(format!("unparseable number '{}'", &record[idx])))?;
        }
        let candle = Candle {
            time,
            open: fields[0],
            high: fields[1],
            low: fields[2],
            close: fields[3],
        };
        if let Some(last) = candles.last() {
            if candle.time <= last.time {
                warn!(path = %path.display(), line, "out-of-order candle dropped");
                continue;
            }
        }
        candles.push(candle);
    }
    Ok(candles)
}

/// A `CandleProvider` over a directory of `{symbol}_{timeframe}.csv` files.
#[derive(Debug, Clone)]
pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn file_for(&self, symbol: &str, timeframe: Timeframe) -> PathBuf {
        self.dir.join(format!("{symbol}_{timeframe}.csv"))
    }
}

impl CandleProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<Vec<Candle>, ProviderError> {
        let path = self.file_for(symbol, timeframe);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let mut candles = load_candles(&path).map_err(|err| match err {
            LoadError::Io { source, .. } => ProviderError::Io(source),
            other => ProviderError::Malformed {
                symbol: symbol.to_string(),
                timeframe,
                reason: other.to_string(),
            },
        })?;
        if candles.len() > count {
            candles.drain(..candles.len() - count);
        }
        Ok(candles)
    }
}
