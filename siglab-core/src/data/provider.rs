//! Candle provider trait and structured error types.
//!
//! The trait abstracts over market-data sources (broker terminal, CSV
//! fixtures) so the scan pipeline can swap implementations and mock for
//! tests. An empty result means data absence for that symbol/timeframe —
//! callers skip the symbol rather than treating it as an error.

use thiserror::Error;

use crate::domain::{Candle, Timeframe};

/// Errors from a candle source.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("malformed candle data for '{symbol}' {timeframe}: {reason}")]
    Malformed {
        symbol: String,
        timeframe: Timeframe,
        reason: String,
    },

    #[error("I/O error reading candles: {0}")]
    Io(#[from] std::io::Error),
}

/// A source of ordered OHLC candles.
///
/// Implementations return the most recent `count` candles, oldest first,
/// ordered by timestamp with no duplicates. Fewer than `count` (including
/// zero) is valid and signals limited or absent history.
pub trait CandleProvider: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Fetch up to `count` candles for a symbol on one timeframe.
    fn candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<Vec<Candle>, ProviderError>;
}
