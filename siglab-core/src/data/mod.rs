//! Candle provider seam.

pub mod provider;

pub use provider::{CandleProvider, ProviderError};
