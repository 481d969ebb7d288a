//! Domain types shared across the engine.

pub mod candle;
pub mod pip;
pub mod signal;
pub mod trade;

pub use candle::{Candle, Timeframe};
pub use pip::{PipSpec, PipTable};
pub use signal::{Direction, Signal};
pub use trade::{Trade, TradeOutcome};
