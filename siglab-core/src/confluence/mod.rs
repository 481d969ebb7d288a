//! Confluence signal engine: per-bar condition flags folded into
//! directional signals under a configurable scoring policy.

pub mod config;
pub mod engine;

pub use config::{ScoringPolicy, SignalConfig};
pub use engine::{decide, generate_signals, ConditionFlags, SymbolCandles};
