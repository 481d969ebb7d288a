//! Bracket-trade simulator: fractional-risk sizing, SL/TP resolution,
//! loss cooldown.

pub mod params;
pub mod simulator;

pub use params::{AccountPolicy, BracketParams};
pub use simulator::{simulate, simulate_report, BacktestReport, CooldownState, SkipReason, SkippedSignal};
