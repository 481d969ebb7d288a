//! SigLab Core — confluence signal detection and bracket-trade simulation.
//!
//! This crate contains the analysis engine:
//! - Domain types (candles, pip specs, signals, trades)
//! - Rolling-window indicators with explicit warmup semantics
//! - Candlestick pattern detectors (engulfing, star, double/triple reversals)
//! - Market structure detector (swing confirmation, MSS/CHoCH flags)
//! - Zone engine (Fibonacci retracement levels, clustered support/resistance)
//! - Confluence signal engine with pluggable scoring policy
//! - Bar-by-bar bracket simulator with fractional-risk sizing and loss cooldown
//! - Signal memory store for cross-cycle dedup

pub mod backtest;
pub mod confluence;
pub mod data;
pub mod domain;
pub mod indicators;
pub mod memory;
pub mod patterns;
pub mod structure;
pub mod zones;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: engine types are Send + Sync.
    ///
    /// The runner fans symbols out across a thread pool, so every type that
    /// crosses the scan boundary must be thread-safe. If any type fails this
    /// check, the build breaks immediately.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::Candle>();
        require_sync::<domain::Candle>();
        require_send::<domain::Timeframe>();
        require_sync::<domain::Timeframe>();
        require_send::<domain::Direction>();
        require_sync::<domain::Direction>();
        require_send::<domain::Signal>();
        require_sync::<domain::Signal>();
        require_send::<domain::Trade>();
        require_sync::<domain::Trade>();
        require_send::<domain::PipSpec>();
        require_sync::<domain::PipSpec>();
        require_send::<domain::PipTable>();
        require_sync::<domain::PipTable>();

        // Detector outputs
        require_send::<structure::StructureMark>();
        require_sync::<structure::StructureMark>();
        require_send::<zones::Zone>();
        require_sync::<zones::Zone>();
        require_send::<zones::ZoneSet>();
        require_sync::<zones::ZoneSet>();
        require_send::<zones::FibLevels>();
        require_sync::<zones::FibLevels>();

        // Engine configuration and state
        require_send::<confluence::SignalConfig>();
        require_sync::<confluence::SignalConfig>();
        require_send::<confluence::ScoringPolicy>();
        require_sync::<confluence::ScoringPolicy>();
        require_send::<confluence::ConditionFlags>();
        require_sync::<confluence::ConditionFlags>();
        require_send::<backtest::AccountPolicy>();
        require_sync::<backtest::AccountPolicy>();
        require_send::<backtest::BracketParams>();
        require_sync::<backtest::BracketParams>();
        require_send::<backtest::CooldownState>();
        require_sync::<backtest::CooldownState>();

        // Memory store
        require_send::<memory::SignalMemory>();
        require_sync::<memory::SignalMemory>();
        require_send::<memory::MemoryRecord>();
        require_sync::<memory::MemoryRecord>();
    }
}
