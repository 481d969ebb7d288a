//! Zone engine: Fibonacci retracement levels and clustered
//! support/resistance, with proximity queries.

pub mod fib;
pub mod sr;

pub use fib::FibLevels;
pub use sr::{raw_extremes, Zone, ZoneKind, ZoneSet};
