//! Simulated trades produced by the bracket simulator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Direction;

/// Terminal outcome of a bracket trade.
///
/// A signal whose bracket is never touched before data ends produces no
/// `Trade` at all, so an undetermined state never reaches the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeOutcome {
    Win,
    Loss,
}

impl TradeOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeOutcome::Win => "win",
            TradeOutcome::Loss => "loss",
        }
    }
}

impl std::fmt::Display for TradeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One fully resolved trade: entry, fixed SL/TP bracket, exit, realized P&L.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub symbol: String,
    pub direction: Direction,
    pub entry_time: DateTime<Utc>,
    pub exit_time: DateTime<Utc>,
    pub entry_price: f64,
    pub exit_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub stop_pips: f64,
    pub lot_size: f64,
    pub outcome: TradeOutcome,
    pub pnl_pips: f64,
    pub pnl_money: f64,
}

impl Trade {
    pub fn is_win(&self) -> bool {
        self.outcome == TradeOutcome::Win
    }
}
