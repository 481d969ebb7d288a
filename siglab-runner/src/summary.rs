//! Summary statistics — pure functions over a trade list.

use serde::{Deserialize, Serialize};

use siglab_core::domain::Trade;

/// Aggregate results for one symbol's backtest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub trade_count: usize,
    pub wins: usize,
    pub losses: usize,
    /// Fraction of trades that won; 0 when no trades exist.
    pub win_rate: f64,
    /// Gross win money over gross loss money; infinite with wins and no
    /// losses, 0 with no wins.
    pub profit_factor: f64,
    pub net_pips: f64,
    pub net_money: f64,
    pub max_consecutive_losses: usize,
}

impl Summary {
    pub fn compute(trades: &[Trade]) -> Self {
        let wins = trades.iter().filter(|t| t.is_win()).count();
        let losses = trades.len() - wins;
        let gross_win: f64 = trades
            .iter()
            .filter(|t| t.pnl_money > 0.0)
            .map(|t| t.pnl_money)
            .sum();
        let gross_loss: f64 = trades
            .iter()
            .filter(|t| t.pnl_money < 0.0)
            .map(|t| -t.pnl_money)
            .sum();
        let profit_factor = if gross_loss > 0.0 {
            gross_win / gross_loss
        } else if gross_win > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let mut streak = 0usize;
        let mut max_streak = 0usize;
        for trade in trades {
            if trade.is_win() {
                streak = 0;
            } else {
                streak += 1;
                max_streak = max_streak.max(streak);
            }
        }

        Self {
            trade_count: trades.len(),
            wins,
            losses,
            win_rate: if trades.is_empty() {
                0.0
            } else {
                wins as f64 / trades.len() as f64
            },
            profit_factor,
            net_pips: trades.iter().map(|t| t.pnl_pips).sum(),
            net_money: trades.iter().map(|t| t.pnl_money).sum(),
            max_consecutive_losses: max_streak,
        }
    }
}
