use serde::{Deserialize, Serialize};

use crate::domain::Trade;

/// Counts over a closed-trade ledger. Breakeven trades are neither winners
/// nor losers.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TradeStats {
    pub trade_count: usize,
    pub winners: usize,
    pub losers: usize,
    /// Fraction of trades that were winners, 0.0 with no trades.
    pub win_rate: f64,
    pub gross_profit: f64,
    /// Sum of losing PnL as a positive magnitude.
    pub gross_loss: f64,
}

impl TradeStats {
    pub fn from_trades(trades: &[Trade]) -> Self {
        let mut stats = TradeStats {
            trade_count: trades.len(),
            ..Default::default()
        };
        for t in trades {
            if t.pnl > 0.0 {
                stats.winners += 1;
                stats.gross_profit += t.pnl;
            } else if t.pnl < 0.0 {
                stats.losers += 1;
                stats.gross_loss += -t.pnl;
            }
        }
        if stats.trade_count > 0 {
            stats.win_rate = stats.winners as f64 / stats.trade_count as f64;
        }
        stats
    }

    pub fn net_pnl(&self) -> f64 {
        self.gross_profit - self.gross_loss
    }
}
