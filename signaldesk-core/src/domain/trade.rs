//! Trade: a completed single-unit long round trip.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A closed round trip: entry → exit, one unit, long only.
///
/// Field names and order match the `trades` array of the backtest response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub entry_price: f64,
    pub exit_price: f64,
    pub pnl: f64,
}

impl Trade {
    /// Close a position. PnL is `exit_price - entry_price`.
    pub fn close(open: &OpenPosition, exit_date: NaiveDate, exit_price: f64) -> Self {
        Self {
            entry_date: open.entry_date,
            exit_date,
            entry_price: open.entry_price,
            exit_price,
            pnl: exit_price - open.entry_price,
        }
    }

    /// Return on the trade as a fraction of the entry price.
    pub fn return_pct(&self) -> f64 {
        if self.entry_price == 0.0 {
            return 0.0;
        }
        self.pnl / self.entry_price
    }

    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }
}

/// A position still open at the end of the evaluated range.
///
/// Never part of the trade ledger; its mark-to-market is carried in equity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub entry_date: NaiveDate,
    pub entry_price: f64,
}

impl OpenPosition {
    pub fn unrealized(&self, mark_price: f64) -> f64 {
        mark_price - self.entry_price
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn close_computes_unit_pnl() {
        let open = OpenPosition {
            entry_date: date(2),
            entry_price: 100.0,
        };
        let trade = Trade::close(&open, date(9), 107.5);
        assert_eq!(trade.entry_date, date(2));
        assert_eq!(trade.exit_date, date(9));
        assert_eq!(trade.pnl, 7.5);
        assert!(trade.is_winner());
        assert!((trade.return_pct() - 0.075).abs() < 1e-12);
    }

    #[test]
    fn losing_trade_is_not_a_winner() {
        let open = OpenPosition {
            entry_date: date(2),
            entry_price: 50.0,
        };
        let trade = Trade::close(&open, date(3), 45.0);
        assert_eq!(trade.pnl, -5.0);
        assert!(!trade.is_winner());
    }

    #[test]
    fn trade_serializes_wire_fields() {
        let trade = Trade {
            entry_date: date(2),
            exit_date: date(5),
            entry_price: 10.0,
            exit_price: 12.0,
            pnl: 2.0,
        };
        let json = serde_json::to_value(&trade).unwrap();
        assert_eq!(json["entry_date"], "2024-01-02");
        assert_eq!(json["exit_date"], "2024-01-05");
        assert_eq!(json["pnl"], 2.0);
        assert_eq!(json.as_object().unwrap().len(), 5);
    }

    #[test]
    fn unrealized_marks_against_entry() {
        let open = OpenPosition {
            entry_date: date(2),
            entry_price: 20.0,
        };
        assert_eq!(open.unrealized(18.0), -2.0);
    }
}
