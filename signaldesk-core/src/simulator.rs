//! Trade simulator: replays crossover signals over the bar series.
//!
//! Long only, one unit, one position at a time. Fills happen at the close of
//! the signal date. A position still open after the last bar is left open and
//! marked to market; it never enters the trade ledger.

use serde::{Deserialize, Serialize};

use crate::domain::{EquityPoint, OpenPosition, PriceBar, Trade};
use crate::signals::{Signal, SignalPoint};

/// Position state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PositionState {
    Flat,
    Long(OpenPosition),
}

/// Output of one simulation pass.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Simulation {
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    pub open_position: Option<OpenPosition>,
}

impl Simulation {
    /// Realized PnL summed over closed trades.
    pub fn realized_pnl(&self) -> f64 {
        self.trades.iter().map(|t| t.pnl).sum()
    }

    pub fn final_equity(&self) -> Option<f64> {
        self.equity_curve.last().map(|p| p.equity)
    }
}

/// Bar-by-bar accounting: realized PnL from closed trades plus the
/// mark-to-market of the open position.
#[derive(Debug, Clone)]
pub struct TradeSimulator {
    initial_equity: f64,
    realized: f64,
    state: PositionState,
    trades: Vec<Trade>,
    equity_curve: Vec<EquityPoint>,
}

impl TradeSimulator {
    pub fn new(initial_equity: f64) -> Self {
        Self {
            initial_equity,
            realized: 0.0,
            state: PositionState::Flat,
            trades: Vec::new(),
            equity_curve: Vec::new(),
        }
    }

    pub fn state(&self) -> PositionState {
        self.state
    }

    /// Apply the bar's signal at its close, then record equity for the bar.
    pub fn on_bar(&mut self, bar: &PriceBar, signal: Signal) {
        match (self.state, signal) {
            (PositionState::Flat, Signal::LongEntry) => {
                self.state = PositionState::Long(OpenPosition {
                    entry_date: bar.date,
                    entry_price: bar.close,
                });
            }
            (PositionState::Long(open), Signal::LongExit) => {
                let trade = Trade::close(&open, bar.date, bar.close);
                self.realized += trade.pnl;
                self.trades.push(trade);
                self.state = PositionState::Flat;
            }
            _ => {}
        }

        let unrealized = match self.state {
            PositionState::Long(open) => open.unrealized(bar.close),
            PositionState::Flat => 0.0,
        };
        self.equity_curve.push(EquityPoint::new(
            bar.date,
            self.initial_equity + self.realized + unrealized,
        ));
    }

    pub fn finish(self) -> Simulation {
        let open_position = match self.state {
            PositionState::Long(open) => Some(open),
            PositionState::Flat => None,
        };
        Simulation {
            trades: self.trades,
            equity_curve: self.equity_curve,
            open_position,
        }
    }
}

/// Run the state machine over `bars`, pairing each bar with the signal that
/// carries the same date. Bars without a signal (the SMA warmup) are `None`.
///
/// Both slices must be ascending by date.
pub fn simulate(bars: &[PriceBar], signals: &[SignalPoint], initial_equity: f64) -> Simulation {
    let mut sim = TradeSimulator::new(initial_equity);
    let mut cursor = signals.iter().peekable();

    for bar in bars {
        while cursor.next_if(|s| s.date < bar.date).is_some() {}
        let signal = cursor
            .next_if(|s| s.date == bar.date)
            .map(|s| s.signal)
            .unwrap_or(Signal::None);
        sim.on_bar(bar, signal);
    }

    sim.finish()
}

/// One point per bar, all at `initial_equity`. Used when the series is too
/// short to produce any signal.
pub fn flat_equity(bars: &[PriceBar], initial_equity: f64) -> Vec<EquityPoint> {
    bars.iter()
        .map(|b| EquityPoint::new(b.date, initial_equity))
        .collect()
}
