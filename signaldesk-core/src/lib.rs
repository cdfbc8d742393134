//! SignalDesk Core: price bars, SMA indicator, crossover signals, trade simulator,
//! performance summarizer.
//!
//! This crate contains the pure computational engine behind the dashboard's
//! backtest and performance endpoints:
//! - Domain types (price bars, trades, equity points, daily PnL rows)
//! - Paired simple moving averages over a bar series
//! - Crossover signal detection with a pinned tie-break policy
//! - A two-state (flat / long) trade simulator with mark-to-market equity
//! - Performance summaries from an equity trace or a daily PnL ledger
//!
//! Nothing here performs I/O or holds state between calls.

pub mod backtest;
pub mod domain;
pub mod error;
pub mod indicators;
pub mod performance;
pub mod signals;
pub mod simulator;

pub use backtest::{run_sma_backtest, DataStatus, SmaBacktest};
pub use error::EngineError;
