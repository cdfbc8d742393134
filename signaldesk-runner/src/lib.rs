//! SignalDesk Runner: orchestration around the engine.
//!
//! This crate builds on `signaldesk-core` to provide:
//! - TOML configuration with defaults and validation
//! - Bar sources (CSV directory, HTTP endpoint, synthetic random walk)
//! - The daily PnL ledger reader
//! - Single and batch backtest runs with content-addressed run ids
//! - Artifact export (manifest, trades, equity)
//! - Shared tracing setup

pub mod artifacts;
pub mod config;
pub mod data_loader;
pub mod ledger;
pub mod logging;
pub mod runner;

pub use artifacts::{save_artifacts, ArtifactPaths};
pub use config::{AppConfig, ConfigError, DataSourceKind, EngineConfig, LogFormat};
pub use data_loader::{build_source, BarSource, LoadError, Timeframe};
pub use ledger::{LedgerError, PnlLedger, PnlRow};
pub use logging::init_logging;
pub use runner::{
    run_backtest_report, run_batch, run_sma_backtest, BacktestReport, BacktestRequest,
    BatchOutcome, RunError, SmaBacktestResult,
};
