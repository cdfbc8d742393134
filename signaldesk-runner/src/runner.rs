//! Backtest runner: wires a bar source, the engine and the summary together.
//!
//! Entry points:
//! - `run_sma_backtest()`: one request, returns the dashboard response.
//! - `run_backtest_report()`: one request, returns the full report used by the
//!   CLI and artifact export.
//! - `run_batch()`: many requests evaluated in parallel.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use signaldesk_core::domain::{OpenPosition, Trade};
use signaldesk_core::indicators::SmaWindows;
use signaldesk_core::performance::{PerformanceSummary, TradeStats};
use signaldesk_core::{DataStatus, EngineError};

use crate::config::EngineConfig;
use crate::data_loader::{dataset_hash, BarSource, LoadError, Timeframe};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("data error: {0}")]
    Load(#[from] LoadError),
}

impl RunError {
    /// Stable kind used in API error bodies and CLI messages.
    pub fn kind(&self) -> &'static str {
        match self {
            RunError::InvalidRequest(_) => "InvalidRequest",
            RunError::Engine(EngineError::InvalidWindow { .. }) => "InvalidWindow",
            RunError::Engine(EngineError::InsufficientData { .. }) => "InsufficientData",
            RunError::Engine(EngineError::MalformedSeries(_)) => "UpstreamLoadFailure",
            RunError::Load(_) => "UpstreamLoadFailure",
        }
    }

    /// True when the caller sent something unusable.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RunError::InvalidRequest(_) | RunError::Engine(EngineError::InvalidWindow { .. })
        )
    }
}

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

/// A backtest request. Windows default to the engine config when omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestRequest {
    pub symbol: String,
    #[serde(default)]
    pub timeframe: Timeframe,
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default)]
    pub short_window: Option<i64>,
    #[serde(default)]
    pub long_window: Option<i64>,
}

impl BacktestRequest {
    pub fn new(symbol: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe: Timeframe::default(),
            start,
            end,
            short_window: None,
            long_window: None,
        }
    }

    pub fn with_windows(mut self, short: i64, long: i64) -> Self {
        self.short_window = Some(short);
        self.long_window = Some(long);
        self
    }

    /// Check the request and resolve its SMA windows.
    pub fn validate(&self, engine: &EngineConfig) -> Result<SmaWindows, RunError> {
        if self.symbol.trim().is_empty() {
            return Err(RunError::InvalidRequest("symbol must not be empty".into()));
        }
        if self.start > self.end {
            return Err(RunError::InvalidRequest(format!(
                "start {} is after end {}",
                self.start, self.end
            )));
        }
        if !self.timeframe.is_daily() {
            return Err(RunError::InvalidRequest(format!(
                "timeframe {} is not supported, bars are evaluated per trading day (use 1Day)",
                self.timeframe
            )));
        }
        let short = self.short_window.unwrap_or(engine.default_short_window);
        let long = self.long_window.unwrap_or(engine.default_long_window);
        Ok(SmaWindows::new(short, long)?)
    }
}

/// The dashboard's backtest response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmaBacktestResult {
    pub symbol: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub initial_equity: f64,
    pub final_equity: f64,
    pub total_return_pct: f64,
    pub max_drawdown_pct: f64,
    pub trades: Vec<Trade>,
}

/// Full record of one run: the response plus provenance and diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestReport {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: String,
    pub dataset_hash: String,
    pub source: String,
    pub timeframe: Timeframe,
    pub windows: SmaWindows,
    pub bar_count: usize,
    pub data_status: DataStatus,
    pub result: SmaBacktestResult,
    pub summary: PerformanceSummary,
    pub open_position: Option<OpenPosition>,
    pub trade_stats: TradeStats,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Content-addressed run id: identical request, capital and data give the
/// same id.
pub fn compute_run_id(
    request: &BacktestRequest,
    windows: SmaWindows,
    initial_equity: f64,
    dataset_hash: &str,
) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(request.symbol.to_ascii_uppercase().as_bytes());
    hasher.update(request.timeframe.as_str().as_bytes());
    hasher.update(request.start.to_string().as_bytes());
    hasher.update(request.end.to_string().as_bytes());
    hasher.update(&(windows.short() as u64).to_le_bytes());
    hasher.update(&(windows.long() as u64).to_le_bytes());
    hasher.update(&initial_equity.to_le_bytes());
    hasher.update(dataset_hash.as_bytes());
    hasher.finalize().to_hex().to_string()
}

/// Run one request and build the full report.
///
/// A symbol the source does not know is treated as an empty series and
/// reported as insufficient data.
pub fn run_backtest_report(
    source: &dyn BarSource,
    request: &BacktestRequest,
    engine: &EngineConfig,
) -> Result<BacktestReport, RunError> {
    let windows = request.validate(engine)?;

    let bars = match source.load(&request.symbol, request.timeframe, request.start, request.end) {
        Ok(bars) => bars,
        Err(e) if e.is_not_found() => {
            warn!(symbol = %request.symbol, source = source.name(), "no bars found, treating as empty series");
            Vec::new()
        }
        Err(e) => return Err(e.into()),
    };

    let backtest = signaldesk_core::run_sma_backtest(&bars, windows, engine.initial_equity)?;
    if let DataStatus::Insufficient { bars: n, required } = backtest.data_status {
        warn!(
            symbol = %request.symbol,
            bars = n,
            required,
            "insufficient data for long window, returning flat result"
        );
    }

    let dataset_hash = dataset_hash(&request.symbol, &bars);
    let run_id = compute_run_id(request, windows, engine.initial_equity, &dataset_hash);
    let summary = backtest.summary;
    let simulation = backtest.simulation;

    info!(
        symbol = %request.symbol,
        bars = bars.len(),
        trades = simulation.trades.len(),
        final_equity = summary.final_equity,
        run_id = %run_id,
        "backtest complete"
    );

    let result = SmaBacktestResult {
        symbol: request.symbol.clone(),
        start: request.start,
        end: request.end,
        initial_equity: engine.initial_equity,
        final_equity: summary.final_equity,
        total_return_pct: summary.total_return_pct,
        max_drawdown_pct: summary.max_drawdown_pct,
        trades: simulation.trades,
    };
    let trade_stats = TradeStats::from_trades(&result.trades);

    Ok(BacktestReport {
        schema_version: SCHEMA_VERSION,
        run_id,
        dataset_hash,
        source: source.name().to_string(),
        timeframe: request.timeframe,
        windows,
        bar_count: bars.len(),
        data_status: backtest.data_status,
        result,
        summary,
        open_position: simulation.open_position,
        trade_stats,
    })
}

/// Run one request and return the dashboard response.
pub fn run_sma_backtest(
    source: &dyn BarSource,
    request: &BacktestRequest,
    engine: &EngineConfig,
) -> Result<SmaBacktestResult, RunError> {
    run_backtest_report(source, request, engine).map(|report| report.result)
}

/// Outcome for one symbol of a batch.
#[derive(Debug)]
pub struct BatchOutcome {
    pub symbol: String,
    pub result: Result<BacktestReport, RunError>,
}

/// Evaluate many requests in parallel. Output order matches input order and
/// one failing symbol does not affect the others.
pub fn run_batch(
    source: &dyn BarSource,
    requests: &[BacktestRequest],
    engine: &EngineConfig,
) -> Vec<BatchOutcome> {
    requests
        .par_iter()
        .map(|request| BatchOutcome {
            symbol: request.symbol.clone(),
            result: run_backtest_report(source, request, engine),
        })
        .collect()
}
