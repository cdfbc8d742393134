//! HTTP route handlers.
//!
//! Loading and the engine are synchronous and may block on file or network
//! I/O, so every handler that touches them runs on the blocking pool.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use signaldesk_core::performance::PerformanceSummary;
use signaldesk_runner::{run_sma_backtest, BacktestRequest, PnlLedger, PnlRow, SmaBacktestResult};

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
}

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

/// Run an SMA crossover backtest.
pub async fn post_backtest_sma(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BacktestRequest>, JsonRejection>,
) -> Result<Json<SmaBacktestResult>, ApiError> {
    let Json(request) = payload?;
    tracing::info!(
        symbol = %request.symbol,
        timeframe = %request.timeframe,
        start = %request.start,
        end = %request.end,
        "backtest requested"
    );

    let result = run_blocking(move || {
        run_sma_backtest(state.source.as_ref(), &request, &state.engine).map_err(ApiError::from)
    })
    .await?;
    Ok(Json(result))
}

/// Performance summary over the daily PnL ledger.
pub async fn get_performance(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PerformanceSummary>, ApiError> {
    let summary = run_blocking(move || {
        let ledger = PnlLedger::from_csv_path(&state.pnl_ledger)?;
        Ok(ledger.summary(state.engine.initial_equity))
    })
    .await?;
    Ok(Json(summary))
}

/// Daily PnL rows ordered by date, then id.
pub async fn get_pnl_daily(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PnlRow>>, ApiError> {
    let rows = run_blocking(move || {
        let ledger = PnlLedger::from_csv_path(&state.pnl_ledger)?;
        Ok(ledger.sorted_rows())
    })
    .await?;
    Ok(Json(rows))
}

async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("blocking task failed: {e}")))?
}
