//! SignalDesk HTTP service.
//!
//! Exposes the backtest and performance endpoints used by the dashboard:
//!
//! | method | path                  |
//! |--------|-----------------------|
//! | POST   | `/backtest/sma`       |
//! | GET    | `/metrics/performance`|
//! | GET    | `/metrics/pnl/daily`  |
//! | GET    | `/health`             |
//!
//! Every route is also mounted under `/api`.

pub mod error;
pub mod routes;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use signaldesk_runner::{build_source, AppConfig, BarSource, EngineConfig};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ErrorBody};

/// Shared, read-only handler state.
pub struct AppState {
    pub source: Arc<dyn BarSource>,
    pub engine: EngineConfig,
    pub pnl_ledger: PathBuf,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let source = build_source(&config.data).context("failed to build bar source")?;
        Ok(Self {
            source,
            engine: config.engine.clone(),
            pnl_ledger: config.data.pnl_ledger.clone(),
        })
    }
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/backtest/sma", post(routes::post_backtest_sma))
        .route("/metrics/performance", get(routes::get_performance))
        .route("/metrics/pnl/daily", get(routes::get_pnl_daily))
        .route("/health", get(routes::health))
}

/// Build the router with all routes and middleware.
pub fn build_router(state: Arc<AppState>, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(api_routes())
        .nest("/api", api_routes())
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Bind and serve until Ctrl-C.
pub async fn serve(config: &AppConfig) -> anyhow::Result<()> {
    // The HTTP source owns a blocking client, which must not be built on a runtime thread.
    let owned = config.clone();
    let state = tokio::task::spawn_blocking(move || AppState::from_config(&owned))
        .await
        .context("state construction task failed")??;
    let state = Arc::new(state);
    let router = build_router(
        state,
        Duration::from_secs(config.server.request_timeout_secs),
    );

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;
    tracing::info!(
        address = %config.server.bind,
        source = ?config.data.source,
        "starting SignalDesk server"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
