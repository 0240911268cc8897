//! StockLens API: a minimal read-only HTTP endpoint.
//!
//! Routes:
//! - `GET /` welcome text
//! - `GET /api/data/:ticker` cleaned rows as a JSON array
//! - `GET /api/metrics` the last metrics report

pub mod handlers;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use stocklens_runner::{CleanedStore, PipelineConfig};
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Shared, read-only handler state.
#[derive(Debug)]
pub struct ApiState {
    pub store: CleanedStore,
    pub report_path: PathBuf,
}

impl ApiState {
    pub fn new(store: CleanedStore, report_path: impl Into<PathBuf>) -> Self {
        Self {
            store,
            report_path: report_path.into(),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(CleanedStore::from_config(config), &config.paths.report_path)
    }
}

pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/data/:ticker", get(handlers::get_data))
        .route("/api/metrics", get(handlers::get_metrics))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: SocketAddr, state: Arc<ApiState>) -> Result<(), ServeError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServeError::Bind { addr, source })?;
    info!(%addr, output_dir = %state.store.output_dir().display(), "serving cleaned data");
    axum::serve(listener, router(state))
        .await
        .map_err(ServeError::Serve)
}
