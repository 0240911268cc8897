//! Route handlers. Files are small, so they are read synchronously per request.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use stocklens_core::metrics::ReportError;
use stocklens_core::MetricsReport;
use stocklens_runner::StoreError;
use tracing::{error, info};

use crate::ApiState;

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

/// GET /
pub async fn index() -> &'static str {
    "Welcome to the StockLens API. Try /api/data/<ticker> or /api/metrics."
}

/// GET /api/data/:ticker
pub async fn get_data(State(state): State<Arc<ApiState>>, Path(ticker): Path<String>) -> Response {
    match state.store.read_rows(&ticker) {
        Ok(rows) => {
            info!(%ticker, rows = rows.len(), "served cleaned data");
            Json(rows).into_response()
        }
        Err(StoreError::NotFound { .. }) => error_response(StatusCode::NOT_FOUND, "Data not found"),
        Err(e) => {
            error!(%ticker, error = %e, "failed to read cleaned data");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// GET /api/metrics
pub async fn get_metrics(State(state): State<Arc<ApiState>>) -> Response {
    match MetricsReport::load(&state.report_path) {
        Ok(report) => Json(report).into_response(),
        Err(ReportError::NotFound(_)) => {
            error_response(StatusCode::NOT_FOUND, "Metrics report not found")
        }
        Err(e) => {
            error!(error = %e, "failed to read metrics report");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
