//! Handler tests against a temp output directory.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use axum::body::to_bytes;
use axum::extract::{Path as UrlPath, State};
use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;

use stocklens_api::handlers::{get_data, get_metrics, index};
use stocklens_api::{router, ApiState};
use stocklens_core::{MetricsReport, Pipeline};
use stocklens_runner::{CleanedStore, TickerSpec};

fn write_raw(dir: &Path, file: &str, n: usize) -> std::path::PathBuf {
    let base = chrono::NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
    let mut text = String::from("timestamp,open,high,low,close,volume\n");
    for i in 0..n {
        let day = base + chrono::Duration::days(i as i64);
        let close = 210.0 + (i as f64 * 0.4).sin() * 5.0;
        text.push_str(&format!(
            "{day},{:.2},{:.2},{:.2},{close:.2},{}\n",
            close - 1.0,
            close + 2.0,
            close - 2.5,
            40_000 + i * 10
        ));
    }
    let path = dir.join(file);
    fs::write(&path, text).unwrap();
    path
}

fn state(root: &Path) -> Arc<ApiState> {
    let store = CleanedStore::new(
        root.join("cleaned_data"),
        vec![TickerSpec::with_default_file("WMT")],
    );
    Arc::new(ApiState::new(store, root.join("metrics.json")))
}

async fn json_body(resp: Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn index_is_plain_text() {
    assert!(index().await.starts_with("Welcome to the StockLens API"));
}

#[tokio::test]
async fn data_for_processed_ticker() {
    let root = tempfile::tempdir().unwrap();
    let input = write_raw(root.path(), "WMT_TATA_data.csv", 30);
    let out = Pipeline::new(root.path().join("cleaned_data"))
        .process_file(&input, "WMT")
        .unwrap();
    let st = state(root.path());

    let resp = get_data(State(st), UrlPath("wmt".to_string())).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json_body(resp).await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), out.table.len());
    assert_eq!(rows.len(), 11);
    assert_eq!(rows[0]["timestamp"], "2023-06-20");
    assert!(rows[0]["close"].is_number());
    assert!(rows[0]["20_day_moving_avg"].is_number());
}

#[tokio::test]
async fn unknown_ticker_is_404() {
    let root = tempfile::tempdir().unwrap();
    let resp = get_data(State(state(root.path())), UrlPath("ZZZ".to_string())).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(resp).await["error"], "Data not found");
}

#[tokio::test]
async fn unreadable_table_is_500() {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("cleaned_data");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("cleaned_WMT_TATA_data.csv"), "a,b\n1,2,3\n").unwrap();

    let resp = get_data(State(state(root.path())), UrlPath("WMT".to_string())).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json_body(resp).await["error"].is_string());
}

#[tokio::test]
async fn metrics_404_until_written() {
    let root = tempfile::tempdir().unwrap();
    let st = state(root.path());

    let resp = get_metrics(State(st.clone())).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let mut report = MetricsReport::new();
    report.record(
        "TSLA_TATA_data.csv",
        stocklens_core::MetricsEntry::failed("Missing required column: close"),
    );
    report.save(&st.report_path).unwrap();

    let resp = get_metrics(State(st)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["TSLA_TATA_data.csv"]["processing_status"], "failed");
}

#[test]
fn router_builds() {
    let root = tempfile::tempdir().unwrap();
    let _ = router(state(root.path()));
}
