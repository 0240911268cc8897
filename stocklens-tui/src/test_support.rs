//! Test helpers for building cleaned tables in memory.

use chrono::{Duration, NaiveDate};
use stocklens_core::{CleanedRecord, CleanedTable};

/// A cleaned table with one row per close, on consecutive days from 2024-01-02.
pub fn table(closes: &[f64]) -> CleanedTable {
    let start = NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let base = closes.first().copied().unwrap_or(1.0);
    let records = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let prev = if i == 0 { close } else { closes[i - 1] };
            CleanedRecord {
                timestamp: start + Duration::days(i as i64),
                open: close - 0.5,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1_000.0 + i as f64 * 10.0,
                daily_pct_change: close / prev - 1.0,
                cumulative_return: close / base,
                moving_avg_20: close,
                rolling_volatility: 0.5 + i as f64 * 0.01,
                mean_price: close - 0.125,
                median_price: close - 0.25,
                std_price: 0.85,
                var_price: 0.7225,
                normalized_close: (close - base) / 10.0,
                scaled_volume: i as f64 / closes.len().max(1) as f64,
            }
        })
        .collect();
    CleanedTable::new("TEST", records)
}
