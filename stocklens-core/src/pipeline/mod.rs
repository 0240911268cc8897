//! The cleaning and feature pipeline.
//!
//! Steps, in order:
//! 1. load the raw table, count missing cells and duplicate rows
//! 2. forward-fill then back-fill every column
//! 3. drop exact duplicate rows (first occurrence wins)
//! 4. count missing cells and duplicates again
//! 5. parse timestamps and sort ascending (stable)
//! 6. daily % change, cumulative return, 20-row moving average and volatility
//! 7. row-wise mean, median, std and variance of open/high/low/close
//! 8. z-score `close`, min-max `volume`
//! 9. drop rows with any undefined value
//! 10. persist the cleaned table
//!
//! [`process`] runs steps 2–9 on an in-memory table; [`Pipeline::process_file`]
//! wraps it with loading and persistence.

mod frame;
pub mod repair;

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::data::{read_raw_csv, CleanedTableWriter, DataError, TableMeta};
use crate::domain::{parse_timestamp, CleanedTable, RawRecord, RawTable};
use crate::metrics::{MetricsEntry, ProcessingMetrics};
use frame::FeatureFrame;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error("timestamp column has no values")]
    MissingTimestamps,

    #[error("unparseable timestamp '{value}' at row {row}")]
    BadTimestamp { row: usize, value: String },

    #[error("input path has no file name: {}", .0.display())]
    BadInputPath(PathBuf),
}

/// The cleaned table plus the metrics gathered while producing it.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub table: CleanedTable,
    pub metrics: ProcessingMetrics,
    /// Sidecar of the persisted table, when it was written to disk.
    pub meta: Option<TableMeta>,
}

impl PipelineOutput {
    pub fn entry(&self) -> MetricsEntry {
        MetricsEntry::Success(self.metrics.clone())
    }
}

/// Clean and enrich one ticker's raw table (steps 2–9).
///
/// `total_processing_time` covers this call only; [`Pipeline::process_file`]
/// widens it to include loading and persistence.
pub fn process(raw: RawTable, ticker: &str) -> Result<PipelineOutput, PipelineError> {
    let started = Instant::now();
    let initial_shape = raw.source_shape;
    let mut records = raw.records;

    let missing_before = repair::count_missing(&records);
    let duplicates_before = repair::count_duplicates(&records);

    let cleaning_started = Instant::now();
    repair::forward_fill(&mut records);
    repair::back_fill(&mut records);
    repair::drop_duplicates(&mut records);

    let missing_after = repair::count_missing(&records);
    let duplicates_after = repair::count_duplicates(&records);
    debug!(
        ticker,
        missing_before, missing_after, duplicates_before, rows = records.len(), "repair done"
    );

    let mut frame = FeatureFrame::from_sorted(sort_by_timestamp(records)?);
    frame.derive_series_features();
    frame.derive_row_stats();
    let cleaning_time = cleaning_started.elapsed().as_secs_f64();

    let transform_started = Instant::now();
    let (close_scaler, volume_scaler) = frame.scale();
    let transformation_time = transform_started.elapsed().as_secs_f64();
    debug!(ticker, ?close_scaler, ?volume_scaler, "scalers fitted");

    let sorted_rows = frame.len();
    let table = frame.into_table(ticker);
    if table.is_empty() {
        warn!(
            ticker,
            rows = sorted_rows,
            "no complete rows after cleaning (the 20-row window needs at least 20 observations)"
        );
    }

    let metrics = ProcessingMetrics {
        initial_shape,
        final_shape: table.shape(),
        missing_before,
        missing_after,
        duplicates_before,
        duplicates_after,
        cleaning_time,
        transformation_time,
        total_processing_time: started.elapsed().as_secs_f64(),
    };

    Ok(PipelineOutput {
        table,
        metrics,
        meta: None,
    })
}

/// Parse every timestamp and order rows by it, keeping input order for ties.
fn sort_by_timestamp(
    records: Vec<RawRecord>,
) -> Result<Vec<(NaiveDateTime, RawRecord)>, PipelineError> {
    if !records.is_empty() && records.iter().all(|r| r.timestamp.is_none()) {
        return Err(PipelineError::MissingTimestamps);
    }

    let mut rows = records
        .into_iter()
        .enumerate()
        .map(|(row, rec)| {
            let raw = rec.timestamp.as_deref().unwrap_or_default();
            match parse_timestamp(raw) {
                Some(ts) => Ok((ts, rec)),
                None => Err(PipelineError::BadTimestamp {
                    row,
                    value: raw.to_string(),
                }),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    rows.sort_by_key(|(ts, _)| *ts);
    Ok(rows)
}

/// File-level pipeline: load, process, persist.
#[derive(Debug, Clone)]
pub struct Pipeline {
    writer: CleanedTableWriter,
}

impl Pipeline {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            writer: CleanedTableWriter::new(output_dir),
        }
    }

    pub fn writer(&self) -> &CleanedTableWriter {
        &self.writer
    }

    /// Run every step for one raw file. Nothing is written unless every step succeeds.
    pub fn process_file(
        &self,
        input: &Path,
        ticker: &str,
    ) -> Result<PipelineOutput, PipelineError> {
        let started = Instant::now();
        let source_file = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| PipelineError::BadInputPath(input.to_path_buf()))?;

        let raw = read_raw_csv(input)?;
        let mut output = process(raw, ticker)?;

        let meta = self.writer.write(&output.table, &source_file)?;
        output.meta = Some(meta);
        output.metrics.total_processing_time = started.elapsed().as_secs_f64();

        info!(
            ticker,
            source = %source_file,
            rows = output.metrics.final_shape.rows(),
            secs = output.metrics.total_processing_time,
            "ticker processed"
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Shape;
    use crate::features::assert_approx;

    fn raw(ts: &str, close: f64, volume: f64) -> RawRecord {
        RawRecord {
            timestamp: Some(ts.to_string()),
            open: Some(close - 0.5),
            high: Some(close + 1.0),
            low: Some(close - 1.0),
            close: Some(close),
            volume: Some(volume),
        }
    }

    fn daily(n: usize) -> Vec<RawRecord> {
        let base = parse_timestamp("2024-01-01").unwrap();
        (0..n)
            .map(|i| {
                let day = (base + chrono::Duration::days(i as i64)).format("%Y-%m-%d").to_string();
                let close = 100.0 + (i as f64 * 0.7).sin() * 5.0 + i as f64 * 0.1;
                raw(&day, close, 1_000.0 + (i % 7) as f64 * 150.0)
            })
            .collect()
    }

    #[test]
    fn shuffled_input_is_sorted() {
        let mut rows = daily(40);
        rows.reverse();
        let out = process(RawTable::new(rows), "JNJ").unwrap();
        let ts: Vec<_> = out.table.records.iter().map(|r| r.timestamp).collect();
        assert!(ts.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(out.metrics.final_shape, Shape(21, 16));
    }

    #[test]
    fn counts_before_and_after_repair() {
        let mut rows = daily(30);
        rows[3].close = None;
        rows[4].volume = None;
        rows.push(rows[10].clone());
        rows.push(rows[11].clone());
        let out = process(RawTable::new(rows), "JNJ").unwrap();
        let m = &out.metrics;
        assert_eq!(m.initial_shape, Shape(32, 6));
        assert_eq!(m.missing_before, 2);
        assert_eq!(m.missing_after, 0);
        assert_eq!(m.duplicates_before, 2);
        assert_eq!(m.duplicates_after, 0);
    }

    #[test]
    fn derived_columns_follow_their_recurrences() {
        let out = process(RawTable::new(daily(45)), "TSLA").unwrap();
        let recs = &out.table.records;
        for pair in recs.windows(2) {
            let (prev, cur) = (&pair[0], &pair[1]);
            assert_approx(cur.daily_pct_change, cur.close / prev.close - 1.0, 1e-12);
            assert_approx(
                cur.cumulative_return,
                prev.cumulative_return * (1.0 + cur.daily_pct_change),
                1e-9,
            );
        }
    }

    #[test]
    fn unparseable_timestamp_fails() {
        let mut rows = daily(25);
        rows[7].timestamp = Some("not-a-date".into());
        let err = process(RawTable::new(rows), "TTM").unwrap_err();
        assert!(matches!(err, PipelineError::BadTimestamp { row: 7, .. }));
    }

    #[test]
    fn entirely_missing_timestamps_fail() {
        let mut rows = daily(25);
        for r in &mut rows {
            r.timestamp = None;
        }
        let err = process(RawTable::new(rows), "TTM").unwrap_err();
        assert!(matches!(err, PipelineError::MissingTimestamps));
    }

    #[test]
    fn empty_input_is_empty_success() {
        let out = process(RawTable::new(vec![]), "WMT").unwrap();
        assert!(out.table.is_empty());
        assert_eq!(out.metrics.final_shape, Shape(0, 16));
        assert!(out.entry().is_success());
    }
}
