//! Cleaned-table persistence.
//!
//! Layout: `{output_dir}/cleaned_{source_file}` plus a
//! `cleaned_{source_file}.meta.json` sidecar (row count, date range, content hash).
//!
//! Both files are written atomically (write to `.tmp`, rename into place), the
//! table first and the sidecar second.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ingest::DataError;
use crate::domain::{format_timestamp, CleanedRecord, CleanedTable};

/// Metadata sidecar for a cleaned table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMeta {
    pub ticker: String,
    pub source_file: String,
    pub rows: usize,
    pub first_timestamp: Option<NaiveDateTime>,
    pub last_timestamp: Option<NaiveDateTime>,
    pub data_hash: String,
    pub written_at: NaiveDateTime,
}

/// File name of the cleaned table derived from a raw file name.
pub fn cleaned_file_name(source_file: &str) -> String {
    format!("cleaned_{source_file}")
}

/// Write bytes to `path` through a sibling `.tmp` file and a rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp_path = PathBuf::from(tmp);

    fs::write(&tmp_path, bytes)?;
    fs::rename(&tmp_path, path).inspect_err(|_| {
        let _ = fs::remove_file(&tmp_path);
    })
}

/// Writes cleaned tables into an output directory.
#[derive(Debug, Clone)]
pub struct CleanedTableWriter {
    output_dir: PathBuf,
}

impl CleanedTableWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn table_path(&self, source_file: &str) -> PathBuf {
        self.output_dir.join(cleaned_file_name(source_file))
    }

    pub fn meta_path(&self, source_file: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}.meta.json", cleaned_file_name(source_file)))
    }

    /// Persist a cleaned table and its sidecar. Returns the sidecar.
    pub fn write(&self, table: &CleanedTable, source_file: &str) -> Result<TableMeta, DataError> {
        let path = self.table_path(source_file);
        let write_err = |message: String| DataError::Write {
            path: path.clone(),
            message,
        };

        let mut df = table_to_dataframe(&table.records)
            .map_err(|e| write_err(format!("dataframe creation: {e}")))?;
        let mut buf = Vec::new();
        CsvWriter::new(&mut buf)
            .include_header(true)
            .finish(&mut df)
            .map_err(|e| write_err(format!("csv encode: {e}")))?;

        write_atomic(&path, &buf).map_err(|e| write_err(format!("atomic write: {e}")))?;

        let meta = TableMeta {
            ticker: table.ticker.clone(),
            source_file: source_file.to_string(),
            rows: table.len(),
            first_timestamp: table.first_timestamp(),
            last_timestamp: table.last_timestamp(),
            data_hash: blake3::hash(&buf).to_hex().to_string(),
            written_at: chrono::Local::now().naive_local(),
        };
        let meta_json = serde_json::to_vec_pretty(&meta)
            .map_err(|e| write_err(format!("meta serialization: {e}")))?;
        write_atomic(&self.meta_path(source_file), &meta_json)
            .map_err(|e| write_err(format!("meta write: {e}")))?;

        debug!(path = %path.display(), rows = meta.rows, "cleaned table written");
        Ok(meta)
    }

    /// Read the sidecar for a source file, if one was written.
    pub fn read_meta(&self, source_file: &str) -> Option<TableMeta> {
        let content = fs::read_to_string(self.meta_path(source_file)).ok()?;
        serde_json::from_str(&content).ok()
    }
}

// ── Frame conversion ────────────────────────────────────────────────

fn table_to_dataframe(records: &[CleanedRecord]) -> PolarsResult<DataFrame> {
    let col = |name: &str, f: fn(&CleanedRecord) -> f64| {
        Column::new(name.into(), records.iter().map(f).collect::<Vec<f64>>())
    };
    let timestamps: Vec<String> = records
        .iter()
        .map(|r| format_timestamp(&r.timestamp))
        .collect();

    DataFrame::new(vec![
        Column::new("timestamp".into(), timestamps),
        col("open", |r| r.open),
        col("high", |r| r.high),
        col("low", |r| r.low),
        col("close", |r| r.close),
        col("volume", |r| r.volume),
        col("daily_pct_change", |r| r.daily_pct_change),
        col("cumulative_return", |r| r.cumulative_return),
        col("20_day_moving_avg", |r| r.moving_avg_20),
        col("rolling_volatility", |r| r.rolling_volatility),
        col("mean_price", |r| r.mean_price),
        col("median_price", |r| r.median_price),
        col("std_price", |r| r.std_price),
        col("var_price", |r| r.var_price),
        col("normalized_close", |r| r.normalized_close),
        col("scaled_volume", |r| r.scaled_volume),
    ])
}
