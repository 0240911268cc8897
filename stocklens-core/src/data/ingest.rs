//! Raw price file ingestion.
//!
//! Reads a per-ticker CSV with polars, checks the canonical columns, and turns
//! the frame into [`RawRecord`]s where every cell is optional. Non-canonical
//! columns still count towards the source shape but are otherwise discarded.

use std::path::{Path, PathBuf};

use polars::prelude::*;
use thiserror::Error;
use tracing::{debug, warn};

use super::schema::{RawSchema, SchemaError};
use crate::domain::{RawRecord, RawTable, Shape};

/// Cell spellings read as missing, on top of blank cells.
pub const NULL_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Debug, Error)]
pub enum DataError {
    #[error("input file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {message}", .path.display())]
    Read { path: PathBuf, message: String },

    #[error("malformed data: {0}")]
    Malformed(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("write failed for {}: {message}", .path.display())]
    Write { path: PathBuf, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read a raw price CSV from disk.
pub fn read_raw_csv(path: &Path) -> Result<RawTable, DataError> {
    if !path.is_file() {
        return Err(DataError::NotFound(path.to_path_buf()));
    }

    let read_err = |e: PolarsError| DataError::Read {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let null_values = NullValues::AllColumns(NULL_TOKENS.iter().map(|t| (*t).into()).collect());
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .with_parse_options(CsvParseOptions::default().with_null_values(Some(null_values)))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(read_err)?
        .finish()
        .map_err(read_err)?;

    debug!(path = %path.display(), rows = df.height(), cols = df.width(), "raw file loaded");
    raw_table_from_frame(&df)
}

/// Convert a loaded frame into a raw table.
pub fn raw_table_from_frame(df: &DataFrame) -> Result<RawTable, DataError> {
    RawSchema::validate(df)?;

    let extra = RawSchema::extra_columns(df);
    if !extra.is_empty() {
        warn!(columns = ?extra, "discarding non-canonical columns");
    }

    let timestamps = text_column(df, "timestamp")?;
    let open = numeric_column(df, "open")?;
    let high = numeric_column(df, "high")?;
    let low = numeric_column(df, "low")?;
    let close = numeric_column(df, "close")?;
    let volume = numeric_column(df, "volume")?;

    let records = timestamps
        .into_iter()
        .enumerate()
        .map(|(i, timestamp)| RawRecord {
            timestamp,
            open: open[i],
            high: high[i],
            low: low[i],
            close: close[i],
            volume: volume[i],
        })
        .collect();

    Ok(RawTable::with_source_shape(
        records,
        Shape(df.height(), df.width()),
    ))
}

// ── Column helpers ───────────────────────────────────────────────────

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series, DataError> {
    df.column(name)
        .map(|c| c.as_materialized_series())
        .map_err(|_| SchemaError::MissingColumn(name.to_string()).into())
}

/// Numeric column as `Option<f64>`; NaN counts as missing.
///
/// A cell that is present but does not parse as a number fails the column.
fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, DataError> {
    let series = column(df, name)?.rechunk();
    let cast = series
        .cast(&DataType::Float64)
        .map_err(|e| DataError::Malformed(format!("column '{name}': {e}")))?;
    if cast.null_count() > series.null_count() {
        return Err(SchemaError::TypeMismatch {
            column: name.to_string(),
            expected: DataType::Float64.to_string(),
            actual: series.dtype().to_string(),
        }
        .into());
    }
    let values = cast
        .f64()
        .map_err(|e| DataError::Malformed(format!("column '{name}': {e}")))?;
    Ok(values.iter().map(|v| v.filter(|x| !x.is_nan())).collect())
}

/// Text column; blank cells and null tokens count as missing.
fn text_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, DataError> {
    let series = column(df, name)?;
    let cast = series
        .cast(&DataType::String)
        .map_err(|e| DataError::Malformed(format!("column '{name}': {e}")))?;
    let values = cast
        .str()
        .map_err(|e| DataError::Malformed(format!("column '{name}': {e}")))?;
    Ok(values
        .iter()
        .map(|v| {
            v.map(str::trim)
                .filter(|s| !s.is_empty() && !NULL_TOKENS.contains(s))
                .map(str::to_string)
        })
        .collect())
}
