use polars::prelude::*;

/// Canonical raw columns, in file order.
pub const RAW_COLUMNS: &[&str] = &["timestamp", "open", "high", "low", "close", "volume"];

/// The numeric raw columns.
pub const PRICE_COLUMNS: &[&str] = &["open", "high", "low", "close", "volume"];

/// Column order of the persisted cleaned table.
pub const CLEANED_COLUMNS: &[&str] = &[
    "timestamp",
    "open",
    "high",
    "low",
    "close",
    "volume",
    "daily_pct_change",
    "cumulative_return",
    "20_day_moving_avg",
    "rolling_volatility",
    "mean_price",
    "median_price",
    "std_price",
    "var_price",
    "normalized_close",
    "scaled_volume",
];

/// Expected layout of a raw price file.
pub struct RawSchema;

impl RawSchema {
    /// Check that every canonical column is present.
    pub fn validate(df: &DataFrame) -> Result<(), SchemaError> {
        let actual = df.schema();
        for name in RAW_COLUMNS {
            if !actual.contains(name) {
                return Err(SchemaError::MissingColumn(name.to_string()));
            }
        }
        Ok(())
    }

    /// Columns present in the frame that are not canonical.
    pub fn extra_columns(df: &DataFrame) -> Vec<String> {
        df.get_column_names()
            .into_iter()
            .filter(|name| !RAW_COLUMNS.contains(&name.as_str()))
            .map(|name| name.to_string())
            .collect()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Type mismatch in column {column}: expected {expected}, got {actual}")]
    TypeMismatch {
        column: String,
        expected: String,
        actual: String,
    },
}
