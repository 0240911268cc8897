//! Read side of the cleaned tables: resolve a ticker to its file and load it.

use std::path::{Path, PathBuf};

use serde_json::{Map, Number, Value};
use stocklens_core::data::{cleaned_file_name, TableMeta};
use stocklens_core::{CleanedRecord, CleanedTable};
use thiserror::Error;

use crate::config::{default_file_name, PipelineConfig, TickerSpec};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no cleaned data for '{ticker}' at {}", .path.display())]
    NotFound { ticker: String, path: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Cleaned tables under one output directory.
#[derive(Debug, Clone)]
pub struct CleanedStore {
    output_dir: PathBuf,
    tickers: Vec<TickerSpec>,
}

impl CleanedStore {
    pub fn new(output_dir: impl Into<PathBuf>, tickers: Vec<TickerSpec>) -> Self {
        Self {
            output_dir: output_dir.into(),
            tickers,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(&config.paths.output_dir, config.tickers.clone())
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn tickers(&self) -> &[TickerSpec] {
        &self.tickers
    }

    /// Configured spelling of a ticker, else its upper-case form.
    pub fn symbol(&self, ticker: &str) -> String {
        self.tickers
            .iter()
            .find(|t| t.symbol.eq_ignore_ascii_case(ticker))
            .map(|t| t.symbol.clone())
            .unwrap_or_else(|| ticker.to_ascii_uppercase())
    }

    /// Raw file name for a ticker: the configured one, else `<TICKER>_TATA_data.csv`.
    pub fn source_file(&self, ticker: &str) -> String {
        self.tickers
            .iter()
            .find(|t| t.symbol.eq_ignore_ascii_case(ticker))
            .map(|t| t.file.clone())
            .unwrap_or_else(|| default_file_name(ticker))
    }

    pub fn table_path(&self, ticker: &str) -> PathBuf {
        self.output_dir
            .join(cleaned_file_name(&self.source_file(ticker)))
    }

    pub fn exists(&self, ticker: &str) -> bool {
        self.table_path(ticker).is_file()
    }

    /// Sidecar written next to the table, if any.
    pub fn meta(&self, ticker: &str) -> Option<TableMeta> {
        let path = self
            .output_dir
            .join(format!("{}.meta.json", cleaned_file_name(&self.source_file(ticker))));
        let content = std::fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    fn reader(&self, ticker: &str) -> Result<(PathBuf, csv::Reader<std::fs::File>), StoreError> {
        let path = self.table_path(ticker);
        if !path.is_file() {
            return Err(StoreError::NotFound {
                ticker: ticker.to_string(),
                path,
            });
        }
        let reader = csv::Reader::from_path(&path).map_err(|source| StoreError::Csv {
            path: path.clone(),
            source,
        })?;
        Ok((path, reader))
    }

    /// Load a cleaned table as typed records.
    pub fn read_table(&self, ticker: &str) -> Result<CleanedTable, StoreError> {
        let (path, mut reader) = self.reader(ticker)?;
        let records = reader
            .deserialize::<CleanedRecord>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| StoreError::Csv { path, source })?;
        Ok(CleanedTable::new(ticker.to_ascii_uppercase(), records))
    }

    /// Load a cleaned table as generic JSON objects (column → value).
    ///
    /// Numeric cells become JSON numbers, everything else stays a string.
    pub fn read_rows(&self, ticker: &str) -> Result<Vec<Map<String, Value>>, StoreError> {
        let (path, mut reader) = self.reader(ticker)?;
        let csv_err = |source| StoreError::Csv {
            path: path.clone(),
            source,
        };
        let headers = reader.headers().map_err(csv_err)?.clone();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(csv_err)?;
            let row = headers
                .iter()
                .zip(record.iter())
                .map(|(name, cell)| (name.to_string(), cell_value(cell)))
                .collect();
            rows.push(row);
        }
        Ok(rows)
    }

    /// Load every configured ticker's table, each with its own load result.
    pub fn read_all(&self) -> Vec<(String, Result<CleanedTable, StoreError>)> {
        self.tickers
            .iter()
            .map(|t| (t.symbol.clone(), self.read_table(&t.symbol)))
            .collect()
    }
}

fn cell_value(cell: &str) -> Value {
    cell.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(cell.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_file(contents: &str) -> (tempfile::TempDir, CleanedStore) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cleaned_JNJ_TATA_data.csv"), contents).unwrap();
        let store = CleanedStore::new(dir.path(), vec![TickerSpec::with_default_file("JNJ")]);
        (dir, store)
    }

    const TABLE: &str = "timestamp,open,high,low,close,volume,daily_pct_change,\
cumulative_return,20_day_moving_avg,rolling_volatility,mean_price,median_price,std_price,\
var_price,normalized_close,scaled_volume\n\
2024-02-01,10.0,11.0,9.0,10.5,1000.0,0.01,1.2,10.1,0.3,10.125,10.25,0.85,0.72,0.4,0.5\n";

    #[test]
    fn resolves_case_insensitively() {
        let (_dir, store) = store_with_file(TABLE);
        assert!(store.exists("jnj"));
        assert_eq!(store.source_file("jnj"), "JNJ_TATA_data.csv");
        assert_eq!(store.source_file("aapl"), "AAPL_TATA_data.csv");
        assert_eq!(store.symbol("jnj"), "JNJ");
        assert_eq!(store.symbol("aapl"), "AAPL");
    }

    #[test]
    fn reads_typed_records() {
        let (_dir, store) = store_with_file(TABLE);
        let table = store.read_table("JNJ").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.records[0].moving_avg_20, 10.1);
        assert_eq!(table.ticker, "JNJ");
    }

    #[test]
    fn reads_generic_rows() {
        let (_dir, store) = store_with_file(TABLE);
        let rows = store.read_rows("jnj").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["timestamp"], "2024-02-01");
        assert_eq!(rows[0]["20_day_moving_avg"], 10.1);
        assert_eq!(rows[0].len(), 16);
    }

    #[test]
    fn missing_table_is_not_found() {
        let (_dir, store) = store_with_file(TABLE);
        assert!(matches!(store.read_rows("TSLA"), Err(StoreError::NotFound { .. })));
        assert!(matches!(store.read_table("TSLA"), Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn malformed_table_is_csv_error() {
        let (_dir, store) = store_with_file("timestamp,open\nnot-a-date,abc\n");
        assert!(matches!(store.read_table("JNJ"), Err(StoreError::Csv { .. })));
    }
}
