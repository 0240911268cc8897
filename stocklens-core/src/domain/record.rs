//! Raw and cleaned price records.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::timestamp::serde_timestamp;
use crate::data::schema::{CLEANED_COLUMNS, RAW_COLUMNS};

/// Table shape as `(rows, columns)`. Serializes as a two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Shape(pub usize, pub usize);

impl Shape {
    pub fn rows(&self) -> usize {
        self.0
    }

    pub fn cols(&self) -> usize {
        self.1
    }
}

/// One raw daily row as read from the source file. Every cell may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub timestamp: Option<String>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

/// Hashable identity of a raw row, used for exact-duplicate detection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct RowKey(Option<String>, [Option<u64>; 5]);

impl RawRecord {
    /// Number of missing cells in this row.
    pub fn missing_cells(&self) -> usize {
        usize::from(self.timestamp.is_none())
            + self.prices().iter().filter(|v| v.is_none()).count()
    }

    /// The five numeric cells in column order: open, high, low, close, volume.
    pub fn prices(&self) -> [Option<f64>; 5] {
        [self.open, self.high, self.low, self.close, self.volume]
    }

    pub(crate) fn key(&self) -> RowKey {
        // -0.0 and 0.0 compare equal as values, so they must share a key.
        let bits = |v: Option<f64>| v.map(|x| if x == 0.0 { 0u64 } else { x.to_bits() });
        RowKey(
            self.timestamp.clone(),
            [
                bits(self.open),
                bits(self.high),
                bits(self.low),
                bits(self.close),
                bits(self.volume),
            ],
        )
    }
}

/// A raw per-ticker price table.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub records: Vec<RawRecord>,
    /// Shape of the source file, including any non-canonical columns.
    pub source_shape: Shape,
}

impl RawTable {
    /// Build a table from in-memory records with the canonical column count.
    pub fn new(records: Vec<RawRecord>) -> Self {
        let source_shape = Shape(records.len(), RAW_COLUMNS.len());
        Self {
            records,
            source_shape,
        }
    }

    pub fn with_source_shape(records: Vec<RawRecord>, source_shape: Shape) -> Self {
        Self {
            records,
            source_shape,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// One analysis-ready row: the raw prices plus every derived column, all defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedRecord {
    #[serde(with = "serde_timestamp")]
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub daily_pct_change: f64,
    pub cumulative_return: f64,
    #[serde(rename = "20_day_moving_avg")]
    pub moving_avg_20: f64,
    pub rolling_volatility: f64,
    pub mean_price: f64,
    pub median_price: f64,
    pub std_price: f64,
    pub var_price: f64,
    pub normalized_close: f64,
    pub scaled_volume: f64,
}

impl CleanedRecord {
    /// Look up a numeric column by its persisted name.
    pub fn value(&self, column: &str) -> Option<f64> {
        let v = match column {
            "open" => self.open,
            "high" => self.high,
            "low" => self.low,
            "close" => self.close,
            "volume" => self.volume,
            "daily_pct_change" => self.daily_pct_change,
            "cumulative_return" => self.cumulative_return,
            "20_day_moving_avg" => self.moving_avg_20,
            "rolling_volatility" => self.rolling_volatility,
            "mean_price" => self.mean_price,
            "median_price" => self.median_price,
            "std_price" => self.std_price,
            "var_price" => self.var_price,
            "normalized_close" => self.normalized_close,
            "scaled_volume" => self.scaled_volume,
            _ => return None,
        };
        Some(v)
    }
}

/// The cleaned table for one ticker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanedTable {
    pub ticker: String,
    pub records: Vec<CleanedRecord>,
}

impl CleanedTable {
    pub fn new(ticker: impl Into<String>, records: Vec<CleanedRecord>) -> Self {
        Self {
            ticker: ticker.into(),
            records,
        }
    }

    pub fn shape(&self) -> Shape {
        Shape(self.records.len(), CLEANED_COLUMNS.len())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<NaiveDateTime> {
        self.records.first().map(|r| r.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.records.last().map(|r| r.timestamp)
    }

    /// Extract one numeric column. `None` for unknown names (including `timestamp`).
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        self.records.iter().map(|r| r.value(name)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(ts: &str, close: Option<f64>) -> RawRecord {
        RawRecord {
            timestamp: Some(ts.to_string()),
            open: Some(1.0),
            high: Some(2.0),
            low: Some(0.5),
            close,
            volume: Some(100.0),
        }
    }

    #[test]
    fn missing_cells_counts_every_column() {
        assert_eq!(raw("2024-01-02", Some(1.0)).missing_cells(), 0);
        assert_eq!(raw("2024-01-02", None).missing_cells(), 1);
        assert_eq!(RawRecord::default().missing_cells(), 6);
    }

    #[test]
    fn signed_zero_rows_share_a_key() {
        let a = raw("2024-01-02", Some(0.0));
        let b = raw("2024-01-02", Some(-0.0));
        assert_eq!(a.key(), b.key());
        assert_ne!(a.key(), raw("2024-01-03", Some(0.0)).key());
    }

    #[test]
    fn raw_table_defaults_to_canonical_shape() {
        let table = RawTable::new(vec![raw("2024-01-02", Some(1.0))]);
        assert_eq!(table.source_shape, Shape(1, 6));
    }

    #[test]
    fn cleaned_record_uses_persisted_column_names() {
        let rec = CleanedRecord {
            timestamp: crate::domain::parse_timestamp("2024-01-02").unwrap(),
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close: 1.5,
            volume: 10.0,
            daily_pct_change: 0.01,
            cumulative_return: 1.01,
            moving_avg_20: 1.4,
            rolling_volatility: 0.1,
            mean_price: 1.25,
            median_price: 1.25,
            std_price: 0.6,
            var_price: 0.36,
            normalized_close: 0.0,
            scaled_volume: 0.5,
        };
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["timestamp"], "2024-01-02");
        assert_eq!(json["20_day_moving_avg"], 1.4);
        assert_eq!(rec.value("20_day_moving_avg"), Some(1.4));
        assert_eq!(rec.value("timestamp"), None);

        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), CLEANED_COLUMNS.len());
        for name in CLEANED_COLUMNS {
            assert!(obj.contains_key(*name), "missing column {name}");
        }
    }
}
