//! Per-ticker processing metrics and the run-level report.
//!
//! The report maps each raw file name to either a success record or a failure
//! entry, and is written once per run as a single JSON object:
//!
//! ```json
//! {
//!   "JNJ_TATA_data.csv": { "processing_status": "success", "initial_shape": [250, 6], ... },
//!   "TSLA_TATA_data.csv": { "processing_status": "failed", "error_message": "..." }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::write_atomic;
pub use crate::domain::Shape;

/// Counts and timings for one successfully processed ticker.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProcessingMetrics {
    pub initial_shape: Shape,
    pub final_shape: Shape,
    pub missing_before: usize,
    pub missing_after: usize,
    pub duplicates_before: usize,
    pub duplicates_after: usize,
    /// Seconds spent repairing, sorting and deriving features.
    pub cleaning_time: f64,
    /// Seconds spent fitting and applying the scalers.
    pub transformation_time: f64,
    /// Seconds for the whole ticker, load and persistence included.
    pub total_processing_time: f64,
}

impl ProcessingMetrics {
    /// Rows removed between the raw and the cleaned table.
    pub fn rows_removed(&self) -> usize {
        self.initial_shape.rows().saturating_sub(self.final_shape.rows())
    }

    /// Columns gained (negative if columns were dropped).
    pub fn new_features(&self) -> i64 {
        self.final_shape.cols() as i64 - self.initial_shape.cols() as i64
    }
}

/// Outcome of processing one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "processing_status", rename_all = "lowercase")]
pub enum MetricsEntry {
    Success(ProcessingMetrics),
    Failed { error_message: String },
}

impl MetricsEntry {
    pub fn failed(error: impl std::fmt::Display) -> Self {
        Self::Failed {
            error_message: error.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn status(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::Failed { .. } => "failed",
        }
    }

    pub fn metrics(&self) -> Option<&ProcessingMetrics> {
        match self {
            Self::Success(m) => Some(m),
            Self::Failed { .. } => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("metrics report not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid metrics report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Ordered mapping from source file name to metrics entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricsReport {
    entries: BTreeMap<String, MetricsEntry>,
}

impl MetricsReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an entry, replacing any earlier one for the same key.
    pub fn record(&mut self, key: impl Into<String>, entry: MetricsEntry) {
        self.entries.insert(key.into(), entry);
    }

    pub fn get(&self, key: &str) -> Option<&MetricsEntry> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetricsEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn success_count(&self) -> usize {
        self.entries.values().filter(|e| e.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.len() - self.success_count()
    }

    pub fn to_json_pretty(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as pretty JSON (atomic).
    pub fn save(&self, path: &Path) -> Result<(), ReportError> {
        let json = self.to_json_pretty()?;
        write_atomic(path, json.as_bytes()).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ReportError> {
        let content = fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ReportError::NotFound(path.to_path_buf())
            } else {
                ReportError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl FromIterator<(String, MetricsEntry)> for MetricsReport {
    fn from_iter<I: IntoIterator<Item = (String, MetricsEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
