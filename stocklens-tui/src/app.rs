//! Application state: single-owner, main-thread only.
//!
//! Everything the pages render is loaded from disk up front; `r` reloads it.

use serde::{Deserialize, Serialize};

use stocklens_core::data::TableMeta;
use stocklens_core::metrics::ReportError;
use stocklens_core::{CleanedTable, MetricsEntry, MetricsReport};
use stocklens_runner::{CleanedStore, PipelineConfig, StoreError};

/// Which page is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Page {
    Ingestion,
    Processing,
    Visualization,
    Analysis,
}

impl Page {
    pub const ALL: [Page; 4] = [
        Page::Ingestion,
        Page::Processing,
        Page::Visualization,
        Page::Analysis,
    ];

    pub fn index(self) -> usize {
        match self {
            Page::Ingestion => 0,
            Page::Processing => 1,
            Page::Visualization => 2,
            Page::Analysis => 3,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            Page::Ingestion => "Ingestion",
            Page::Processing => "Processing",
            Page::Visualization => "Visualization",
            Page::Analysis => "Analysis",
        }
    }

    pub fn next(self) -> Page {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Page {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
}

/// A ticker's cleaned table as found on disk.
#[derive(Debug, Clone)]
pub enum TableState {
    Loaded(CleanedTable),
    /// No cleaned table was written (never processed, or processing failed).
    Missing,
    Unreadable(String),
}

#[derive(Debug, Clone)]
pub struct TickerView {
    pub symbol: String,
    pub source_file: String,
    pub table: TableState,
    pub meta: Option<TableMeta>,
}

impl TickerView {
    pub fn loaded(&self) -> Option<&CleanedTable> {
        match &self.table {
            TableState::Loaded(t) => Some(t),
            _ => None,
        }
    }
}

/// Top-level application state.
pub struct AppState {
    pub page: Page,
    pub running: bool,
    pub tickers: Vec<TickerView>,
    pub selected: usize,
    pub report: Option<MetricsReport>,
    pub status_message: Option<(String, StatusLevel)>,
    pub config: PipelineConfig,
}

impl AppState {
    pub fn new(config: PipelineConfig) -> Self {
        let mut app = Self {
            page: Page::Ingestion,
            running: true,
            tickers: Vec::new(),
            selected: 0,
            report: None,
            status_message: None,
            config,
        };
        app.reload();
        app
    }

    /// Re-read every cleaned table and the metrics report. Keeps the selected ticker.
    pub fn reload(&mut self) {
        let keep = self.selected_ticker().map(|t| t.symbol.clone());
        let store = CleanedStore::from_config(&self.config);

        self.tickers = store
            .read_all()
            .into_iter()
            .map(|(symbol, result)| {
                let table = match result {
                    Ok(t) => TableState::Loaded(t),
                    Err(StoreError::NotFound { .. }) => TableState::Missing,
                    Err(e) => TableState::Unreadable(e.to_string()),
                };
                TickerView {
                    source_file: store.source_file(&symbol),
                    meta: store.meta(&symbol),
                    symbol,
                    table,
                }
            })
            .collect();

        let mut warning = None;
        self.report = match MetricsReport::load(&self.config.paths.report_path) {
            Ok(r) => Some(r),
            Err(ReportError::NotFound(_)) => None,
            Err(e) => {
                warning = Some(format!("Metrics report unreadable: {e}"));
                None
            }
        };

        self.selected = 0;
        if let Some(symbol) = keep {
            self.select_symbol(&symbol);
        }

        let loaded = self.tickers.iter().filter(|t| t.loaded().is_some()).count();
        match warning {
            Some(w) => self.set_warning(w),
            None => self.set_status(format!("Loaded {loaded}/{} tickers", self.tickers.len())),
        }
    }

    pub fn selected_ticker(&self) -> Option<&TickerView> {
        self.tickers.get(self.selected)
    }

    /// The metrics entry for the selected ticker's source file.
    pub fn selected_metrics(&self) -> Option<&MetricsEntry> {
        let ticker = self.selected_ticker()?;
        self.report.as_ref()?.get(&ticker.source_file)
    }

    pub fn next_ticker(&mut self) {
        if !self.tickers.is_empty() {
            self.selected = (self.selected + 1) % self.tickers.len();
        }
    }

    pub fn prev_ticker(&mut self) {
        if !self.tickers.is_empty() {
            self.selected = (self.selected + self.tickers.len() - 1) % self.tickers.len();
        }
    }

    /// Select a ticker by symbol (case-insensitive). Returns false if unknown.
    pub fn select_symbol(&mut self, symbol: &str) -> bool {
        match self
            .tickers
            .iter()
            .position(|t| t.symbol.eq_ignore_ascii_case(symbol))
        {
            Some(i) => {
                self.selected = i;
                true
            }
            None => false,
        }
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stocklens_runner::{PathsConfig, TickerSpec};

    fn config(root: &std::path::Path) -> PipelineConfig {
        PipelineConfig {
            paths: PathsConfig {
                input_dir: root.join("data"),
                output_dir: root.join("cleaned_data"),
                model_dir: root.join("models"),
                report_path: root.join("metrics.json"),
            },
            tickers: ["JNJ", "TSLA", "WMT"]
                .iter()
                .map(|s| TickerSpec::with_default_file(s))
                .collect(),
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn page_cycle() {
        assert_eq!(Page::Ingestion.next(), Page::Processing);
        assert_eq!(Page::Analysis.next(), Page::Ingestion);
        assert_eq!(Page::Ingestion.prev(), Page::Analysis);
        for (i, p) in Page::ALL.iter().enumerate() {
            assert_eq!(Page::from_index(i), Some(*p));
            assert_eq!(p.index(), i);
        }
        assert_eq!(Page::from_index(4), None);
    }

    #[test]
    fn missing_tables_are_a_state_not_an_error() {
        let root = tempfile::tempdir().unwrap();
        let app = AppState::new(config(root.path()));
        assert_eq!(app.tickers.len(), 3);
        assert!(app
            .tickers
            .iter()
            .all(|t| matches!(t.table, TableState::Missing)));
        assert!(app.report.is_none());
        assert!(app.selected_metrics().is_none());
    }

    #[test]
    fn unreadable_table_is_reported() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("cleaned_data");
        std::fs::create_dir_all(&dir).unwrap();
        let bad = "timestamp,close\nnot-a-date,x\n";
        std::fs::write(dir.join("cleaned_WMT_TATA_data.csv"), bad).unwrap();

        let app = AppState::new(config(root.path()));
        let wmt = app.tickers.iter().find(|t| t.symbol == "WMT").unwrap();
        assert!(matches!(wmt.table, TableState::Unreadable(_)));
    }

    #[test]
    fn ticker_navigation_wraps() {
        let root = tempfile::tempdir().unwrap();
        let mut app = AppState::new(config(root.path()));
        app.prev_ticker();
        assert_eq!(app.selected_ticker().unwrap().symbol, "WMT");
        app.next_ticker();
        assert_eq!(app.selected_ticker().unwrap().symbol, "JNJ");
        assert!(app.select_symbol("tsla"));
        assert_eq!(app.selected, 1);
        assert!(!app.select_symbol("ZZZ"));
    }

    #[test]
    fn metrics_entry_follows_selection() {
        let root = tempfile::tempdir().unwrap();
        let cfg = config(root.path());
        let mut report = MetricsReport::new();
        report.record("TSLA_TATA_data.csv", MetricsEntry::failed("Missing required column: close"));
        report.save(&cfg.paths.report_path).unwrap();

        let mut app = AppState::new(cfg);
        assert!(app.selected_metrics().is_none());
        app.select_symbol("TSLA");
        assert_eq!(app.selected_metrics().unwrap().status(), "failed");
    }
}
