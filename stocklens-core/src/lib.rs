//! StockLens Core: raw price ingestion, cleaning & feature pipeline, metrics, price model.
//!
//! This crate contains everything that produces the analysis-ready dataset:
//! - Domain types (raw records, cleaned records, timestamps)
//! - Raw CSV ingestion and cleaned-table persistence
//! - The ordered cleaning & feature pipeline (fill, dedup, sort, derive, scale, drop)
//! - Per-ticker processing metrics and the run-level metrics report
//! - The per-ticker close-price regression model

pub mod data;
pub mod domain;
pub mod features;
pub mod metrics;
pub mod model;
pub mod pipeline;

pub use domain::{CleanedRecord, CleanedTable, RawRecord, RawTable};
pub use metrics::{MetricsEntry, MetricsReport, ProcessingMetrics, Shape};
pub use pipeline::{process, Pipeline, PipelineError, PipelineOutput};
