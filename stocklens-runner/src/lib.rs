//! StockLens Runner: run orchestration on top of `stocklens-core`.
//!
//! - TOML pipeline configuration (paths, tickers, model settings)
//! - The per-ticker run loop with optional rayon parallelism
//! - Read access to persisted cleaned tables
//! - Markdown and JSON rendering of the metrics report

pub mod config;
pub mod report;
pub mod runner;
pub mod store;

pub use config::{ConfigError, PathsConfig, PipelineConfig, TickerSpec};
pub use runner::{
    run_pipeline, ModelOutcome, RunError, RunOptions, RunSummary, TickerOutcome, TickerStatus,
};
pub use store::{CleanedStore, StoreError};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn config_is_send_sync() {
        assert_send::<PipelineConfig>();
        assert_sync::<PipelineConfig>();
    }

    #[test]
    fn store_is_send_sync() {
        // Shared by the HTTP handlers.
        assert_send::<CleanedStore>();
        assert_sync::<CleanedStore>();
    }

    #[test]
    fn run_outputs_are_send_sync() {
        assert_send::<TickerOutcome>();
        assert_sync::<TickerOutcome>();
        assert_send::<RunSummary>();
        assert_sync::<RunSummary>();
    }
}
