//! Run orchestration: every configured ticker through the pipeline and the
//! model trainer, then one metrics report write.
//!
//! Each ticker is its own failure boundary. A pipeline error becomes a
//! `failed` metrics entry; a trainer error is only recorded in the run
//! summary. Neither stops the remaining tickers.

use std::path::PathBuf;

use rayon::prelude::*;
use thiserror::Error;
use tracing::{error, info, warn};

use stocklens_core::metrics::ReportError;
use stocklens_core::model::{self, ModelError, ModelStore, TrainConfig};
use stocklens_core::{CleanedTable, MetricsEntry, MetricsReport, Pipeline};

use crate::config::{ConfigError, PipelineConfig, TickerSpec};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("report error: {0}")]
    Report(#[from] ReportError),
}

/// Switches for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Process tickers on the rayon pool instead of one after another.
    pub parallel: bool,
    /// Fit and persist a model for every successfully cleaned ticker.
    pub train_models: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            parallel: false,
            train_models: true,
        }
    }
}

/// What happened to a ticker's model.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelOutcome {
    Trained {
        path: PathBuf,
        test_mse: f64,
        train_rows: usize,
        test_rows: usize,
    },
    Skipped(String),
    Failed(String),
    Disabled,
}

/// What happened to a ticker's data.
#[derive(Debug, Clone, PartialEq)]
pub enum TickerStatus {
    Cleaned { rows: usize },
    /// Processed successfully but no row survived cleaning.
    Empty,
    Failed { error: String },
}

/// Per-ticker line of the run summary.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerOutcome {
    pub symbol: String,
    pub source_file: String,
    pub status: TickerStatus,
    pub model: ModelOutcome,
}

impl TickerOutcome {
    pub fn summary_line(&self) -> String {
        let data = match &self.status {
            TickerStatus::Cleaned { rows } => format!("success ({rows} rows)"),
            TickerStatus::Empty => "success (empty)".to_string(),
            TickerStatus::Failed { error } => format!("failed: {error}"),
        };
        let model = match &self.model {
            ModelOutcome::Trained { test_mse, .. } => format!("model mse {test_mse:.4}"),
            ModelOutcome::Skipped(reason) => format!("model skipped: {reason}"),
            ModelOutcome::Failed(error) => format!("model failed: {error}"),
            ModelOutcome::Disabled => "model disabled".to_string(),
        };
        format!("{:<6} {:<28} {data}; {model}", self.symbol, self.source_file)
    }
}

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub report: MetricsReport,
    pub outcomes: Vec<TickerOutcome>,
    pub report_path: PathBuf,
}

impl RunSummary {
    pub fn failed(&self) -> impl Iterator<Item = &TickerOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, TickerStatus::Failed { .. }))
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed().next().is_none()
    }
}

/// Process every configured ticker and write the metrics report once.
pub fn run_pipeline(config: &PipelineConfig, options: RunOptions) -> Result<RunSummary, RunError> {
    config.validate()?;

    let pipeline = Pipeline::new(&config.paths.output_dir);
    let models = ModelStore::new(&config.paths.model_dir);
    let train = options.train_models.then_some(&config.model);

    info!(
        tickers = config.tickers.len(),
        parallel = options.parallel,
        "starting run"
    );

    let results: Vec<(String, MetricsEntry, TickerOutcome)> = if options.parallel {
        config
            .tickers
            .par_iter()
            .map(|t| process_ticker(config, t, &pipeline, &models, train))
            .collect()
    } else {
        config
            .tickers
            .iter()
            .map(|t| process_ticker(config, t, &pipeline, &models, train))
            .collect()
    };

    let mut report = MetricsReport::new();
    let mut outcomes = Vec::with_capacity(results.len());
    for (key, entry, outcome) in results {
        report.record(key, entry);
        outcomes.push(outcome);
    }

    report.save(&config.paths.report_path)?;
    info!(
        path = %config.paths.report_path.display(),
        succeeded = report.success_count(),
        failed = report.failure_count(),
        "metrics report written"
    );

    Ok(RunSummary {
        report,
        outcomes,
        report_path: config.paths.report_path.clone(),
    })
}

/// One ticker, start to finish. Never fails: errors become entries and outcomes.
fn process_ticker(
    config: &PipelineConfig,
    ticker: &TickerSpec,
    pipeline: &Pipeline,
    models: &ModelStore,
    train: Option<&TrainConfig>,
) -> (String, MetricsEntry, TickerOutcome) {
    let input = config.input_path(ticker);
    let mut outcome = TickerOutcome {
        symbol: ticker.symbol.clone(),
        source_file: ticker.file.clone(),
        status: TickerStatus::Empty,
        model: ModelOutcome::Disabled,
    };

    let output = match pipeline.process_file(&input, &ticker.symbol) {
        Ok(output) => output,
        Err(e) => {
            error!(ticker = %ticker.symbol, file = %ticker.file, error = %e, "ticker failed");
            outcome.status = TickerStatus::Failed {
                error: e.to_string(),
            };
            outcome.model = ModelOutcome::Skipped("no cleaned data".to_string());
            return (ticker.file.clone(), MetricsEntry::failed(e), outcome);
        }
    };

    outcome.status = if output.table.is_empty() {
        warn!(ticker = %ticker.symbol, "cleaned table is empty");
        TickerStatus::Empty
    } else {
        TickerStatus::Cleaned {
            rows: output.table.len(),
        }
    };

    if let Some(train_config) = train {
        outcome.model = train_model(&output.table, models, train_config);
    }

    (ticker.file.clone(), output.entry(), outcome)
}

fn train_model(table: &CleanedTable, models: &ModelStore, config: &TrainConfig) -> ModelOutcome {
    if table.is_empty() {
        warn!(ticker = %table.ticker, "skipping model training: empty cleaned table");
        return ModelOutcome::Skipped("empty cleaned table".to_string());
    }

    let artifact = match model::train(table, config) {
        Ok(a) => a,
        Err(e @ ModelError::InsufficientData { .. }) => {
            warn!(ticker = %table.ticker, error = %e, "skipping model training");
            return ModelOutcome::Skipped(e.to_string());
        }
        Err(e) => {
            warn!(ticker = %table.ticker, error = %e, "model training failed");
            return ModelOutcome::Failed(e.to_string());
        }
    };

    match models.save(&artifact) {
        Ok(path) => ModelOutcome::Trained {
            path,
            test_mse: artifact.test_mse,
            train_rows: artifact.train_rows,
            test_rows: artifact.test_rows,
        },
        Err(e) => {
            warn!(ticker = %table.ticker, error = %e, "model save failed");
            ModelOutcome::Failed(e.to_string())
        }
    }
}
