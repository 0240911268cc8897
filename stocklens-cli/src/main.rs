//! StockLens CLI: process raw price files and inspect the results.
//!
//! Commands:
//! - `process`: clean every configured ticker, write the metrics report, train models
//! - `report`: render the last metrics report as Markdown or JSON
//! - `show`: print a cleaned table preview, its sidecar and model details
//! - `serve`: start the read-only HTTP endpoint
//! - `init`: write a default `stocklens.toml`

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use stocklens_api::ApiState;
use stocklens_core::model::ModelStore;
use stocklens_core::MetricsEntry;
use stocklens_runner::config::DEFAULT_CONFIG_FILE;
use stocklens_runner::report::{export_json, generate_report, generate_run_report, load_report};
use stocklens_runner::{run_pipeline, CleanedStore, PipelineConfig, RunOptions, TickerStatus};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stocklens", about = "StockLens: stock price cleaning and analysis")]
struct Cli {
    /// Path to the TOML config. Built-in defaults are used if it does not exist.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean the configured tickers and write the metrics report.
    Process {
        /// Only these tickers (e.g., JNJ WMT). Defaults to every configured ticker.
        tickers: Vec<String>,

        /// Process tickers in parallel.
        #[arg(long, default_value_t = false)]
        parallel: bool,

        /// Do not train price models.
        #[arg(long, default_value_t = false)]
        skip_model: bool,

        /// Override the raw input directory.
        #[arg(long)]
        input_dir: Option<PathBuf>,

        /// Override the cleaned output directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Override the model directory.
        #[arg(long)]
        model_dir: Option<PathBuf>,

        /// Override the metrics report path.
        #[arg(long)]
        report: Option<PathBuf>,

        /// Also write a Markdown run report to this path.
        #[arg(long)]
        markdown: Option<PathBuf>,
    },
    /// Render the last metrics report.
    Report {
        #[arg(long, value_enum, default_value_t = ReportFormat::Md)]
        format: ReportFormat,

        /// Report path. Defaults to the configured one.
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Preview one ticker's cleaned table.
    Show {
        ticker: String,

        /// Number of rows to print.
        #[arg(long, default_value_t = 5)]
        rows: usize,
    },
    /// Serve cleaned data and metrics over HTTP.
    Serve {
        #[arg(long, default_value = "127.0.0.1:5000")]
        addr: SocketAddr,
    },
    /// Write the default configuration file.
    Init {
        /// Overwrite an existing file.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportFormat {
    Md,
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            tickers,
            parallel,
            skip_model,
            input_dir,
            output_dir,
            model_dir,
            report,
            markdown,
        } => {
            let mut config = load_config(&cli.config)?;
            config.select(&tickers);
            let paths = &mut config.paths;
            if let Some(dir) = input_dir {
                paths.input_dir = dir;
            }
            if let Some(dir) = output_dir {
                paths.output_dir = dir;
            }
            if let Some(dir) = model_dir {
                paths.model_dir = dir;
            }
            if let Some(path) = report {
                paths.report_path = path;
            }
            let options = RunOptions {
                parallel,
                train_models: !skip_model,
            };
            run_process(&config, options, markdown.as_deref())
        }
        Commands::Report { format, report } => {
            let config = load_config(&cli.config)?;
            let path = report.unwrap_or(config.paths.report_path);
            run_report(&path, format)
        }
        Commands::Show { ticker, rows } => run_show(&load_config(&cli.config)?, &ticker, rows),
        Commands::Serve { addr } => run_serve(&load_config(&cli.config)?, addr),
        Commands::Init { force } => run_init(&cli.config, force),
    }
}

fn load_config(path: &Path) -> Result<PipelineConfig> {
    PipelineConfig::load_or_default(path)
        .with_context(|| format!("failed to load config {}", path.display()))
}

fn run_process(
    config: &PipelineConfig,
    options: RunOptions,
    markdown: Option<&Path>,
) -> Result<()> {
    let summary = run_pipeline(config, options)?;

    println!("Processed {} file(s):", summary.outcomes.len());
    for outcome in &summary.outcomes {
        println!("  {}", outcome.summary_line());
    }
    println!(
        "Metrics report saved to: {} ({} succeeded, {} failed)",
        summary.report_path.display(),
        summary.report.success_count(),
        summary.report.failure_count()
    );

    if let Some(path) = markdown {
        std::fs::write(path, generate_run_report(&summary))
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Run report saved to: {}", path.display());
    }

    let empty = summary
        .outcomes
        .iter()
        .filter(|o| o.status == TickerStatus::Empty)
        .count();
    if empty > 0 {
        println!(
            "Note: {empty} ticker(s) produced an empty cleaned table (fewer than 20 usable rows)."
        );
    }

    if !summary.all_succeeded() {
        for failed in summary.failed() {
            if let TickerStatus::Failed { error } = &failed.status {
                eprintln!("Error for {}: {error}", failed.symbol);
            }
        }
        std::process::exit(1);
    }
    Ok(())
}

fn run_report(path: &Path, format: ReportFormat) -> Result<()> {
    let report = load_report(path)?;
    match format {
        ReportFormat::Md => print!("{}", generate_report(&report)),
        ReportFormat::Json => println!("{}", export_json(&report)?),
    }
    Ok(())
}

fn run_show(config: &PipelineConfig, ticker: &str, rows: usize) -> Result<()> {
    let store = CleanedStore::from_config(config);
    if !store.exists(ticker) {
        bail!(
            "no cleaned data for {ticker} at {} (run `stocklens process` first)",
            store.table_path(ticker).display()
        );
    }
    let table = store.read_table(ticker)?;

    println!("Ticker:  {}", table.ticker);
    println!("Rows:    {}", table.len());
    if let (Some(first), Some(last)) = (table.first_timestamp(), table.last_timestamp()) {
        println!("Range:   {} .. {}", first.date(), last.date());
    }
    if let Some(meta) = store.meta(ticker) {
        println!("Hash:    {}", meta.data_hash);
        println!("Written: {}", meta.written_at);
    }

    if let Ok(report) = load_report(&config.paths.report_path) {
        match report.get(&store.source_file(ticker)) {
            Some(MetricsEntry::Success(m)) => println!(
                "Metrics: {}x{} -> {}x{}, {:.4}s total",
                m.initial_shape.rows(),
                m.initial_shape.cols(),
                m.final_shape.rows(),
                m.final_shape.cols(),
                m.total_processing_time
            ),
            Some(MetricsEntry::Failed { error_message }) => {
                println!("Metrics: last run failed: {error_message}")
            }
            None => {}
        }
    }

    match ModelStore::new(&config.paths.model_dir).load(&store.symbol(ticker)) {
        Ok(model) => println!(
            "Model:   test MSE {:.6} ({} train / {} test rows, seed {})",
            model.test_mse, model.train_rows, model.test_rows, model.seed
        ),
        Err(_) => println!("Model:   none"),
    }

    println!();
    println!(
        "{:<12} {:>10} {:>10} {:>10} {:>10} {:>12} {:>10}",
        "timestamp", "open", "high", "low", "close", "volume", "ma20"
    );
    for r in table.records.iter().take(rows) {
        println!(
            "{:<12} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>12.0} {:>10.2}",
            r.timestamp.date(),
            r.open,
            r.high,
            r.low,
            r.close,
            r.volume,
            r.moving_avg_20
        );
    }
    Ok(())
}

fn run_serve(config: &PipelineConfig, addr: SocketAddr) -> Result<()> {
    let state = Arc::new(ApiState::from_config(config));
    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    runtime.block_on(stocklens_api::serve(addr, state))?;
    Ok(())
}

fn run_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    let toml = PipelineConfig::default().to_toml()?;
    std::fs::write(path, toml).with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}
