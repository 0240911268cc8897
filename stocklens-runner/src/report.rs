//! Report rendering: the metrics report as Markdown or JSON.

use std::path::Path;

use anyhow::{Context, Result};
use stocklens_core::{MetricsEntry, MetricsReport};

use crate::runner::{ModelOutcome, RunSummary};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a metrics report to pretty JSON.
pub fn export_json(report: &MetricsReport) -> Result<String> {
    report
        .to_json_pretty()
        .context("failed to serialize metrics report to JSON")
}

/// Load a metrics report written by a previous run.
pub fn load_report(path: &Path) -> Result<MetricsReport> {
    MetricsReport::load(path)
        .with_context(|| format!("failed to load metrics report from {}", path.display()))
}

// ─── Markdown ───────────────────────────────────────────────────────

/// Render a metrics report as a Markdown document.
pub fn generate_report(report: &MetricsReport) -> String {
    let mut md = String::new();

    md.push_str("# Processing Report\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Files | {} |\n", report.len()));
    md.push_str(&format!("| Succeeded | {} |\n", report.success_count()));
    md.push_str(&format!("| Failed | {} |\n", report.failure_count()));
    md.push('\n');

    md.push_str("## Per-file Metrics\n\n");
    md.push_str(
        "| File | Status | Initial | Final | Rows Removed | Missing (before/after) \
         | Duplicates (before/after) | Cleaning (s) | Transform (s) | Total (s) |\n",
    );
    md.push_str("| --- | --- | --- | --- | --- | --- | --- | --- | --- | --- |\n");
    for (file, entry) in report.iter() {
        match entry {
            MetricsEntry::Success(m) => md.push_str(&format!(
                "| {} | success | {}x{} | {}x{} | {} | {}/{} | {}/{} | {:.4} | {:.4} | {:.4} |\n",
                file,
                m.initial_shape.rows(),
                m.initial_shape.cols(),
                m.final_shape.rows(),
                m.final_shape.cols(),
                m.rows_removed(),
                m.missing_before,
                m.missing_after,
                m.duplicates_before,
                m.duplicates_after,
                m.cleaning_time,
                m.transformation_time,
                m.total_processing_time,
            )),
            MetricsEntry::Failed { .. } => md.push_str(&format!(
                "| {file} | **failed** | - | - | - | - | - | - | - | - |\n"
            )),
        }
    }

    let failures: Vec<_> = report
        .iter()
        .filter_map(|(file, e)| match e {
            MetricsEntry::Failed { error_message } => Some((file, error_message)),
            MetricsEntry::Success(_) => None,
        })
        .collect();
    if !failures.is_empty() {
        md.push_str("\n## Failures\n\n");
        for (file, error) in failures {
            md.push_str(&format!("- `{file}`: {error}\n"));
        }
    }

    md
}

/// Render a full run: the metrics report plus the model results.
pub fn generate_run_report(summary: &RunSummary) -> String {
    let mut md = generate_report(&summary.report);

    md.push_str("\n## Models\n\n");
    md.push_str("| Ticker | Result | Test MSE | Train Rows | Test Rows |\n");
    md.push_str("| --- | --- | --- | --- | --- |\n");
    for o in &summary.outcomes {
        let row = match &o.model {
            ModelOutcome::Trained {
                path,
                test_mse,
                train_rows,
                test_rows,
            } => format!(
                "| {} | saved to `{}` | {:.6} | {} | {} |\n",
                o.symbol,
                path.display(),
                test_mse,
                train_rows,
                test_rows
            ),
            ModelOutcome::Skipped(reason) => {
                format!("| {} | skipped: {reason} | - | - | - |\n", o.symbol)
            }
            ModelOutcome::Failed(error) => {
                format!("| {} | failed: {error} | - | - | - |\n", o.symbol)
            }
            ModelOutcome::Disabled => format!("| {} | disabled | - | - | - |\n", o.symbol),
        };
        md.push_str(&row);
    }

    md.push_str(&format!(
        "\nMetrics report: `{}`\n",
        summary.report_path.display()
    ));
    md
}
