//! Table statistics shown on the Ingestion and Analysis pages.

use std::collections::HashSet;

use chrono::NaiveDateTime;
use stocklens_core::data::CLEANED_COLUMNS;
use stocklens_core::CleanedTable;

/// Mean/min/max of one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub name: &'static str,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Pearson correlation with `close`; `None` when either side is constant.
    pub corr_with_close: Option<f64>,
}

/// Numeric column names in persisted order (everything but `timestamp`).
pub fn numeric_columns() -> impl Iterator<Item = &'static str> {
    CLEANED_COLUMNS.iter().copied().filter(|c| *c != "timestamp")
}

pub fn column_summaries(table: &CleanedTable) -> Vec<ColumnSummary> {
    if table.is_empty() {
        return Vec::new();
    }
    let close = table.column("close").unwrap_or_default();
    numeric_columns()
        .filter_map(|name| {
            let values = table.column(name)?;
            let n = values.len() as f64;
            Some(ColumnSummary {
                name,
                mean: values.iter().sum::<f64>() / n,
                min: values.iter().copied().fold(f64::INFINITY, f64::min),
                max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                corr_with_close: correlation(&values, &close),
            })
        })
        .collect()
}

pub fn correlation(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);
    let mx = xs.iter().sum::<f64>() / n as f64;
    let my = ys.iter().sum::<f64>() / n as f64;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let (dx, dy) = (x - mx, y - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    let denom = (sxx * syy).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }
    Some((sxy / denom).clamp(-1.0, 1.0))
}

/// Best and worst cumulative return, with the date each occurred.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnExtremes {
    pub best: (NaiveDateTime, f64),
    pub worst: (NaiveDateTime, f64),
}

/// First occurrence wins on ties.
pub fn return_extremes(table: &CleanedTable) -> Option<ReturnExtremes> {
    let first = table.records.first()?;
    let start = (first.timestamp, first.cumulative_return);
    let (best, worst) = table.records.iter().skip(1).fold((start, start), |(best, worst), r| {
        let point = (r.timestamp, r.cumulative_return);
        (
            if point.1 > best.1 { point } else { best },
            if point.1 < worst.1 { point } else { worst },
        )
    });
    Some(ReturnExtremes { best, worst })
}

/// Data-quality counts for the Ingestion page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Quality {
    pub records: usize,
    /// Non-finite numeric cells.
    pub missing: usize,
    /// Rows identical to an earlier row.
    pub duplicates: usize,
}

pub fn quality(table: &CleanedTable) -> Quality {
    let mut seen = HashSet::new();
    let mut q = Quality {
        records: table.len(),
        ..Quality::default()
    };
    for r in &table.records {
        let cells: Vec<f64> = numeric_columns().filter_map(|c| r.value(c)).collect();
        q.missing += cells.iter().filter(|v| !v.is_finite()).count();
        let key: Vec<u64> = cells.iter().map(|v| v.to_bits()).collect();
        if !seen.insert((r.timestamp, key)) {
            q.duplicates += 1;
        }
    }
    q
}
