//! Daily percentage change and cumulative return.

use super::{finite, SeriesFeature};

/// Fractional change vs. the previous row: `x[t] / x[t-1] - 1`.
///
/// Undefined for the first row, next to a missing value, and wherever the
/// ratio is not finite (a zero previous close).
#[derive(Debug, Clone, Default)]
pub struct PctChange;

impl SeriesFeature for PctChange {
    fn name(&self) -> &str {
        "daily_pct_change"
    }

    fn lookback(&self) -> usize {
        1
    }

    fn compute(&self, input: &[Option<f64>]) -> Vec<Option<f64>> {
        let mut out = Vec::with_capacity(input.len());
        if input.is_empty() {
            return out;
        }
        out.push(None);
        for pair in input.windows(2) {
            out.push(match (pair[0], pair[1]) {
                (Some(prev), Some(cur)) => finite(cur / prev - 1.0),
                _ => None,
            });
        }
        out
    }
}

/// Running product of `(1 + r)` over the defined returns.
///
/// Undefined inputs are skipped: they stay undefined in the output and do not
/// reset the product.
#[derive(Debug, Clone, Default)]
pub struct CumulativeReturn;

impl SeriesFeature for CumulativeReturn {
    fn name(&self) -> &str {
        "cumulative_return"
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, input: &[Option<f64>]) -> Vec<Option<f64>> {
        let mut acc = 1.0;
        input
            .iter()
            .map(|r| {
                r.map(|r| {
                    acc *= 1.0 + r;
                    acc
                })
            })
            .collect()
    }
}
