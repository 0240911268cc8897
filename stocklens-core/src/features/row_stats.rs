//! Per-row statistics over the four price columns.
//!
//! Missing cells are skipped. Mean and median need one defined price; the
//! sample standard deviation and variance (ddof = 1) need two.

use super::finite;
use super::rolling::sample_var;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RowStats {
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std: Option<f64>,
    pub var: Option<f64>,
}

impl RowStats {
    /// Statistics over `[open, high, low, close]`.
    pub fn compute(prices: [Option<f64>; 4]) -> Self {
        let mut vals: Vec<f64> = prices.iter().flatten().copied().collect();
        if vals.is_empty() {
            return Self::default();
        }

        let mean = vals.iter().sum::<f64>() / vals.len() as f64;
        let var = (vals.len() >= 2).then(|| sample_var(&vals));

        vals.sort_by(f64::total_cmp);
        let mid = vals.len() / 2;
        let median = if vals.len() % 2 == 0 {
            (vals[mid - 1] + vals[mid]) / 2.0
        } else {
            vals[mid]
        };

        Self {
            mean: finite(mean),
            median: finite(median),
            std: var.map(f64::sqrt).and_then(finite),
            var: var.and_then(finite),
        }
    }
}
