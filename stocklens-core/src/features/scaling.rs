//! Column scalers fitted on a whole series.
//!
//! Both scalers ignore undefined and non-finite values when fitting and pass
//! undefined values through unchanged when transforming. A degenerate spread
//! (zero std, zero range, or nothing to fit on) scales by 1.

use super::finite;

/// Z-score with the population mean and standard deviation (ddof = 0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardScaler {
    pub mean: f64,
    pub scale: f64,
}

impl StandardScaler {
    pub fn fit(values: &[Option<f64>]) -> Self {
        let vals: Vec<f64> = defined_values(values).collect();
        if vals.is_empty() {
            return Self {
                mean: 0.0,
                scale: 1.0,
            };
        }
        let n = vals.len() as f64;
        let mean = vals.iter().sum::<f64>() / n;
        let std = (vals.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
        Self {
            mean,
            scale: non_degenerate(std),
        }
    }

    pub fn transform(&self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        values
            .iter()
            .map(|v| v.and_then(|x| finite((x - self.mean) / self.scale)))
            .collect()
    }
}

/// Min-max scaling into `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMaxScaler {
    pub min: f64,
    pub range: f64,
}

impl MinMaxScaler {
    pub fn fit(values: &[Option<f64>]) -> Self {
        let (min, max) = defined_values(values)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if min > max {
            return Self {
                min: 0.0,
                range: 1.0,
            };
        }
        Self {
            min,
            range: non_degenerate(max - min),
        }
    }

    pub fn transform(&self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        values
            .iter()
            .map(|v| v.and_then(|x| finite((x - self.min) / self.range)))
            .collect()
    }
}

fn defined_values(values: &[Option<f64>]) -> impl Iterator<Item = f64> + '_ {
    values.iter().flatten().copied().filter(|v| v.is_finite())
}

fn non_degenerate(spread: f64) -> f64 {
    if spread == 0.0 || !spread.is_finite() {
        1.0
    } else {
        spread
    }
}
