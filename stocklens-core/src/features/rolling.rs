//! Trailing-window mean and sample standard deviation.
//!
//! A window only produces a value when all of its `window` observations are
//! defined (including the current row). Lookback: window - 1.

use super::{finite, SeriesFeature};

#[derive(Debug, Clone)]
pub struct RollingMean {
    window: usize,
    name: String,
}

impl RollingMean {
    pub fn new(window: usize, name: impl Into<String>) -> Self {
        assert!(window >= 1, "rolling window must be >= 1");
        Self {
            window,
            name: name.into(),
        }
    }
}

impl SeriesFeature for RollingMean {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window - 1
    }

    fn compute(&self, input: &[Option<f64>]) -> Vec<Option<f64>> {
        let n = input.len();
        let mut out = vec![None; n];
        let w = self.window;

        // Roll a sum forward, tracking how many gaps sit inside the window.
        let mut sum = 0.0;
        let mut gaps = 0usize;
        let value = |i: usize| input[i].filter(|v| v.is_finite());
        for i in 0..n {
            match value(i) {
                Some(v) => sum += v,
                None => gaps += 1,
            }
            if i >= w {
                match value(i - w) {
                    Some(v) => sum -= v,
                    None => gaps -= 1,
                }
            }
            if i + 1 >= w && gaps == 0 {
                out[i] = Some(sum / w as f64);
            }
        }

        out
    }
}

/// Trailing sample standard deviation (ddof = 1).
#[derive(Debug, Clone)]
pub struct RollingStd {
    window: usize,
    name: String,
}

impl RollingStd {
    pub fn new(window: usize, name: impl Into<String>) -> Self {
        assert!(window >= 2, "rolling std window must be >= 2");
        Self {
            window,
            name: name.into(),
        }
    }
}

impl SeriesFeature for RollingStd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window - 1
    }

    fn compute(&self, input: &[Option<f64>]) -> Vec<Option<f64>> {
        let n = input.len();
        let w = self.window;
        let mut out = vec![None; n];
        if n < w {
            return out;
        }
        for i in (w - 1)..n {
            out[i] = window_values(&input[i + 1 - w..=i])
                .map(|vals| sample_std(&vals))
                .and_then(finite);
        }
        out
    }
}

/// All values of a window, or `None` if any is missing.
fn window_values(window: &[Option<f64>]) -> Option<Vec<f64>> {
    window.iter().copied().collect()
}

/// Sample standard deviation (ddof = 1) of at least two values.
pub(crate) fn sample_std(values: &[f64]) -> f64 {
    sample_var(values).sqrt()
}

/// Sample variance (ddof = 1) of at least two values.
pub(crate) fn sample_var(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{assert_approx, defined, DEFAULT_EPSILON, MOVING_AVG_WINDOW};

    #[test]
    fn mean_5_basic() {
        let input = defined(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0]);
        let out = RollingMean::new(5, "ma").compute(&input);
        assert!(out[..4].iter().all(Option::is_none));
        assert_approx(out[4].unwrap(), 12.0, DEFAULT_EPSILON);
        assert_approx(out[5].unwrap(), 13.0, DEFAULT_EPSILON);
        assert_approx(out[6].unwrap(), 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn mean_gap_blocks_covering_windows() {
        let mut input = defined(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0]);
        input[2] = None;
        let out = RollingMean::new(3, "ma").compute(&input);
        assert_eq!(out[2], None);
        assert_eq!(out[3], None);
        assert_eq!(out[4], None);
        assert_approx(out[5].unwrap(), 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn twenty_day_window_starts_at_row_19() {
        let closes: Vec<f64> = (1..=25).map(f64::from).collect();
        let feature = RollingMean::new(MOVING_AVG_WINDOW, "20_day_moving_avg");
        assert_eq!(feature.lookback(), 19);
        let out = feature.compute(&defined(&closes));
        assert!(out[..19].iter().all(Option::is_none));
        for i in 19..25 {
            let expected = closes[i - 19..=i].iter().sum::<f64>() / 20.0;
            assert_approx(out[i].unwrap(), expected, 1e-9);
        }
    }

    #[test]
    fn std_uses_sample_denominator() {
        let out = RollingStd::new(4, "vol").compute(&defined(&[2.0, 4.0, 4.0, 4.0, 5.0]));
        assert!(out[..3].iter().all(Option::is_none));
        // mean 3.5, squared deviations 2.25+0.25+0.25+0.25 = 3.0, / 3 = 1.0
        assert_approx(out[3].unwrap(), 1.0, DEFAULT_EPSILON);
        // window [4,4,4,5]: mean 4.25, squared deviations sum 0.75, / 3 = 0.25
        assert_approx(out[4].unwrap(), 0.5, DEFAULT_EPSILON);
    }

    #[test]
    fn std_constant_window_is_zero() {
        let out = RollingStd::new(3, "vol").compute(&defined(&[7.0, 7.0, 7.0]));
        assert_approx(out[2].unwrap(), 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn too_few_rows_are_all_undefined() {
        let input = defined(&[1.0, 2.0]);
        assert!(RollingMean::new(5, "ma").compute(&input).iter().all(Option::is_none));
        assert!(RollingStd::new(5, "vol").compute(&input).iter().all(Option::is_none));
    }
}
