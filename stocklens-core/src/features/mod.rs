//! Derived column computations.
//!
//! Series features take one numeric column (in time order) and produce an
//! output column of the same length, with `None` wherever the value is
//! undefined. Row statistics and scalers live alongside them.
//!
//! No feature value at row t may depend on rows after t, except the scalers,
//! which are fitted over the whole series by construction.

pub mod returns;
pub mod rolling;
pub mod row_stats;
pub mod scaling;

pub use returns::{CumulativeReturn, PctChange};
pub use rolling::{RollingMean, RollingStd};
pub use row_stats::RowStats;
pub use scaling::{MinMaxScaler, StandardScaler};

/// Trailing window for the moving average and rolling volatility.
pub const MOVING_AVG_WINDOW: usize = 20;

/// A derived column computed from one input column.
pub trait SeriesFeature: Send + Sync {
    /// Output column name (e.g. "daily_pct_change").
    fn name(&self) -> &str;

    /// Number of leading rows that are always undefined.
    fn lookback(&self) -> usize;

    /// Compute the feature for the whole series. Output length equals input length.
    fn compute(&self, input: &[Option<f64>]) -> Vec<Option<f64>>;
}

/// Keep a value only if it is finite.
pub(crate) fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

/// Wrap plain values as a fully defined column.
#[cfg(test)]
pub fn defined(values: &[f64]) -> Vec<Option<f64>> {
    values.iter().copied().map(Some).collect()
}
