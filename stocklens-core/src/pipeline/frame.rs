//! Columnar working set for the feature steps.
//!
//! Rows are held in time order. Derived columns start fully undefined and are
//! filled step by step; the final conversion keeps only complete rows.

use chrono::NaiveDateTime;

use crate::domain::{CleanedRecord, CleanedTable, RawRecord};
use crate::features::{
    CumulativeReturn, MinMaxScaler, PctChange, RollingMean, RollingStd, RowStats, SeriesFeature,
    StandardScaler, MOVING_AVG_WINDOW,
};

type Col = Vec<Option<f64>>;

#[derive(Debug, Clone, Default)]
pub(crate) struct FeatureFrame {
    pub timestamps: Vec<NaiveDateTime>,
    pub open: Col,
    pub high: Col,
    pub low: Col,
    pub close: Col,
    pub volume: Col,
    pub daily_pct_change: Col,
    pub cumulative_return: Col,
    pub moving_avg_20: Col,
    pub rolling_volatility: Col,
    pub mean_price: Col,
    pub median_price: Col,
    pub std_price: Col,
    pub var_price: Col,
    pub normalized_close: Col,
    pub scaled_volume: Col,
}

impl FeatureFrame {
    /// Build from rows already sorted by timestamp.
    pub fn from_sorted(rows: Vec<(NaiveDateTime, RawRecord)>) -> Self {
        let n = rows.len();
        let empty = || vec![None; n];
        let mut frame = Self {
            timestamps: Vec::with_capacity(n),
            open: Vec::with_capacity(n),
            high: Vec::with_capacity(n),
            low: Vec::with_capacity(n),
            close: Vec::with_capacity(n),
            volume: Vec::with_capacity(n),
            daily_pct_change: empty(),
            cumulative_return: empty(),
            moving_avg_20: empty(),
            rolling_volatility: empty(),
            mean_price: empty(),
            median_price: empty(),
            std_price: empty(),
            var_price: empty(),
            normalized_close: empty(),
            scaled_volume: empty(),
        };
        for (ts, rec) in rows {
            frame.timestamps.push(ts);
            frame.open.push(rec.open);
            frame.high.push(rec.high);
            frame.low.push(rec.low);
            frame.close.push(rec.close);
            frame.volume.push(rec.volume);
        }
        frame
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Returns, cumulative return and the trailing-window statistics of `close`.
    pub fn derive_series_features(&mut self) {
        self.daily_pct_change = PctChange.compute(&self.close);
        self.cumulative_return = CumulativeReturn.compute(&self.daily_pct_change);
        self.moving_avg_20 =
            RollingMean::new(MOVING_AVG_WINDOW, "20_day_moving_avg").compute(&self.close);
        self.rolling_volatility =
            RollingStd::new(MOVING_AVG_WINDOW, "rolling_volatility").compute(&self.close);
    }

    /// Row-wise statistics over open, high, low and close.
    pub fn derive_row_stats(&mut self) {
        for i in 0..self.len() {
            let stats = RowStats::compute([self.open[i], self.high[i], self.low[i], self.close[i]]);
            self.mean_price[i] = stats.mean;
            self.median_price[i] = stats.median;
            self.std_price[i] = stats.std;
            self.var_price[i] = stats.var;
        }
    }

    /// Fit and apply the close z-score and the volume min-max over every row.
    pub fn scale(&mut self) -> (StandardScaler, MinMaxScaler) {
        let close_scaler = StandardScaler::fit(&self.close);
        let volume_scaler = MinMaxScaler::fit(&self.volume);
        self.normalized_close = close_scaler.transform(&self.close);
        self.scaled_volume = volume_scaler.transform(&self.volume);
        (close_scaler, volume_scaler)
    }

    /// Keep only rows where every column is defined and finite.
    pub fn into_table(self, ticker: &str) -> CleanedTable {
        let records = (0..self.len()).filter_map(|i| self.row(i)).collect();
        CleanedTable::new(ticker, records)
    }

    fn row(&self, i: usize) -> Option<CleanedRecord> {
        let cell = |col: &Col| col[i].filter(|v| v.is_finite());
        Some(CleanedRecord {
            timestamp: self.timestamps[i],
            open: cell(&self.open)?,
            high: cell(&self.high)?,
            low: cell(&self.low)?,
            close: cell(&self.close)?,
            volume: cell(&self.volume)?,
            daily_pct_change: cell(&self.daily_pct_change)?,
            cumulative_return: cell(&self.cumulative_return)?,
            moving_avg_20: cell(&self.moving_avg_20)?,
            rolling_volatility: cell(&self.rolling_volatility)?,
            mean_price: cell(&self.mean_price)?,
            median_price: cell(&self.median_price)?,
            std_price: cell(&self.std_price)?,
            var_price: cell(&self.var_price)?,
            normalized_close: cell(&self.normalized_close)?,
            scaled_volume: cell(&self.scaled_volume)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parse_timestamp;
    use proptest::prelude::*;

    fn rows(closes: &[f64]) -> Vec<(NaiveDateTime, RawRecord)> {
        let base = parse_timestamp("2024-01-01").unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                (
                    base + chrono::Duration::days(i as i64),
                    RawRecord {
                        timestamp: None,
                        open: Some(c - 0.5),
                        high: Some(c + 1.0),
                        low: Some(c - 1.0),
                        close: Some(c),
                        volume: Some(1000.0 + i as f64),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn first_nineteen_rows_never_survive() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let mut frame = FeatureFrame::from_sorted(rows(&closes));
        frame.derive_series_features();
        frame.derive_row_stats();
        frame.scale();
        let table = frame.into_table("T");
        assert_eq!(table.len(), 11);
        assert_eq!(table.records[0].close, 119.0);
    }

    fn moments(col: &Col) -> (f64, f64) {
        let vals: Vec<f64> = col.iter().flatten().copied().collect();
        let n = vals.len() as f64;
        let mean = vals.iter().sum::<f64>() / n;
        let var = vals.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        (mean, var.sqrt())
    }

    fn bounds(col: &Col) -> (f64, f64) {
        col.iter()
            .flatten()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }

    #[test]
    fn scalers_are_fitted_over_every_row() {
        let closes: Vec<f64> = (0..45)
            .map(|i| 120.0 + (i as f64 * 0.4).sin() * 6.0 + i as f64 * 0.2)
            .collect();
        let mut frame = FeatureFrame::from_sorted(rows(&closes));
        frame.derive_series_features();
        frame.derive_row_stats();
        frame.scale();

        assert_eq!(frame.normalized_close.iter().flatten().count(), 45);
        let (mean, std) = moments(&frame.normalized_close);
        assert!(mean.abs() < 1e-9, "mean {mean}");
        assert!((std - 1.0).abs() < 1e-9, "std {std}");
        assert_eq!(bounds(&frame.scaled_volume), (0.0, 1.0));

        // the warm-up rows are dropped after fitting, so the kept rows are not re-centred
        let table = frame.into_table("T");
        assert_eq!(table.len(), 26);
    }

    proptest! {
        #[test]
        fn scaled_columns_keep_their_moments(
            closes in prop::collection::vec(1.0..500.0_f64, 2..60),
            volumes in prop::collection::vec(0.0..1e6_f64, 2..60),
        ) {
            let n = closes.len().min(volumes.len());
            let mut input = rows(&closes[..n]);
            for (row, &v) in input.iter_mut().zip(&volumes) {
                row.1.volume = Some(v);
            }
            let mut frame = FeatureFrame::from_sorted(input);
            frame.scale();

            let (lo, hi) = bounds(&frame.close);
            if hi - lo > 1.0 {
                let (mean, std) = moments(&frame.normalized_close);
                prop_assert!(mean.abs() < 1e-9);
                prop_assert!((std - 1.0).abs() < 1e-9);
            }
            let (vlo, vhi) = bounds(&frame.volume);
            if vhi > vlo {
                prop_assert_eq!(bounds(&frame.scaled_volume), (0.0, 1.0));
            }
        }
    }

    #[test]
    fn nothing_derived_means_nothing_kept() {
        let frame = FeatureFrame::from_sorted(rows(&[1.0, 2.0]));
        assert!(frame.into_table("T").is_empty());
    }
}
