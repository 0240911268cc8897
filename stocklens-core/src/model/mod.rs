//! Per-ticker close-price regression.
//!
//! Fits an ordinary least squares model of `close` on six cleaned columns,
//! using a seeded shuffled split, and reports the mean squared error on the
//! held-out rows.

mod split;
mod store;

use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::linear_regression::{
    LinearRegression, LinearRegressionParameters, LinearRegressionSolverName,
};
use thiserror::Error;
use tracing::info;

use crate::domain::{CleanedRecord, CleanedTable};
pub use split::{test_size, train_test_split, Split};
pub use store::ModelStore;

/// Model inputs, by cleaned column name.
pub const FEATURE_COLUMNS: &[&str] = &[
    "open",
    "high",
    "low",
    "volume",
    "20_day_moving_avg",
    "rolling_volatility",
];

pub const TARGET_COLUMN: &str = "close";

/// Smallest cleaned table the trainer accepts. After the 20% test split this
/// leaves eight training rows for six features plus an intercept.
pub const MIN_TRAINING_ROWS: usize = 10;

type Regressor = LinearRegression<f64, f64, DenseMatrix<f64>, Vec<f64>>;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("insufficient data: {rows} rows, need at least {min}")]
    InsufficientData { rows: usize, min: usize },

    #[error("invalid test fraction {0}: must be in (0, 1)")]
    InvalidTestFraction(f64),

    #[error("matrix error: {0}")]
    Matrix(String),

    #[error("model fit failed: {0}")]
    Fit(String),

    #[error("prediction failed: {0}")]
    Predict(String),

    #[error("no model stored for {0}")]
    NotFound(String),

    #[error("model I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model serialization: {0}")]
    Json(#[from] serde_json::Error),
}

/// Split and seed settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub seed: u64,
    pub test_fraction: f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            test_fraction: 0.2,
        }
    }
}

/// A fitted model with the facts needed to reproduce and judge it.
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictorArtifact {
    pub ticker: String,
    pub features: Vec<String>,
    pub target: String,
    pub seed: u64,
    pub train_rows: usize,
    pub test_rows: usize,
    pub test_mse: f64,
    pub trained_at: NaiveDateTime,
    model: Regressor,
}

impl PredictorArtifact {
    /// Predict `close` for cleaned records.
    pub fn predict(&self, records: &[CleanedRecord]) -> Result<Vec<f64>, ModelError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        let x = feature_matrix(records.iter())?;
        self.model
            .predict(&x)
            .map_err(|e| ModelError::Predict(e.to_string()))
    }
}

/// Fit the model on one ticker's cleaned table.
pub fn train(table: &CleanedTable, config: &TrainConfig) -> Result<PredictorArtifact, ModelError> {
    let n = table.len();
    if n < MIN_TRAINING_ROWS {
        return Err(ModelError::InsufficientData {
            rows: n,
            min: MIN_TRAINING_ROWS,
        });
    }
    if !(config.test_fraction > 0.0 && config.test_fraction < 1.0) {
        return Err(ModelError::InvalidTestFraction(config.test_fraction));
    }

    let split = train_test_split(n, config.test_fraction, config.seed);
    let pick = |idx: &[usize]| idx.iter().map(|&i| &table.records[i]).collect::<Vec<_>>();
    let (train_rows, test_rows) = (pick(&split.train[..]), pick(&split.test[..]));

    let x_train = feature_matrix(train_rows.iter().copied())?;
    let y_train: Vec<f64> = train_rows.iter().map(|r| r.close).collect();
    let params =
        LinearRegressionParameters::default().with_solver(LinearRegressionSolverName::SVD);
    let model =
        Regressor::fit(&x_train, &y_train, params).map_err(|e| ModelError::Fit(e.to_string()))?;

    let x_test = feature_matrix(test_rows.iter().copied())?;
    let predicted = model
        .predict(&x_test)
        .map_err(|e| ModelError::Predict(e.to_string()))?;
    let actual: Vec<f64> = test_rows.iter().map(|r| r.close).collect();
    let test_mse = mean_squared_error(&actual, &predicted);
    if !test_mse.is_finite() {
        return Err(ModelError::Fit(format!(
            "non-finite test error for {} (degenerate features?)",
            table.ticker
        )));
    }

    info!(
        ticker = %table.ticker,
        train = split.train.len(),
        test = split.test.len(),
        mse = test_mse,
        "model trained"
    );

    Ok(PredictorArtifact {
        ticker: table.ticker.clone(),
        features: FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect(),
        target: TARGET_COLUMN.to_string(),
        seed: config.seed,
        train_rows: split.train.len(),
        test_rows: split.test.len(),
        test_mse,
        trained_at: chrono::Local::now().naive_local(),
        model,
    })
}

pub fn mean_squared_error(actual: &[f64], predicted: &[f64]) -> f64 {
    let n = actual.len().min(predicted.len());
    if n == 0 {
        return 0.0;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / n as f64
}

fn feature_row(r: &CleanedRecord) -> Vec<f64> {
    vec![
        r.open,
        r.high,
        r.low,
        r.volume,
        r.moving_avg_20,
        r.rolling_volatility,
    ]
}

fn feature_matrix<'a>(
    records: impl Iterator<Item = &'a CleanedRecord>,
) -> Result<DenseMatrix<f64>, ModelError> {
    let rows: Vec<Vec<f64>> = records.map(feature_row).collect();
    DenseMatrix::from_2d_vec(&rows).map_err(|e| ModelError::Matrix(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parse_timestamp;
    use rand::{Rng, SeedableRng};

    /// Records whose close is an exact linear function of independent features.
    fn synthetic_table(n: usize) -> CleanedTable {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let base = parse_timestamp("2024-01-01").unwrap();
        let records = (0..n)
            .map(|i| {
                let open: f64 = rng.gen_range(90.0..110.0);
                let high: f64 = rng.gen_range(100.0..120.0);
                let low: f64 = rng.gen_range(80.0..100.0);
                let volume: f64 = rng.gen_range(1_000.0..5_000.0);
                let ma: f64 = rng.gen_range(95.0..105.0);
                let vol: f64 = rng.gen_range(0.5..3.0);
                let close = 2.0 + 0.3 * open + 0.2 * high + 0.4 * low + 0.001 * volume
                    + 0.05 * ma
                    - 0.5 * vol;
                CleanedRecord {
                    timestamp: base + chrono::Duration::days(i as i64),
                    open,
                    high,
                    low,
                    close,
                    volume,
                    daily_pct_change: 0.0,
                    cumulative_return: 1.0,
                    moving_avg_20: ma,
                    rolling_volatility: vol,
                    mean_price: 0.0,
                    median_price: 0.0,
                    std_price: 0.0,
                    var_price: 0.0,
                    normalized_close: 0.0,
                    scaled_volume: 0.0,
                }
            })
            .collect();
        CleanedTable::new("JNJ", records)
    }

    #[test]
    fn fits_exact_linear_relation() {
        let table = synthetic_table(60);
        let artifact = train(&table, &TrainConfig::default()).unwrap();
        assert_eq!(artifact.test_rows, 12);
        assert_eq!(artifact.train_rows, 48);
        assert!(artifact.test_mse < 1e-6, "mse = {}", artifact.test_mse);

        let predicted = artifact.predict(&table.records[..3]).unwrap();
        for (p, r) in predicted.iter().zip(&table.records) {
            assert!((p - r.close).abs() < 1e-3);
        }
    }

    #[test]
    fn deterministic_for_fixed_seed() {
        let table = synthetic_table(40);
        let a = train(&table, &TrainConfig::default()).unwrap();
        let b = train(&table, &TrainConfig::default()).unwrap();
        assert_eq!(a.test_mse, b.test_mse);
        assert_eq!(a.seed, 42);
    }

    #[test]
    fn too_few_rows_is_insufficient_data() {
        let err = train(&synthetic_table(9), &TrainConfig::default()).unwrap_err();
        assert!(matches!(err, ModelError::InsufficientData { rows: 9, min: 10 }));
        let err = train(&CleanedTable::new("X", vec![]), &TrainConfig::default()).unwrap_err();
        assert!(matches!(err, ModelError::InsufficientData { rows: 0, .. }));
    }

    #[test]
    fn rejects_bad_test_fraction() {
        let config = TrainConfig {
            test_fraction: 1.5,
            ..TrainConfig::default()
        };
        assert!(matches!(
            train(&synthetic_table(20), &config),
            Err(ModelError::InvalidTestFraction(_))
        ));
    }

    #[test]
    fn store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path());
        let table = synthetic_table(30);
        let artifact = train(&table, &TrainConfig::default()).unwrap();

        let path = store.save(&artifact).unwrap();
        assert!(path.ends_with("JNJ_stock_price_predictor.json"));

        let loaded = store.load("JNJ").unwrap();
        assert_eq!(loaded.features, FEATURE_COLUMNS);
        assert_eq!(loaded.test_mse, artifact.test_mse);
        assert_eq!(
            loaded.predict(&table.records[..2]).unwrap(),
            artifact.predict(&table.records[..2]).unwrap()
        );
        assert!(matches!(store.load("TSLA"), Err(ModelError::NotFound(_))));
    }

    #[test]
    fn mse_basic() {
        assert_eq!(mean_squared_error(&[1.0, 2.0], &[1.0, 4.0]), 2.0);
        assert_eq!(mean_squared_error(&[], &[]), 0.0);
    }
}
