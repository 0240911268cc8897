//! Predictor artifact persistence.
//!
//! Layout: `{model_dir}/{TICKER}_stock_price_predictor.json`

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{ModelError, PredictorArtifact};
use crate::data::write_atomic;

pub struct ModelStore {
    model_dir: PathBuf,
}

impl ModelStore {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
        }
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    pub fn path_for(&self, ticker: &str) -> PathBuf {
        self.model_dir
            .join(format!("{ticker}_stock_price_predictor.json"))
    }

    pub fn save(&self, artifact: &PredictorArtifact) -> Result<PathBuf, ModelError> {
        let path = self.path_for(&artifact.ticker);
        let json = serde_json::to_vec_pretty(artifact)?;
        write_atomic(&path, &json).map_err(|source| ModelError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "model saved");
        Ok(path)
    }

    pub fn load(&self, ticker: &str) -> Result<PredictorArtifact, ModelError> {
        let path = self.path_for(ticker);
        if !path.is_file() {
            return Err(ModelError::NotFound(ticker.to_string()));
        }
        let content = fs::read(&path).map_err(|source| ModelError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(serde_json::from_slice(&content)?)
    }
}
