//! Run configuration (`stocklens.toml`).
//!
//! ```toml
//! [paths]
//! input_dir = "data"
//! output_dir = "cleaned_data"
//! model_dir = "models"
//! report_path = "metrics.json"
//!
//! [model]
//! seed = 42
//! test_fraction = 0.2
//!
//! [[tickers]]
//! symbol = "JNJ"
//! file = "JNJ_TATA_data.csv"
//! ```
//!
//! Every section is optional; omitted values fall back to the built-in defaults.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use stocklens_core::model::TrainConfig;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "stocklens.toml";

const DEFAULT_SYMBOLS: &[&str] = &["JNJ", "TSLA", "TTM", "WMT"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("no tickers configured")]
    NoTickers,

    #[error("ticker '{0}' is configured more than once")]
    DuplicateTicker(String),

    #[error("invalid test fraction {0}: must be in (0, 1)")]
    TestFraction(f64),
}

/// Where inputs are read from and outputs written to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub model_dir: PathBuf,
    pub report_path: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("cleaned_data"),
            model_dir: PathBuf::from("models"),
            report_path: PathBuf::from("metrics.json"),
        }
    }
}

/// One ticker and its raw file name inside `input_dir`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerSpec {
    pub symbol: String,
    pub file: String,
}

impl TickerSpec {
    /// `<SYMBOL>_TATA_data.csv`
    pub fn with_default_file(symbol: &str) -> Self {
        let symbol = symbol.to_ascii_uppercase();
        Self {
            file: default_file_name(&symbol),
            symbol,
        }
    }
}

pub fn default_file_name(symbol: &str) -> String {
    format!("{}_TATA_data.csv", symbol.to_ascii_uppercase())
}

fn default_tickers() -> Vec<TickerSpec> {
    DEFAULT_SYMBOLS
        .iter()
        .map(|s| TickerSpec::with_default_file(s))
        .collect()
}

/// The complete run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub model: TrainConfig,
    #[serde(default = "default_tickers")]
    pub tickers: Vec<TickerSpec>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            model: TrainConfig::default(),
            tickers: default_tickers(),
        }
    }
}

impl PipelineConfig {
    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate TOML.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise the built-in defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.is_file() {
            Self::from_file(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tickers.is_empty() {
            return Err(ConfigError::NoTickers);
        }
        let mut seen = HashSet::new();
        for t in &self.tickers {
            if !seen.insert(t.symbol.to_ascii_uppercase()) {
                return Err(ConfigError::DuplicateTicker(t.symbol.clone()));
            }
        }
        let f = self.model.test_fraction;
        if !(f > 0.0 && f < 1.0) {
            return Err(ConfigError::TestFraction(f));
        }
        Ok(())
    }

    /// Case-insensitive ticker lookup.
    pub fn ticker(&self, symbol: &str) -> Option<&TickerSpec> {
        self.tickers
            .iter()
            .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
    }

    pub fn input_path(&self, ticker: &TickerSpec) -> PathBuf {
        self.paths.input_dir.join(&ticker.file)
    }

    /// Keep only the named tickers (case-insensitive). Unknown names get the default file name.
    pub fn select(&mut self, symbols: &[String]) {
        if symbols.is_empty() {
            return;
        }
        self.tickers = symbols
            .iter()
            .map(|s| {
                self.ticker(s)
                    .cloned()
                    .unwrap_or_else(|| TickerSpec::with_default_file(s))
            })
            .collect();
    }
}
