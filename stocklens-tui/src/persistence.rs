//! Dashboard state persistence: last page and ticker, as JSON, across restarts.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::app::{AppState, Page};

#[derive(Debug, Serialize, Deserialize)]
pub struct PersistedState {
    pub page: Page,
    pub ticker: Option<String>,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            page: Page::Ingestion,
            ticker: None,
        }
    }
}

/// `<config_dir>/stocklens/state.json`, or `./stocklens/state.json` without a config dir.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stocklens")
        .join("state.json")
}

/// Returns defaults if the file is missing or corrupt.
pub fn load(path: &Path) -> PersistedState {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
        Err(_) => PersistedState::default(),
    }
}

pub fn save(path: &Path, state: &PersistedState) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(state)?)?;
    Ok(())
}

pub fn extract(app: &AppState) -> PersistedState {
    PersistedState {
        page: app.page,
        ticker: app.selected_ticker().map(|t| t.symbol.clone()),
    }
}

/// A ticker no longer in the config is ignored.
pub fn apply(app: &mut AppState, state: PersistedState) {
    app.page = state.page;
    if let Some(symbol) = state.ticker {
        app.select_symbol(&symbol);
    }
}
