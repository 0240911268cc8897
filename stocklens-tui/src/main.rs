//! StockLens TUI: four-page terminal dashboard over the pipeline outputs.
//!
//! Pages:
//! 1. Ingestion: data range, record count, quality counts, preview
//! 2. Processing: the ticker's metrics entry and timings
//! 3. Visualization: close vs. moving average, returns, volatility
//! 4. Analysis: column statistics, correlation with close, best/worst days
//!
//! Usage: `stocklens-tui [config.toml]` (defaults to `stocklens.toml`).

mod analysis;
mod app;
mod input;
mod persistence;
mod theme;
mod ui;

#[cfg(test)]
mod test_support;

use std::io::{self, stdout};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use stocklens_runner::config::DEFAULT_CONFIG_FILE;
use stocklens_runner::PipelineConfig;

use crate::app::AppState;

fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let config = PipelineConfig::load_or_default(&config_path)
        .with_context(|| format!("failed to load config {}", config_path.display()))?;

    // Restore the terminal before printing a panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    let state_path = persistence::default_path();
    let mut app = AppState::new(config);
    persistence::apply(&mut app, persistence::load(&state_path));

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app);

    let _ = persistence::save(&state_path, &persistence::extract(&app));

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    while app.running {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }
    }
    Ok(())
}
