//! Top-level layout: page tabs, ticker bar, active page, status bar.

pub mod analysis_page;
pub mod ingestion_page;
pub mod processing_page;
pub mod status_bar;
pub mod visualization_page;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};
use ratatui::Frame;

use crate::app::{AppState, Page, TableState};
use crate::theme;

pub fn draw(f: &mut Frame, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_tabs(f, chunks[0], app);
    draw_ticker_bar(f, chunks[1], app);
    draw_page(f, chunks[2], app);
    status_bar::render(f, chunks[3], app);
}

fn draw_tabs(f: &mut Frame, area: Rect, app: &AppState) {
    let titles: Vec<Line> = Page::ALL
        .iter()
        .map(|p| Line::from(format!("{} {}", p.index() + 1, p.label())))
        .collect();
    let tabs = Tabs::new(titles)
        .select(app.page.index())
        .style(theme::muted())
        .highlight_style(theme::heading())
        .divider(" | ");
    f.render_widget(tabs, area);
}

fn draw_ticker_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let mut spans = vec![Span::styled(" Ticker: ", theme::muted())];
    for (i, t) in app.tickers.iter().enumerate() {
        let style = if i == app.selected {
            theme::heading()
        } else if matches!(t.table, TableState::Loaded(_)) {
            theme::text()
        } else {
            theme::muted()
        };
        spans.push(Span::styled(format!(" {} ", t.symbol), style));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_page(f: &mut Frame, area: Rect, app: &AppState) {
    let title = match app.selected_ticker() {
        Some(t) => format!(" {} | {} ", app.page.label(), t.symbol),
        None => format!(" {} ", app.page.label()),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(true))
        .title(title)
        .title_style(theme::panel_title(true));
    let inner = block.inner(area);
    f.render_widget(block, area);

    match app.page {
        Page::Ingestion => ingestion_page::render(f, inner, app),
        Page::Processing => processing_page::render(f, inner, app),
        Page::Visualization => visualization_page::render(f, inner, app),
        Page::Analysis => analysis_page::render(f, inner, app),
    }
}

/// The "no data" state shared by every page.
pub fn render_no_data(f: &mut Frame, area: Rect, app: &AppState) {
    let detail = match app.selected_ticker().map(|t| &t.table) {
        Some(TableState::Unreadable(e)) => format!("Cleaned table could not be read: {e}"),
        Some(TableState::Loaded(_)) => {
            "The cleaned table is empty (fewer than 20 usable rows).".to_string()
        }
        _ => "Run `stocklens process` to produce a cleaned table for this ticker.".to_string(),
    };
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("No data available", theme::warning())),
        Line::from(""),
        Line::from(Span::styled(detail, theme::muted())),
    ];
    f.render_widget(Paragraph::new(lines), area);
}

/// Format an optional float, `-` when absent.
pub fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.precision$}"))
}
