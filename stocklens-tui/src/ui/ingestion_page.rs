//! Page 1, Ingestion: per-ticker data range, record count, quality counts, preview.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table};
use ratatui::Frame;

use crate::analysis::quality;
use crate::app::{AppState, TableState};
use crate::theme;

const PREVIEW_ROWS: usize = 5;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(app.tickers.len() as u16 + 2),
            Constraint::Length(1),
            Constraint::Min(3),
        ])
        .split(area);

    render_overview(f, chunks[0], app);
    render_preview(f, chunks[2], app);
}

fn render_overview(f: &mut Frame, area: Rect, app: &AppState) {
    let header = Row::new(["Ticker", "File", "Records", "Range", "Missing", "Duplicates"])
        .style(theme::heading());

    let rows = app.tickers.iter().enumerate().map(|(i, t)| {
        let style = if i == app.selected {
            theme::accent()
        } else {
            theme::text()
        };
        let cells: Vec<Cell> = match &t.table {
            TableState::Loaded(table) => {
                let q = quality(table);
                let range = match (table.first_timestamp(), table.last_timestamp()) {
                    (Some(a), Some(b)) => format!("{} .. {}", a.date(), b.date()),
                    _ => "empty".to_string(),
                };
                vec![
                    Cell::from(t.symbol.clone()),
                    Cell::from(t.source_file.clone()),
                    Cell::from(q.records.to_string()),
                    Cell::from(range),
                    Cell::from(q.missing.to_string()),
                    Cell::from(q.duplicates.to_string()),
                ]
            }
            TableState::Missing => vec![
                Cell::from(t.symbol.clone()),
                Cell::from(t.source_file.clone()),
                Cell::from(Span::styled("No data available", theme::warning())),
            ],
            TableState::Unreadable(_) => vec![
                Cell::from(t.symbol.clone()),
                Cell::from(t.source_file.clone()),
                Cell::from(Span::styled("unreadable", theme::negative())),
            ],
        };
        Row::new(cells).style(style)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(7),
            Constraint::Length(24),
            Constraint::Length(8),
            Constraint::Length(26),
            Constraint::Length(8),
            Constraint::Length(10),
        ],
    )
    .header(header);
    f.render_widget(table, area);
}

fn render_preview(f: &mut Frame, area: Rect, app: &AppState) {
    let Some(table) = app
        .selected_ticker()
        .and_then(|t| t.loaded())
        .filter(|t| !t.is_empty())
    else {
        super::render_no_data(f, area, app);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(2)])
        .split(area);

    let mut title = vec![Span::styled(
        format!("First {PREVIEW_ROWS} rows of {}", table.ticker),
        theme::heading(),
    )];
    if let Some(meta) = app.selected_ticker().and_then(|t| t.meta.as_ref()) {
        title.push(Span::styled(
            format!("  written {}  hash {:.12}", meta.written_at, meta.data_hash),
            theme::muted(),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(title)), chunks[0]);

    let header = Row::new(["timestamp", "open", "high", "low", "close", "volume", "pct", "ma20"])
        .style(theme::muted());
    let rows = table.records.iter().take(PREVIEW_ROWS).map(|r| {
        Row::new(vec![
            Cell::from(r.timestamp.date().to_string()),
            Cell::from(format!("{:.2}", r.open)),
            Cell::from(format!("{:.2}", r.high)),
            Cell::from(format!("{:.2}", r.low)),
            Cell::from(format!("{:.2}", r.close)),
            Cell::from(format!("{:.0}", r.volume)),
            Cell::from(Span::styled(
                format!("{:+.2}%", r.daily_pct_change * 100.0),
                theme::signed(r.daily_pct_change),
            )),
            Cell::from(format!("{:.2}", r.moving_avg_20)),
        ])
    });
    let widths = [
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(12),
        Constraint::Length(9),
        Constraint::Length(10),
    ];
    f.render_widget(Table::new(rows, widths).header(header), chunks[1]);
}
