//! Page 4, Analysis: column statistics, correlation with close, best/worst days.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table};
use ratatui::Frame;

use crate::analysis::{column_summaries, return_extremes};
use crate::app::AppState;
use crate::theme;
use crate::ui::fmt_opt;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
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
        .constraints([Constraint::Length(5), Constraint::Min(4)])
        .split(area);

    let mut lines = Vec::new();
    if let (Some(first), Some(last)) = (table.first_timestamp(), table.last_timestamp()) {
        lines.push(Line::from(vec![
            Span::styled("Data range:  ", theme::muted()),
            Span::raw(format!("{} to {}  ({} records)", first.date(), last.date(), table.len())),
        ]));
    }
    if let Some(ext) = return_extremes(table) {
        lines.push(Line::from(vec![
            Span::styled("Best day:    ", theme::muted()),
            Span::styled(
                format!("{}  cumulative return {:.2}", ext.best.0.date(), ext.best.1),
                theme::positive(),
            ),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Worst day:   ", theme::muted()),
            Span::styled(
                format!("{}  cumulative return {:.2}", ext.worst.0.date(), ext.worst.1),
                theme::negative(),
            ),
        ]));
    }
    f.render_widget(Paragraph::new(lines), chunks[0]);

    let header =
        Row::new(["Column", "Mean", "Min", "Max", "Corr w/ close"]).style(theme::heading());
    let rows = column_summaries(table).into_iter().map(|s| {
        Row::new(vec![
            Cell::from(s.name),
            Cell::from(format!("{:.4}", s.mean)),
            Cell::from(format!("{:.4}", s.min)),
            Cell::from(format!("{:.4}", s.max)),
            Cell::from(Span::styled(
                fmt_opt(s.corr_with_close, 3),
                theme::correlation(s.corr_with_close),
            )),
        ])
    });
    let widths = [
        Constraint::Length(20),
        Constraint::Length(14),
        Constraint::Length(14),
        Constraint::Length(14),
        Constraint::Length(14),
    ];
    f.render_widget(Table::new(rows, widths).header(header), chunks[1]);
}
