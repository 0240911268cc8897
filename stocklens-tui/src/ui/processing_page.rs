//! Page 2, Processing: the selected ticker's metrics entry.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph};
use ratatui::Frame;

use stocklens_core::{MetricsEntry, ProcessingMetrics};

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let Some(ticker) = app.selected_ticker() else {
        super::render_no_data(f, area, app);
        return;
    };

    match app.selected_metrics() {
        Some(MetricsEntry::Success(m)) => render_success(f, area, &ticker.source_file, m),
        Some(MetricsEntry::Failed { error_message }) => {
            let lines = vec![
                Line::from(vec![
                    Span::styled("File: ", theme::muted()),
                    Span::raw(ticker.source_file.clone()),
                ]),
                Line::from(vec![
                    Span::styled("Status: ", theme::muted()),
                    Span::styled("failed", theme::negative()),
                ]),
                Line::from(vec![
                    Span::styled("Error: ", theme::muted()),
                    Span::styled(error_message.clone(), theme::negative()),
                ]),
            ];
            f.render_widget(Paragraph::new(lines), area);
        }
        None => {
            let msg = if app.report.is_some() {
                format!("{} is not in the metrics report.", ticker.source_file)
            } else {
                "Metrics data not available. Run `stocklens process` first.".to_string()
            };
            let lines = vec![Line::from(""), Line::from(Span::styled(msg, theme::warning()))];
            f.render_widget(Paragraph::new(lines), area);
        }
    }
}

fn render_success(f: &mut Frame, area: Rect, file: &str, m: &ProcessingMetrics) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(11), Constraint::Min(6)])
        .split(area);

    let field = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{label:<24}"), theme::muted()),
            Span::styled(value, theme::text()),
        ])
    };
    let lines = vec![
        Line::from(vec![
            Span::styled(format!("{:<24}", "Status"), theme::muted()),
            Span::styled("success", theme::positive()),
        ]),
        field("File", file.to_string()),
        field(
            "Shape",
            format!(
                "{}x{} -> {}x{}",
                m.initial_shape.rows(),
                m.initial_shape.cols(),
                m.final_shape.rows(),
                m.final_shape.cols()
            ),
        ),
        field("Rows removed", m.rows_removed().to_string()),
        field(
            "Missing values removed",
            m.missing_before.saturating_sub(m.missing_after).to_string(),
        ),
        field(
            "Duplicates removed",
            m.duplicates_before.saturating_sub(m.duplicates_after).to_string(),
        ),
        field("New features", m.new_features().to_string()),
        field("Scaling", "StandardScaler (close), MinMaxScaler (volume)".to_string()),
        field(
            "Timings",
            format!(
                "cleaning {:.3}s, transformation {:.3}s, total {:.3}s",
                m.cleaning_time, m.transformation_time, m.total_processing_time
            ),
        ),
    ];
    f.render_widget(Paragraph::new(lines), chunks[0]);

    let bars = [
        ("Missing", m.missing_before as u64),
        ("Duplicates", m.duplicates_before as u64),
        ("New features", m.new_features().max(0) as u64),
        ("Final columns", m.final_shape.cols() as u64),
    ];
    let group = BarGroup::default().bars(
        &bars
            .iter()
            .map(|(label, value)| {
                Bar::default()
                    .label(Line::from(*label))
                    .value(*value)
                    .style(theme::accent())
            })
            .collect::<Vec<_>>(),
    );
    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::TOP)
                .title(" Data quality ")
                .title_style(theme::muted()),
        )
        .data(group)
        .bar_width(14)
        .bar_gap(2)
        .value_style(theme::heading());
    f.render_widget(chart, chunks[1]);
}
