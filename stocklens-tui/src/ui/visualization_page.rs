//! Page 3, Visualization: four time-series charts of the selected ticker.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::symbols;
use ratatui::text::Span;
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType};
use ratatui::Frame;

use stocklens_core::CleanedTable;

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let Some(table) = app
        .selected_ticker()
        .and_then(|t| t.loaded())
        .filter(|t| !t.is_empty())
    else {
        super::render_no_data(f, area, app);
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    let close = series(table, |r| r.close);
    let ma = series(table, |r| r.moving_avg_20);
    render_chart(
        f,
        top[0],
        table,
        "Close vs 20-day MA",
        &[("close", &close, theme::ACCENT), ("20d MA", &ma, theme::WARNING)],
    );

    let pct = series(table, |r| r.daily_pct_change * 100.0);
    render_chart(f, top[1], table, "Daily % change", &[("pct", &pct, theme::NEUTRAL)]);

    let cum = series(table, |r| r.cumulative_return);
    render_chart(f, bottom[0], table, "Cumulative return", &[("cum", &cum, theme::POSITIVE)]);

    let vol = series(table, |r| r.rolling_volatility);
    let vol_line = [("vol", &vol, theme::NEGATIVE)];
    render_chart(f, bottom[1], table, "Rolling volatility (20d)", &vol_line);
}

fn series(
    table: &CleanedTable,
    value: impl Fn(&stocklens_core::CleanedRecord) -> f64,
) -> Vec<(f64, f64)> {
    table
        .records
        .iter()
        .enumerate()
        .map(|(i, r)| (i as f64, value(r)))
        .collect()
}

/// Y bounds over every series, padded 5%.
pub fn y_bounds(series: &[&[(f64, f64)]]) -> [f64; 2] {
    let (lo, hi) = series
        .iter()
        .flat_map(|s| s.iter().map(|p| p.1))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| (lo.min(y), hi.max(y)));
    if !lo.is_finite() || !hi.is_finite() {
        return [0.0, 1.0];
    }
    let pad = ((hi - lo).abs() * 0.05).max(1e-9);
    [lo - pad, hi + pad]
}

fn render_chart(
    f: &mut Frame,
    area: Rect,
    table: &CleanedTable,
    title: &str,
    lines: &[(&str, &Vec<(f64, f64)>, Color)],
) {
    let datasets: Vec<Dataset> = lines
        .iter()
        .map(|(name, data, color)| {
            Dataset::default()
                .name(*name)
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(*color))
                .data(data)
        })
        .collect();

    let slices: Vec<&[(f64, f64)]> = lines.iter().map(|(_, d, _)| d.as_slice()).collect();
    let [y_min, y_max] = y_bounds(&slices);
    let x_max = table.len().saturating_sub(1).max(1) as f64;

    let first = table
        .first_timestamp()
        .map(|t| t.date().to_string())
        .unwrap_or_default();
    let last = table
        .last_timestamp()
        .map(|t| t.date().to_string())
        .unwrap_or_default();

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme::muted())
                .title(format!(" {title} "))
                .title_style(theme::accent()),
        )
        .x_axis(
            Axis::default()
                .style(theme::muted())
                .bounds([0.0, x_max])
                .labels(vec![
                    Span::styled(first, theme::muted()),
                    Span::styled(last, theme::muted()),
                ]),
        )
        .y_axis(
            Axis::default()
                .style(theme::muted())
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::styled(format!("{y_min:.2}"), theme::muted()),
                    Span::styled(format!("{y_max:.2}"), theme::muted()),
                ]),
        );
    f.render_widget(chart, area);
}
