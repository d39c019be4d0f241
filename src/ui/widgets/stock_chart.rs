//! Price history chart with a time range selector.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Chart, Dataset, GraphType, Paragraph},
};

use crate::state::{PriceHistory, Store, TimeRange};
use crate::ui::{Theme, format};

/// Price chart widget.
pub struct StockChart;

impl StockChart {
    /// Render the chart of the open symbol.
    pub fn render(frame: &mut Frame, area: Rect, store: &Store, theme: &Theme) {
        let detail = &store.detail;

        let mut title = format!("Price History ({})", detail.time_range.label());
        if detail.history.data().is_some_and(|h| h.is_mock()) {
            title.push_str(" - mock data");
        }
        if let Some(change) = detail.history().and_then(PriceHistory::change_percent) {
            title.push_str(&format!(" {}", format::percent(change)));
        }
        let block = theme.block(title);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(inner);

        frame.render_widget(
            Paragraph::new(range_selector(detail.time_range, theme)),
            rows[0],
        );

        match detail.history().filter(|h| !h.is_empty()) {
            Some(history) => render_chart(frame, rows[1], history, theme),
            None => {
                let message = match (&detail.history.error, detail.history.loading) {
                    (Some(error), _) => {
                        Line::styled(format!("Error: {error}"), Style::default().fg(theme.error))
                    }
                    (None, true) => Line::styled("Loading chart...", theme.muted()),
                    (None, false) => Line::styled("No historical data available", theme.muted()),
                };
                frame.render_widget(
                    Paragraph::new(message).alignment(Alignment::Center),
                    rows[1],
                );
            }
        }
    }
}

fn range_selector(current: TimeRange, theme: &Theme) -> Line<'static> {
    let mut spans = vec![Span::styled("h/l ", theme.muted())];
    for range in TimeRange::ALL {
        let style = if range == current {
            Style::default()
                .fg(theme.background)
                .bg(theme.primary)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.foreground)
        };
        spans.push(Span::styled(format!(" {} ", range.label()), style));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

fn render_chart(frame: &mut Frame, area: Rect, history: &PriceHistory, theme: &Theme) {
    let data = history.chart_points();
    let (min_y, max_y) = y_bounds(history);
    let max_x = data.len().saturating_sub(1).max(1) as f64;

    let is_up = history
        .change_percent()
        .is_none_or(|c| !c.is_sign_negative());

    let datasets = vec![
        Dataset::default()
            .name(history.symbol.clone())
            .marker(if theme.unicode {
                symbols::Marker::Braille
            } else {
                symbols::Marker::Dot
            })
            .graph_type(GraphType::Line)
            .style(theme.change(is_up))
            .data(&data),
    ];

    let first = history.points.first().map(|p| p.label.clone()).unwrap_or_default();
    let last = history.points.last().map(|p| p.label.clone()).unwrap_or_default();

    let chart = Chart::new(datasets)
        .style(theme.text())
        .x_axis(
            Axis::default()
                .style(theme.muted())
                .bounds([0.0, max_x])
                .labels(vec![Span::raw(first), Span::raw(last)]),
        )
        .y_axis(
            Axis::default()
                .style(theme.muted())
                .bounds([min_y, max_y])
                .labels(vec![
                    Span::raw(format::axis(min_y)),
                    Span::raw(format::axis((min_y + max_y) / 2.0)),
                    Span::raw(format::axis(max_y)),
                ]),
        );

    frame.render_widget(chart, area);
}

/// Y axis bounds with a little headroom; flat series get a band around the price.
fn y_bounds(history: &PriceHistory) -> (f64, f64) {
    let min = history.min_price().map(format::to_f64).unwrap_or_default();
    let max = history.max_price().map(format::to_f64).unwrap_or_default();
    let pad = if max > min { (max - min) * 0.05 } else { (max.abs() * 0.01).max(1.0) };
    ((min - pad).max(0.0), max + pad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PricePoint;
    use rust_decimal_macros::dec;

    fn history(prices: &[rust_decimal::Decimal]) -> PriceHistory {
        PriceHistory {
            symbol: "MSFT".to_string(),
            range: TimeRange::OneDay,
            points: prices
                .iter()
                .map(|p| PricePoint {
                    label: "t".to_string(),
                    price: *p,
                })
                .collect(),
        }
    }

    #[test]
    fn test_bounds_pad_the_series() {
        let (low, high) = y_bounds(&history(&[dec!(100), dec!(120)]));
        assert!(low < 100.0 && low >= 98.0);
        assert!(high > 120.0 && high <= 122.0);
    }

    #[test]
    fn test_flat_series_gets_a_band() {
        let (low, high) = y_bounds(&history(&[dec!(50), dec!(50)]));
        assert!(low < 50.0);
        assert!(high > 50.0);
    }
}
