//! Quote details panel.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};

use crate::state::{StockDetails, Store};
use crate::ui::{Theme, format};

/// Stock details widget.
pub struct StockDetailsPanel;

impl StockDetailsPanel {
    /// Render the details of the open symbol.
    pub fn render(frame: &mut Frame, area: Rect, store: &Store, theme: &Theme) {
        let detail = &store.detail;
        let symbol = detail.symbol.as_deref().unwrap_or("-");

        let Some(details) = detail.details() else {
            let message = match (&detail.details.error, detail.details.loading) {
                (Some(error), _) => Line::styled(format!("Error: {error}"), Style::default().fg(theme.error)),
                _ => Line::styled(format!("Loading {symbol}..."), theme.muted()),
            };
            let paragraph = Paragraph::new(message)
                .alignment(Alignment::Center)
                .block(theme.block(symbol));
            frame.render_widget(paragraph, area);
            return;
        };

        let mut title = format!("{} ({})", details.name, details.symbol);
        if detail.details.data().is_some_and(|d| d.is_mock()) {
            title.push_str(" - mock data");
        }
        let block = theme.block(title);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(0)])
            .split(inner);

        frame.render_widget(Paragraph::new(headline(details, theme)), rows[0]);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 3); 3])
            .split(rows[1]);

        let stats = stats(details);
        for (column, chunk) in columns.iter().zip(stats.chunks(3)) {
            let lines: Vec<Line> = chunk
                .iter()
                .map(|(label, value)| {
                    Line::from(vec![
                        Span::styled(format!("{label:<15}"), theme.muted()),
                        Span::raw(value.clone()),
                    ])
                })
                .collect();
            frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), *column);
        }
    }
}

fn headline(details: &StockDetails, theme: &Theme) -> Vec<Line<'static>> {
    let change_style = theme.change(details.is_up()).add_modifier(Modifier::BOLD);
    vec![
        Line::from(vec![
            Span::styled(
                format::price(details.price, &details.currency),
                Style::default()
                    .fg(theme.foreground)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                format!(
                    "{} {}",
                    theme.trend_symbol(details.is_up()),
                    format::change(details.change, details.change_percent)
                ),
                change_style,
            ),
        ]),
        Line::styled(
            format!("{} | {} | {}", details.exchange, details.region.name(), details.currency),
            theme.muted(),
        ),
    ]
}

fn stats(details: &StockDetails) -> Vec<(&'static str, String)> {
    vec![
        ("Previous close", format!("{:.2}", details.previous_close.round_dp(2))),
        ("Open", format!("{:.2}", details.open.round_dp(2))),
        ("Day range", format::range(details.day_low, details.day_high)),
        ("Volume", format::volume(details.volume)),
        ("Market cap", format::market_cap(details.market_cap)),
        ("52w range", format::range(details.year_low, details.year_high)),
        ("P/E ratio", format::ratio(details.pe_ratio)),
        ("Dividend yield", format::fraction_percent(details.dividend_yield)),
    ]
}
