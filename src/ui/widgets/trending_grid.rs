//! Trending stocks table.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState},
};

use crate::state::Store;
use crate::ui::{Theme, format};

/// Trending stocks widget.
pub struct TrendingGrid;

impl TrendingGrid {
    /// Render the trending list.
    pub fn render(frame: &mut Frame, area: Rect, store: &Store, theme: &Theme) {
        let state = &store.trending;
        let quotes = state.quotes();

        let mut title = format!("Trending Stocks ({})", quotes.len());
        if state.is_mock() {
            title.push_str(" - mock data");
        }
        let block = theme.block(title);

        if quotes.is_empty() {
            let message = match (&state.feed.error, state.feed.loading) {
                (Some(error), _) => Line::styled(format!("Error: {error}"), Style::default().fg(theme.error)),
                (None, true) => Line::styled("Loading trending stocks...", theme.muted()),
                (None, false) => Line::styled("No trending stocks", theme.muted()),
            };
            let paragraph = Paragraph::new(message)
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(paragraph, area);
            return;
        }

        let header_cells = ["Symbol", "Name", "Price", "Change", "Change %"].iter().map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(theme.secondary)
                    .add_modifier(Modifier::BOLD),
            )
        });
        let header = Row::new(header_cells).height(1).bottom_margin(1);

        let rows = quotes.iter().map(|quote| {
            let change_style = theme.change(quote.is_up());
            let cells = vec![
                Cell::from(quote.symbol.clone()).style(Style::default().add_modifier(Modifier::BOLD)),
                Cell::from(truncate(&quote.name, 32)),
                Cell::from(format::price(quote.price, &quote.currency)),
                Cell::from(format::signed(quote.change)).style(change_style),
                Cell::from(Line::from(vec![
                    Span::raw(theme.trend_symbol(quote.is_up())),
                    Span::raw(" "),
                    Span::raw(format::percent(quote.change_percent)),
                ]))
                .style(change_style),
            ];
            Row::new(cells).height(1)
        });

        let table = Table::new(
            rows,
            [
                Constraint::Length(12),
                Constraint::Percentage(40),
                Constraint::Length(14),
                Constraint::Length(10),
                Constraint::Length(12),
            ],
        )
        .header(header)
        .block(block)
        .row_highlight_style(theme.highlight())
        .highlight_symbol(if theme.unicode { "▶ " } else { "> " });

        let mut table_state = TableState::default();
        table_state.select(state.selected_index);

        frame.render_stateful_widget(table, area, &mut table_state);
    }
}

/// Shorten to `max_len` characters, ending in "..." when cut.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("Apple Inc.", 20), "Apple Inc.");
        assert_eq!(truncate("International Business Machines", 10), "Interna...");
        assert_eq!(truncate("Société Générale SA", 10), "Société...");
    }
}
