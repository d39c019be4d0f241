//! Search box, region selector and results.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState},
};

use super::trending_grid::truncate;
use crate::state::{DataSource, Region, Store};
use crate::ui::Theme;

/// Search view widget.
pub struct SearchPanel;

impl SearchPanel {
    /// Render the search view.
    pub fn render(frame: &mut Frame, area: Rect, store: &Store, theme: &Theme) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(area);

        Self::render_input(frame, chunks[0], store, theme);
        Self::render_regions(frame, chunks[1], store, theme);
        Self::render_results(frame, chunks[2], store, theme);
    }

    fn render_input(frame: &mut Frame, area: Rect, store: &Store, theme: &Theme) {
        let editing = store.app.is_editing();
        let block = theme.block("Search").border_style(if editing {
            Style::default().fg(theme.accent)
        } else {
            Style::default().fg(theme.border)
        });

        let text = if editing {
            store.app.input_buffer.as_str()
        } else {
            store.search.query.as_str()
        };
        let line = if text.is_empty() && !editing {
            Line::styled("Press / to search by symbol or company name", theme.muted())
        } else {
            Line::raw(text)
        };

        let inner = block.inner(area);
        frame.render_widget(Paragraph::new(line).block(block), area);

        if editing {
            let offset = u16::try_from(store.app.cursor_position).unwrap_or(u16::MAX);
            let x = inner.x.saturating_add(offset).min(inner.right().saturating_sub(1));
            frame.set_cursor_position(Position::new(x, inner.y));
        }
    }

    fn render_regions(frame: &mut Frame, area: Rect, store: &Store, theme: &Theme) {
        let search = &store.search;
        let focused = search.focused_region();
        let (on, off) = if theme.unicode { ("■", "□") } else { ("[x]", "[ ]") };

        let mut spans = Vec::with_capacity(Region::ALL.len() * 2);
        for region in Region::ALL {
            let marker = if search.is_selected(region) { on } else { off };
            let mut style = if search.is_selected(region) {
                Style::default().fg(theme.primary)
            } else {
                theme.muted()
            };
            if region == focused {
                style = style.add_modifier(Modifier::REVERSED);
            }
            spans.push(Span::styled(format!("{marker} {}", region.id()), style));
            spans.push(Span::raw("  "));
        }

        let block = theme.block("Regions (Tab: next, Space: toggle)");
        frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
    }

    fn render_results(frame: &mut Frame, area: Rect, store: &Store, theme: &Theme) {
        let search = &store.search;

        let mut title = format!("Results ({})", search.results.len());
        if search.source == Some(DataSource::Mock) && !search.results.is_empty() {
            title.push_str(" - mock data");
        }
        let block = theme.block(title);

        let message = if search.loading {
            Some(Line::styled("Searching...", theme.muted()))
        } else if let Some(error) = &search.error {
            Some(Line::styled(format!("Error: {error}"), Style::default().fg(theme.error)))
        } else if search.query.trim().is_empty() {
            Some(Line::styled("Type to search", theme.muted()))
        } else if search.results.is_empty() && search.results_query.is_some() {
            Some(Line::styled(
                format!("No results found for \"{}\"", search.query.trim()),
                theme.muted(),
            ))
        } else {
            None
        };

        if let Some(message) = message.filter(|_| search.results.is_empty() || search.loading) {
            let paragraph = Paragraph::new(message)
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(paragraph, area);
            return;
        }

        let header_cells = ["Symbol", "Name", "Exchange", "Region", "Type"].iter().map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(theme.secondary)
                    .add_modifier(Modifier::BOLD),
            )
        });
        let header = Row::new(header_cells).height(1).bottom_margin(1);

        let rows = search.results.iter().map(|result| {
            Row::new(vec![
                Cell::from(result.symbol.clone()).style(Style::default().add_modifier(Modifier::BOLD)),
                Cell::from(truncate(&result.name, 36)),
                Cell::from(result.exchange.clone()),
                Cell::from(result.region.id()),
                Cell::from(result.kind.clone()),
            ])
        });

        let table = Table::new(
            rows,
            [
                Constraint::Length(12),
                Constraint::Percentage(45),
                Constraint::Length(10),
                Constraint::Length(8),
                Constraint::Length(10),
            ],
        )
        .header(header)
        .block(block)
        .row_highlight_style(theme.highlight())
        .highlight_symbol(if theme.unicode { "▶ " } else { "> " });

        let mut table_state = TableState::default();
        table_state.select(search.selected_index);
        frame.render_stateful_widget(table, area, &mut table_state);
    }
}
