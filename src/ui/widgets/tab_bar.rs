//! Tab bar widget.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::state::{Store, View};
use crate::ui::Theme;

/// Tab bar widget.
pub struct TabBar;

impl TabBar {
    /// Render the tab bar.
    pub fn render(frame: &mut Frame, area: Rect, store: &Store, theme: &Theme) {
        let detail_name = match &store.detail.symbol {
            Some(symbol) => format!("Detail: {symbol}"),
            None => "Detail".to_string(),
        };
        let tabs = [
            ("1", "Trending".to_string(), View::Trending),
            ("2", "Search".to_string(), View::Search),
            ("3", detail_name, View::Detail),
        ];

        let mut spans = vec![Span::raw(" ")];

        for (key, name, view) in tabs {
            let is_selected = store.app.current_view == view;

            let name_style = if is_selected {
                Style::default()
                    .fg(theme.primary)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                Style::default().fg(theme.foreground)
            };

            spans.push(Span::styled(format!("[{key}] "), theme.muted()));
            spans.push(Span::styled(name, name_style));
            spans.push(Span::raw("  "));
        }

        // Theme toggle indicator.
        spans.push(Span::styled(
            format!("[t] {:?} theme", store.app.theme_mode),
            theme.muted(),
        ));

        let paragraph = Paragraph::new(Line::from(spans)).style(theme.text());
        frame.render_widget(paragraph, area);
    }
}
