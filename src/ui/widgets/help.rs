//! Help panel widget.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Clear, Paragraph},
};

use super::super::layout::centered_rect;
use crate::events::Keymap;
use crate::ui::Theme;

/// Help panel showing keybindings.
pub struct HelpPanel;

impl HelpPanel {
    /// Render the help panel.
    pub fn render(frame: &mut Frame, area: Rect, keymap: &Keymap, theme: &Theme) {
        let popup_area = centered_rect(60, 80, area);

        // Clear the area behind the popup
        frame.render_widget(Clear, popup_area);

        let sections: [(&str, Vec<(String, &str)>); 4] = [
            (
                "Navigation",
                vec![
                    (format!("{}/Down", keymap.down), "Move down"),
                    (format!("{}/Up", keymap.up), "Move up"),
                    ("Home/End".to_string(), "First/last row"),
                    ("PgUp/PgDn".to_string(), "Page up/down"),
                    (keymap.select.to_string(), "Open stock details"),
                    (keymap.back.to_string(), "Back"),
                ],
            ),
            (
                "Views",
                vec![
                    (keymap.trending.to_string(), "Trending stocks"),
                    (keymap.search_view.to_string(), "Search"),
                    (keymap.detail.to_string(), "Stock details"),
                ],
            ),
            (
                "Search and chart",
                vec![
                    (keymap.search.to_string(), "Edit search query"),
                    ("Tab".to_string(), "Next region"),
                    ("Space".to_string(), "Toggle region"),
                    (format!("{}/{}", keymap.left, keymap.right), "Previous/next time range"),
                ],
            ),
            (
                "Actions",
                vec![
                    (keymap.refresh.to_string(), "Refresh now"),
                    (keymap.auto_refresh.to_string(), "Pause/resume auto-refresh"),
                    (keymap.theme.to_string(), "Toggle dark/light theme"),
                    (keymap.dismiss.to_string(), "Dismiss notification"),
                    (keymap.help.to_string(), "Toggle help"),
                    (keymap.quit.to_string(), "Quit"),
                ],
            ),
        ];

        let mut lines = Vec::new();
        for (i, (title, entries)) in sections.into_iter().enumerate() {
            if i > 0 {
                lines.push(Line::from(""));
            }
            lines.push(Line::styled(title, theme.heading()));
            for (key, description) in entries {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {key:<12}"), theme.key()),
                    Span::raw(description),
                ]));
            }
        }

        let help = Paragraph::new(lines).block(theme.block("Help"));
        frame.render_widget(help, popup_area);
    }
}

/// One-line key reminder for the bottom of the screen.
pub fn hint_line(keymap: &Keymap, theme: &Theme) -> Line<'static> {
    let pairs = [
        (keymap.help.to_string(), "help"),
        (keymap.search.to_string(), "search"),
        (keymap.refresh.to_string(), "refresh"),
        (keymap.auto_refresh.to_string(), "auto-refresh"),
        (keymap.theme.to_string(), "theme"),
        (keymap.quit.to_string(), "quit"),
    ];
    let mut spans = Vec::with_capacity(pairs.len() * 2);
    for (key, label) in pairs {
        spans.push(Span::styled(format!(" {key}"), theme.key()));
        spans.push(Span::styled(format!(" {label} "), theme.muted()));
    }
    Line::from(spans)
}
