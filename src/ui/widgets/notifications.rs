//! Toast and error rendering.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

use crate::state::{Toast, ToastLevel, Toasts};
use crate::ui::Theme;

/// Rows taken by one toast, borders included.
const TOAST_HEIGHT: u16 = 3;

/// Render the toast stack, newest at the top.
pub fn render_toasts(frame: &mut Frame, area: Rect, toasts: &Toasts, theme: &Theme) {
    let mut y = area.y;
    for toast in toasts.iter().rev() {
        if y + TOAST_HEIGHT > area.bottom() {
            break;
        }
        let toast_area = Rect {
            x: area.x,
            y,
            width: area.width,
            height: TOAST_HEIGHT,
        };
        render_toast(frame, toast_area, toast, theme);
        y += TOAST_HEIGHT;
    }
}

fn render_toast(frame: &mut Frame, area: Rect, toast: &Toast, theme: &Theme) {
    frame.render_widget(Clear, area);

    let (color, icon) = level_style(toast.level, theme);
    let content = Line::from(vec![
        Span::styled(format!("{icon} "), Style::default().fg(color)),
        Span::raw(toast.message.as_str()),
    ]);

    let paragraph = Paragraph::new(content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(color)),
        )
        .style(theme.text());

    frame.render_widget(paragraph, area);
}

fn level_style(level: ToastLevel, theme: &Theme) -> (Color, &'static str) {
    match (level, theme.unicode) {
        (ToastLevel::Info, true) => (theme.primary, "ℹ"),
        (ToastLevel::Success, true) => (theme.success, "✓"),
        (ToastLevel::Warning, true) => (theme.warning, "⚠"),
        (ToastLevel::Error, true) => (theme.error, "✗"),
        (ToastLevel::Offline, true) => (theme.muted, "⊘"),
        (ToastLevel::Info, false) => (theme.primary, "i"),
        (ToastLevel::Success, false) => (theme.success, "+"),
        (ToastLevel::Warning, false) => (theme.warning, "!"),
        (ToastLevel::Error, false) => (theme.error, "x"),
        (ToastLevel::Offline, false) => (theme.muted, "o"),
    }
}

/// Render an error popup.
pub fn render_error(frame: &mut Frame, area: Rect, error: &str, theme: &Theme) {
    frame.render_widget(Clear, area);

    let content = Line::from(vec![
        Span::styled(
            "Error: ",
            Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
        ),
        Span::raw(error),
    ]);

    let paragraph = Paragraph::new(content)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.error)),
        )
        .style(theme.text());

    frame.render_widget(paragraph, area);
}
