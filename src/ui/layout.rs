//! Layout management for the TUI.

use ratatui::layout::{Constraint, Direction, Layout as RatatuiLayout, Rect};

/// Width of the toast stack.
const TOAST_WIDTH: u16 = 44;

/// UI layout areas.
pub struct Layout {
    /// Status bar area (top).
    pub status_area: Rect,
    /// Tab bar area.
    pub tab_area: Rect,
    /// Main content area.
    pub main_area: Rect,
    /// Key hint line (bottom), empty when hidden.
    pub hint_area: Rect,
    /// Toast stack, overlaid on the top right of the main area.
    pub toast_area: Rect,
}

impl Layout {
    /// Create a new layout from the terminal area.
    pub fn new(area: Rect, show_status_bar: bool, show_help_bar: bool) -> Self {
        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(u16::from(show_status_bar)),
                Constraint::Length(1), // Tab bar
                Constraint::Min(0),    // Main content
                Constraint::Length(u16::from(show_help_bar)),
            ])
            .split(area);

        let main_area = chunks[2];
        let width = TOAST_WIDTH.min(main_area.width);
        let toast_area = Rect {
            x: main_area.right().saturating_sub(width),
            y: main_area.y,
            width,
            height: main_area.height,
        };

        Self {
            status_area: chunks[0],
            tab_area: chunks[1],
            main_area,
            hint_area: chunks[3],
            toast_area,
        }
    }
}

/// Create a centered popup area.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = RatatuiLayout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    RatatuiLayout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_layout_rows() {
        let layout = Layout::new(Rect::new(0, 0, 100, 30), true, true);
        assert_eq!(layout.status_area.height, 1);
        assert_eq!(layout.tab_area.y, 1);
        assert_eq!(layout.main_area.height, 27);
        assert_eq!(layout.hint_area.y, 29);
        assert_eq!(layout.toast_area.x, 100 - TOAST_WIDTH);
    }

    #[test]
    fn test_hidden_bars_free_space() {
        let layout = Layout::new(Rect::new(0, 0, 30, 10), false, false);
        assert_eq!(layout.status_area.height, 0);
        assert_eq!(layout.main_area.height, 9);
        assert_eq!(layout.toast_area.width, 30);
    }
}
