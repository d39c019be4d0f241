//! UI rendering using ratatui.
//!
//! Widgets are pure functions of the store and the active theme.

pub mod format;
mod layout;
mod theme;
mod widgets;

pub use layout::Layout;
pub use theme::Theme;
pub use widgets::{
    FeedStatus, HelpPanel, SearchPanel, StatusBar, StockChart, StockDetailsPanel, TabBar,
    TrendingGrid,
};

use crate::config::UiConfig;
use crate::events::Keymap;
use crate::state::{Store, View};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout as RatatuiLayout, Rect};
use ratatui::widgets::{Block, Paragraph};

/// Main UI renderer.
pub struct Ui;

impl Ui {
    /// Render the entire UI.
    pub fn render(frame: &mut Frame, store: &Store, theme: &Theme, keymap: &Keymap, ui: &UiConfig) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme.text()), area);

        let layout = Layout::new(area, ui.show_status_bar, ui.show_help_bar);

        if ui.show_status_bar {
            StatusBar::render(frame, layout.status_area, store, theme);
        }
        TabBar::render(frame, layout.tab_area, store, theme);

        match store.app.current_view {
            View::Trending => TrendingGrid::render(frame, layout.main_area, store, theme),
            View::Search => SearchPanel::render(frame, layout.main_area, store, theme),
            View::Detail => Self::render_detail(frame, layout.main_area, store, theme),
        }

        if ui.show_help_bar {
            frame.render_widget(
                Paragraph::new(widgets::hint_line(keymap, theme)),
                layout.hint_area,
            );
        }

        if store.app.show_help {
            HelpPanel::render(frame, area, keymap, theme);
        }

        widgets::render_toasts(frame, layout.toast_area, &store.app.toasts, theme);

        if let Some(error) = &store.app.error {
            let error_area = layout::centered_rect(60, 20, layout.main_area);
            widgets::render_error(frame, error_area, error, theme);
        }
    }

    fn render_detail(frame: &mut Frame, area: Rect, store: &Store, theme: &Theme) {
        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(9), Constraint::Min(8)])
            .split(area);

        StockDetailsPanel::render(frame, chunks[0], store, theme);
        StockChart::render(frame, chunks[1], store, theme);
    }
}
