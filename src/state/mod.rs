//! State management for stockwatch.
//!
//! This module provides centralized state management with a unidirectional
//! data flow pattern inspired by Redux/Elm architecture. Pollers and the
//! search task publish their results as actions; the reducer folds them
//! into the store that the UI renders from.

mod app_state;
mod detail_state;
mod search_state;
mod source;
mod toast_state;
mod trending_state;

pub use app_state::{AppState, InputMode, ThemeMode, View};
pub use detail_state::{DetailState, PriceHistory, PricePoint, StockDetails, TimeRange};
pub use search_state::{Region, SearchResult, SearchState};
pub use source::{DataSource, Fetched};
pub use toast_state::{Toast, ToastLevel, Toasts};
pub use trending_state::{StockQuote, TrendingState, preserve_order};

use crate::connectivity::ConnectivityStatus;
use crate::error::Result;
use crate::refresh::RefreshState;
use std::time::Instant;
use tokio::sync::mpsc;

/// Actions that can be dispatched to modify state.
#[derive(Debug, Clone)]
pub enum Action {
    // Navigation
    SetView(View),
    SetInputMode(InputMode),
    OpenDetail(String),
    Back,

    // Trending
    TrendingUpdated(RefreshState<Fetched<Vec<StockQuote>>>),

    // Detail
    DetailsUpdated(RefreshState<Fetched<StockDetails>>),
    HistoryUpdated(RefreshState<Fetched<PriceHistory>>),
    SetTimeRange(TimeRange),
    NextTimeRange,
    PrevTimeRange,

    // Search
    InputChar(char),
    InputBackspace,
    InputCursorLeft,
    InputCursorRight,
    SubmitSearch,
    CancelSearch,
    SearchStarted(String),
    SearchResultsLoaded {
        query: String,
        results: Fetched<Vec<SearchResult>>,
    },
    SearchFailed {
        query: String,
        error: String,
    },
    FocusNextRegion,
    ToggleFocusedRegion,

    // UI actions
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    GoToTop,
    GoToBottom,
    ToggleHelp,
    ToggleTheme,
    ShowToast(Toast),
    DismissToast,
    ExpireToasts,

    // Data refresh
    RefreshAll,
    ToggleAutoRefresh,
    AutoRefreshChanged(bool),

    // Connectivity
    ConnectivityChanged(ConnectivityStatus),

    // Error handling
    SetError(String),
    ClearError,

    // Quit
    Quit,
}

/// The global state store.
#[derive(Debug)]
pub struct Store {
    /// Application state.
    pub app: AppState,
    /// Trending view state.
    pub trending: TrendingState,
    /// Search view state.
    pub search: SearchState,
    /// Detail view state.
    pub detail: DetailState,
    /// Action sender for dispatching actions.
    action_tx: mpsc::UnboundedSender<Action>,
}

impl Store {
    /// Create a new store with the given action sender.
    pub fn new(action_tx: mpsc::UnboundedSender<Action>) -> Self {
        Self {
            app: AppState::new(ThemeMode::default()),
            trending: TrendingState::default(),
            search: SearchState::default(),
            detail: DetailState::default(),
            action_tx,
        }
    }

    /// Dispatch an action to the store.
    pub fn dispatch(&self, action: Action) -> Result<()> {
        self.action_tx
            .send(action)
            .map_err(|e| crate::Error::channel(e.to_string()))
    }

    /// Symbol under the selection in the current list view.
    pub fn selection_symbol(&self) -> Option<String> {
        match self.app.current_view {
            View::Trending => self.trending.selected_quote().map(|q| q.symbol.clone()),
            View::Search => self.search.selected_result().map(|r| r.symbol.clone()),
            View::Detail => None,
        }
    }

    /// Apply an action to update state.
    pub fn reduce(&mut self, action: Action) {
        match action {
            // Navigation
            Action::SetView(view) => self.set_view(view),
            Action::SetInputMode(mode) => {
                self.app.input_mode = mode;
                if mode == InputMode::Search {
                    self.set_view(View::Search);
                    self.app.input_buffer = self.search.query.clone();
                    self.app.cursor_position = self.app.input_buffer.chars().count();
                }
            }
            Action::OpenDetail(symbol) => {
                let symbol = symbol.trim().to_uppercase();
                if symbol.is_empty() {
                    return;
                }
                self.detail.open(symbol);
                self.set_view(View::Detail);
                self.app.input_mode = InputMode::Normal;
            }
            Action::Back => {
                if self.app.show_help {
                    self.app.show_help = false;
                } else if self.app.current_view == View::Detail {
                    let target = self.app.previous_view.take().unwrap_or_default();
                    self.app.current_view = target;
                }
            }

            // Trending
            Action::TrendingUpdated(feed) => {
                self.trending.feed = feed;
                self.trending.clamp_selection();
            }

            // Detail
            Action::DetailsUpdated(details) => self.detail.details = details,
            Action::HistoryUpdated(history) => self.detail.history = history,
            Action::SetTimeRange(range) => self.detail.time_range = range,
            Action::NextTimeRange => self.detail.time_range = self.detail.time_range.next(),
            Action::PrevTimeRange => self.detail.time_range = self.detail.time_range.prev(),

            // Search
            Action::InputChar(c) => {
                self.app.push_char(c);
                self.sync_query();
            }
            Action::InputBackspace => {
                self.app.pop_char();
                self.sync_query();
            }
            Action::InputCursorLeft => self.app.cursor_left(),
            Action::InputCursorRight => self.app.cursor_right(),
            Action::SubmitSearch => self.app.input_mode = InputMode::Normal,
            Action::CancelSearch => {
                self.app.input_mode = InputMode::Normal;
                self.app.clear_input();
                self.search.clear();
            }
            Action::SearchStarted(query) => {
                if query == self.search.query {
                    self.search.loading = true;
                }
            }
            Action::SearchResultsLoaded { query, results } => {
                let source = results.source;
                self.search.apply_results(&query, results.value, source);
            }
            Action::SearchFailed { query, error } => {
                if query == self.search.query {
                    self.search.loading = false;
                    self.search.results.clear();
                    self.search.selected_index = None;
                    self.search.error = Some(error);
                }
            }
            Action::FocusNextRegion => self.search.focus_next_region(),
            Action::ToggleFocusedRegion => {
                let region = self.search.focused_region();
                self.search.toggle_region(region);
            }

            // UI actions
            Action::ScrollUp => self.scroll(-1),
            Action::ScrollDown => self.scroll(1),
            Action::PageUp => self.scroll(-10),
            Action::PageDown => self.scroll(10),
            Action::GoToTop => self.go_to_top(),
            Action::GoToBottom => self.go_to_bottom(),
            Action::ToggleHelp => self.app.show_help = !self.app.show_help,
            Action::ToggleTheme => self.app.theme_mode = self.app.theme_mode.toggled(),
            Action::ShowToast(toast) => {
                self.app.toasts.push(toast);
            }
            Action::DismissToast => {
                self.app.toasts.dismiss_latest();
            }
            Action::ExpireToasts => {
                self.app.toasts.expire(Instant::now());
            }

            // Data refresh
            Action::RefreshAll | Action::ToggleAutoRefresh => {}
            Action::AutoRefreshChanged(enabled) => self.app.auto_refresh = enabled,

            // Connectivity
            Action::ConnectivityChanged(status) => {
                self.app.offline = status.offline;
                self.app.was_offline = status.was_offline;
            }

            // Error handling
            Action::SetError(error) => {
                self.app.error = Some(error);
            }
            Action::ClearError => {
                self.app.error = None;
            }

            // Quit
            Action::Quit => {
                self.app.should_quit = true;
            }
        }
    }

    fn set_view(&mut self, view: View) {
        if view == View::Detail && self.detail.symbol.is_none() {
            return;
        }
        if view == View::Detail && self.app.current_view != View::Detail {
            self.app.previous_view = Some(self.app.current_view);
        }
        self.app.current_view = view;
        if view != View::Search {
            self.app.input_mode = InputMode::Normal;
        }
    }

    fn sync_query(&mut self) {
        if self.app.input_buffer != self.search.query {
            self.search.query = self.app.input_buffer.clone();
            self.search.error = None;
            if self.search.query.trim().is_empty() {
                self.search.clear();
            }
        }
    }

    fn scroll(&mut self, delta: i32) {
        match self.app.current_view {
            View::Trending => {
                let len = self.trending.quotes().len();
                self.trending.selected_index = step(self.trending.selected_index, delta, len);
            }
            View::Search => {
                let len = self.search.results.len();
                self.search.selected_index = step(self.search.selected_index, delta, len);
            }
            View::Detail => {}
        }
    }

    fn go_to_top(&mut self) {
        match self.app.current_view {
            View::Trending if !self.trending.quotes().is_empty() => {
                self.trending.selected_index = Some(0)
            }
            View::Search if !self.search.results.is_empty() => self.search.selected_index = Some(0),
            _ => {}
        }
    }

    fn go_to_bottom(&mut self) {
        match self.app.current_view {
            View::Trending => {
                let len = self.trending.quotes().len();
                self.trending.selected_index = len.checked_sub(1);
            }
            View::Search => {
                let len = self.search.results.len();
                self.search.selected_index = len.checked_sub(1);
            }
            View::Detail => {}
        }
    }
}

fn step(current: Option<usize>, delta: i32, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let current = current.unwrap_or(0) as i64;
    let next = (current + i64::from(delta)).clamp(0, len as i64 - 1);
    Some(next as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn store() -> Store {
        let (tx, _rx) = mpsc::unbounded_channel();
        Store::new(tx)
    }

    fn quotes(symbols: &[&str]) -> RefreshState<Fetched<Vec<StockQuote>>> {
        let value = symbols
            .iter()
            .map(|s| StockQuote {
                symbol: s.to_string(),
                name: s.to_string(),
                price: dec!(10),
                change: dec!(1),
                change_percent: dec!(10),
                currency: "USD".to_string(),
            })
            .collect();
        RefreshState {
            data: Some(Fetched::mock(value)),
            loading: false,
            ..RefreshState::default()
        }
    }

    #[test]
    fn test_scrolling_is_clamped_to_rows() {
        let mut store = store();
        store.reduce(Action::TrendingUpdated(quotes(&["AAPL", "MSFT", "TSLA"])));
        assert_eq!(store.trending.selected_index, Some(0));

        store.reduce(Action::PageDown);
        assert_eq!(store.trending.selected_index, Some(2));
        store.reduce(Action::ScrollUp);
        assert_eq!(store.selection_symbol().as_deref(), Some("MSFT"));
        store.reduce(Action::PageUp);
        assert_eq!(store.trending.selected_index, Some(0));
        store.reduce(Action::GoToBottom);
        assert_eq!(store.trending.selected_index, Some(2));
    }

    #[test]
    fn test_open_detail_and_back_returns_to_previous_view() {
        let mut store = store();
        store.reduce(Action::SetView(View::Search));
        store.reduce(Action::OpenDetail(" aapl ".to_string()));

        assert_eq!(store.app.current_view, View::Detail);
        assert_eq!(store.detail.symbol.as_deref(), Some("AAPL"));

        store.reduce(Action::Back);
        assert_eq!(store.app.current_view, View::Search);
    }

    #[test]
    fn test_typing_updates_query_and_clearing_resets_results() {
        let mut store = store();
        store.reduce(Action::SetInputMode(InputMode::Search));
        assert_eq!(store.app.current_view, View::Search);

        for c in "ap".chars() {
            store.reduce(Action::InputChar(c));
        }
        assert_eq!(store.search.query, "ap");

        store.reduce(Action::SearchResultsLoaded {
            query: "ap".to_string(),
            results: Fetched::mock(vec![SearchResult {
                symbol: "AAPL".to_string(),
                name: "Apple Inc.".to_string(),
                exchange: "NASDAQ".to_string(),
                region: Region::Usa,
                kind: "Equity".to_string(),
            }]),
        });
        assert_eq!(store.search.results.len(), 1);

        store.reduce(Action::InputBackspace);
        store.reduce(Action::InputBackspace);
        assert!(store.search.query.is_empty());
        assert!(store.search.results.is_empty());
    }

    #[test]
    fn test_detail_view_needs_a_symbol() {
        let mut store = store();
        store.reduce(Action::SetView(View::Detail));
        assert_eq!(store.app.current_view, View::Trending);

        store.reduce(Action::OpenDetail("MSFT".to_string()));
        store.reduce(Action::SetView(View::Trending));
        store.reduce(Action::SetView(View::Detail));
        assert_eq!(store.app.current_view, View::Detail);
        assert_eq!(store.app.previous_view, Some(View::Trending));
    }

    #[test]
    fn test_connectivity_and_theme() {
        let mut store = store();
        store.reduce(Action::ConnectivityChanged(ConnectivityStatus {
            offline: true,
            was_offline: false,
        }));
        assert!(store.app.offline);

        store.reduce(Action::ToggleTheme);
        assert_eq!(store.app.theme_mode, ThemeMode::Light);
    }

    #[test]
    fn test_toasts_are_added_and_dismissed() {
        let mut store = store();
        store.reduce(Action::ShowToast(Toast::info("hello")));
        store.reduce(Action::ShowToast(Toast::error("oops")));
        assert_eq!(store.app.toasts.len(), 2);

        store.reduce(Action::DismissToast);
        assert_eq!(store.app.toasts.len(), 1);
    }

    #[test]
    fn test_step_handles_empty_lists() {
        assert_eq!(step(None, 1, 0), None);
        assert_eq!(step(None, -1, 3), Some(0));
        assert_eq!(step(Some(1), 10, 3), Some(2));
    }
}
