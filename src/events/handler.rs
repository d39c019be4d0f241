//! Event handler for processing input events.

use super::EventConfig;
use super::input::Keymap;
use crate::error::{Error, Result};
use crate::state::{Action, InputMode, Store, View};
use crossterm::event::{
    Event as CrosstermEvent, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
    MouseEvent, MouseEventKind,
};
use futures::StreamExt;
use futures::stream::BoxStream;
use std::io;

/// Source of terminal events.
type TerminalEvents = BoxStream<'static, io::Result<CrosstermEvent>>;

/// Handles input events and produces actions.
pub struct EventHandler {
    /// Key bindings.
    keymap: Keymap,
    /// Polling configuration.
    config: EventConfig,
    /// Store state the key handling depends on.
    snapshot: StoreSnapshot,
    /// Terminal events, opened on first use.
    events: Option<TerminalEvents>,
}

/// Snapshot of relevant store state for event handling.
#[derive(Debug, Clone, Default)]
struct StoreSnapshot {
    input_mode: InputMode,
    current_view: View,
    show_help: bool,
    selected_symbol: Option<String>,
}

impl EventHandler {
    /// Create a new event handler.
    pub fn new(keymap: Keymap, config: EventConfig) -> Self {
        Self {
            keymap,
            config,
            snapshot: StoreSnapshot::default(),
            events: None,
        }
    }

    /// Read events from `events` instead of the terminal.
    pub fn with_event_stream(
        mut self,
        events: impl futures::Stream<Item = io::Result<CrosstermEvent>> + Send + 'static,
    ) -> Self {
        self.events = Some(events.boxed());
        self
    }

    /// Update the store snapshot for state-aware event handling.
    pub fn update_store_snapshot(&mut self, store: &Store) {
        self.snapshot = StoreSnapshot {
            input_mode: store.app.input_mode,
            current_view: store.app.current_view,
            show_help: store.app.show_help,
            selected_symbol: store.selection_symbol(),
        };
    }

    /// Get the next action from user input, waiting at most one tick.
    ///
    /// Returns `Ok(None)` when the tick passes without input. Cancel safe.
    pub async fn next(&mut self) -> Result<Option<Action>> {
        let tick_rate = self.config.tick_rate;
        let events = self
            .events
            .get_or_insert_with(|| EventStream::new().boxed());

        let event = tokio::select! {
            event = events.next() => event,
            _ = tokio::time::sleep(tick_rate) => return Ok(None),
        };

        match event {
            Some(event) => Ok(self.handle_event(event?)),
            None => Err(Error::terminal("terminal event stream closed")),
        }
    }

    /// Map a terminal event to an action.
    pub fn handle_event(&self, event: CrosstermEvent) -> Option<Action> {
        match event {
            CrosstermEvent::Key(key) => self.handle_key(key),
            CrosstermEvent::Mouse(mouse) if self.config.mouse_capture => {
                self.handle_mouse(mouse)
            }
            // Resizes redraw on the next frame.
            _ => None,
        }
    }

    /// Handle a key event and return an optional action.
    pub fn handle_key(&self, key: KeyEvent) -> Option<Action> {
        // Only process key press events
        if key.kind != KeyEventKind::Press {
            return None;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Action::Quit);
        }

        match self.snapshot.input_mode {
            InputMode::Normal => self.handle_normal_mode(key),
            InputMode::Search => self.handle_search_mode(key),
        }
    }

    fn handle_mouse(&self, mouse: MouseEvent) -> Option<Action> {
        match mouse.kind {
            MouseEventKind::ScrollUp => Some(Action::ScrollUp),
            MouseEventKind::ScrollDown => Some(Action::ScrollDown),
            _ => None,
        }
    }

    fn handle_normal_mode(&self, key: KeyEvent) -> Option<Action> {
        let keys = &self.keymap;

        // Help overlay swallows everything but closing keys.
        if self.snapshot.show_help {
            if keys.help.matches(&key) || keys.back.matches(&key) {
                return Some(Action::ToggleHelp);
            }
            if keys.quit.matches(&key) {
                return Some(Action::Quit);
            }
            return None;
        }

        // Global shortcuts
        if keys.quit.matches(&key) {
            return Some(Action::Quit);
        }
        if keys.help.matches(&key) {
            return Some(Action::ToggleHelp);
        }
        if keys.refresh.matches(&key) {
            return Some(Action::RefreshAll);
        }
        if keys.theme.matches(&key) {
            return Some(Action::ToggleTheme);
        }
        if keys.auto_refresh.matches(&key) {
            return Some(Action::ToggleAutoRefresh);
        }
        if keys.dismiss.matches(&key) {
            return Some(Action::DismissToast);
        }
        if keys.search.matches(&key) {
            return Some(Action::SetInputMode(InputMode::Search));
        }

        // View switching
        if keys.trending.matches(&key) {
            return Some(Action::SetView(View::Trending));
        }
        if keys.search_view.matches(&key) {
            return Some(Action::SetView(View::Search));
        }
        if keys.detail.matches(&key) {
            return Some(Action::SetView(View::Detail));
        }

        match self.snapshot.current_view {
            View::Trending => self.handle_list_view(key),
            View::Search => self.handle_search_view(key),
            View::Detail => self.handle_detail_view(key),
        }
    }

    fn handle_list_view(&self, key: KeyEvent) -> Option<Action> {
        let keys = &self.keymap;

        if keys.up.matches(&key) || key.code == KeyCode::Up {
            return Some(Action::ScrollUp);
        }
        if keys.down.matches(&key) || key.code == KeyCode::Down {
            return Some(Action::ScrollDown);
        }
        if keys.select.matches(&key) {
            return self.snapshot.selected_symbol.clone().map(Action::OpenDetail);
        }

        match key.code {
            KeyCode::PageUp => Some(Action::PageUp),
            KeyCode::PageDown => Some(Action::PageDown),
            KeyCode::Home => Some(Action::GoToTop),
            KeyCode::End => Some(Action::GoToBottom),
            _ => None,
        }
    }

    fn handle_search_view(&self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Tab => Some(Action::FocusNextRegion),
            KeyCode::Char(' ') => Some(Action::ToggleFocusedRegion),
            KeyCode::Esc => Some(Action::CancelSearch),
            _ => self.handle_list_view(key),
        }
    }

    fn handle_detail_view(&self, key: KeyEvent) -> Option<Action> {
        let keys = &self.keymap;

        if keys.left.matches(&key) || key.code == KeyCode::Left {
            return Some(Action::PrevTimeRange);
        }
        if keys.right.matches(&key) || key.code == KeyCode::Right {
            return Some(Action::NextTimeRange);
        }
        if keys.back.matches(&key) || key.code == KeyCode::Backspace {
            return Some(Action::Back);
        }
        None
    }

    fn handle_search_mode(&self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc => Some(Action::CancelSearch),
            KeyCode::Enter => Some(Action::SubmitSearch),
            KeyCode::Backspace => Some(Action::InputBackspace),
            KeyCode::Left => Some(Action::InputCursorLeft),
            KeyCode::Right => Some(Action::InputCursorRight),
            KeyCode::Tab => Some(Action::FocusNextRegion),
            KeyCode::Up => Some(Action::ScrollUp),
            KeyCode::Down => Some(Action::ScrollDown),
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                Some(Action::InputChar(c))
            }
            _ => None,
        }
    }
}
