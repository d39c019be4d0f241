//! Main application module.
//!
//! This module contains the main `App` struct that coordinates
//! the event loop, state management, and rendering.

mod session;

pub use session::Session;

use crate::api::MarketDataService;
use crate::config::Config;
use crate::connectivity::{
    ConnectivityEvent, ConnectivityHandle, ConnectivityMonitor, ConnectivityStatus, MonitorOptions,
};
use crate::error::Result;
use crate::events::{EventConfig, EventHandler, Keymap};
use crate::state::{Action, Region, SearchState, Store, Toast, View};
use crate::ui::{Theme, Ui};

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

/// The main application.
pub struct App {
    /// Terminal.
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Application store.
    store: Store,
    /// Event handler.
    event_handler: EventHandler,
    /// Key bindings, shown in help.
    keymap: Keymap,
    /// Action receiver.
    action_rx: mpsc::UnboundedReceiver<Action>,
    /// Pollers and search.
    session: Session,
    /// Offline detection.
    connectivity: ConnectivityHandle,
    connectivity_events: mpsc::UnboundedReceiver<ConnectivityEvent>,
    /// Configuration.
    config: Config,
}

impl App {
    /// Create a new application.
    pub async fn new(config: Config) -> Result<Self> {
        let keymap = Keymap::from_config(&config.keybindings)?;
        let service = Arc::new(
            MarketDataService::from_config(&config.api)?
                .with_trending_count(config.ui.trending_count),
        );

        // Set up terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        if config.ui.mouse_support {
            execute!(stdout, EnableMouseCapture)?;
        }
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        // Create action channel
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        // Create store
        let mut store = Store::new(action_tx.clone());
        store.app.theme_mode = config.theme.mode;
        store.app.auto_refresh = config.refresh.enabled;
        store.search = SearchState::with_regions(config.ui.regions());

        let event_handler = EventHandler::new(keymap.clone(), EventConfig::from(&config.ui));

        let session = Session::start(service, config.refresh.clone(), action_tx.clone());

        let (connectivity, connectivity_events) = ConnectivityMonitor::spawn(
            ConnectivityMonitor::probe_from_config(&config.connectivity),
            MonitorOptions::from(&config.connectivity),
        );
        forward_status(connectivity.subscribe(), action_tx);

        Ok(Self {
            terminal,
            store,
            event_handler,
            keymap,
            action_rx,
            session,
            connectivity,
            connectivity_events,
            config,
        })
    }

    /// Run the application event loop.
    pub async fn run(&mut self) -> Result<()> {
        info!("stockwatch started");

        // Main event loop
        loop {
            // Update event handler with current state
            self.event_handler.update_store_snapshot(&self.store);

            // Render UI
            let theme = Theme::new(&self.config.theme, self.store.app.theme_mode)
                .with_unicode(self.config.ui.unicode_symbols);
            self.terminal.draw(|frame| {
                Ui::render(frame, &self.store, &theme, &self.keymap, &self.config.ui);
            })?;

            // Handle events and actions
            tokio::select! {
                // Handle terminal events
                result = self.event_handler.next() => {
                    match result? {
                        Some(action) => self.handle_action(action)?,
                        // Tick
                        None => self.store.reduce(Action::ExpireToasts),
                    }
                }

                // Handle actions from the channel
                Some(action) = self.action_rx.recv() => {
                    self.handle_action(action)?;
                }

                Some(event) = self.connectivity_events.recv() => {
                    self.session.on_connectivity(event)?;
                }
            }

            // Check if we should quit
            if self.store.app.should_quit {
                break;
            }
        }

        info!(
            offline = self.connectivity.status().offline,
            "stockwatch stopped"
        );
        Ok(())
    }

    /// Handle an action.
    fn handle_action(&mut self, action: Action) -> Result<()> {
        match action {
            Action::RefreshAll => {
                self.session.refresh_all()?;
            }
            Action::ToggleAutoRefresh => {
                let enabled = !self.session.auto_refresh();
                self.session.set_auto_refresh(enabled)?;
                self.store.reduce(Action::AutoRefreshChanged(enabled));
                let message = if enabled {
                    "Auto-refresh resumed"
                } else {
                    "Auto-refresh paused"
                };
                self.store.reduce(Action::ShowToast(Toast::info(message)));
            }
            Action::SetError(error) => {
                warn!(%error, "application error");
                self.store.reduce(Action::SetError(error));
            }
            action => {
                let search_before = self.search_inputs();
                self.store.reduce(action);
                let search_after = self.search_inputs();
                if search_after != search_before {
                    let (query, regions) = search_after;
                    self.session.schedule_search(query, regions);
                }
            }
        }

        self.sync_detail()
    }

    fn search_inputs(&self) -> (String, Vec<Region>) {
        (self.store.search.query.clone(), self.store.search.regions.clone())
    }

    fn sync_detail(&mut self) -> Result<()> {
        let detail = &self.store.detail;
        let shown = match (&detail.symbol, self.store.app.current_view) {
            (Some(symbol), View::Detail) => Some((symbol.as_str(), detail.time_range)),
            _ => None,
        };
        self.session.sync_detail(shown)
    }
}

/// Publish connectivity status changes as actions.
fn forward_status(
    mut rx: watch::Receiver<ConnectivityStatus>,
    action_tx: mpsc::UnboundedSender<Action>,
) {
    tokio::spawn(async move {
        loop {
            let status = *rx.borrow_and_update();
            if action_tx.send(Action::ConnectivityChanged(status)).is_err() {
                break;
            }
            if rx.changed().await.is_err() {
                break;
            }
        }
    });
}

impl Drop for App {
    fn drop(&mut self) {
        // Restore terminal state
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        );
        let _ = self.terminal.show_cursor();
    }
}
