//! # stockwatch
//!
//! A terminal dashboard for tracking stocks, built with ratatui and tokio.
//!
//! ## Architecture
//!
//! - **App**: terminal lifecycle, event loop and the data session
//! - **Refresh**: generic auto-refreshing pollers
//! - **Connectivity**: offline detection with a recovery window
//! - **API**: HTTP backend client and the mock-fallback data service
//! - **Feeds**: per-view fetch functions handed to pollers
//! - **Mock**: stock catalog and synthetic data generators
//! - **State**: centralized store updated by actions
//! - **Events**: key bindings and input handling
//! - **UI**: layout, theme and widgets
//! - **Config**: layered configuration

pub mod api;
pub mod app;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod events;
pub mod feeds;
pub mod mock;
pub mod refresh;
pub mod state;
pub mod ui;

pub use app::App;
pub use config::Config;
pub use error::{Error, Result};
