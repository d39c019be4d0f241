//! Auto-refreshing data polling.
//!
//! An [`AutoRefresh`] task wraps an asynchronous fetch function with a
//! fixed-interval timer. Observers read a [`RefreshState`] through a
//! `watch` channel, and control the poller through a [`RefreshHandle`]:
//! manual refresh, enable/disable, interval changes and fetcher
//! replacement when the inputs of the fetch (symbol, time range) change.
//!
//! Data from the last successful fetch is kept when a later fetch fails,
//! so views keep showing stale values alongside the error.

mod poller;

pub use poller::{AutoRefresh, RefreshHandle};

use crate::error::Result;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Default interval between automatic fetches.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// A shareable fetch function producing a fresh value on every call.
pub type Fetcher<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T>> + Send + Sync>;

/// Build a [`Fetcher`] from a closure returning a future.
pub fn fetcher<T, F, Fut>(f: F) -> Fetcher<T>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    Arc::new(move || Box::pin(f()) as BoxFuture<'static, Result<T>>)
}

/// Poller settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshOptions {
    /// Time between automatic fetches.
    pub interval: Duration,
    /// Whether the timer is running.
    pub enabled: bool,
}

impl Default for RefreshOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_REFRESH_INTERVAL,
            enabled: true,
        }
    }
}

impl RefreshOptions {
    /// Options with the given interval, enabled.
    pub fn every(interval: Duration) -> Self {
        Self {
            interval,
            enabled: true,
        }
    }

    /// Set whether the timer starts enabled.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Observable state of a poller.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshState<T> {
    /// Value from the most recent successful fetch.
    pub data: Option<T>,
    /// Whether a fetch is in flight.
    pub loading: bool,
    /// Message of the most recent failed fetch, cleared on success.
    pub error: Option<String>,
    /// Time of the most recent successful fetch.
    pub last_updated: Option<DateTime<Utc>>,
    /// Number of successful fetches.
    pub refresh_count: u64,
    /// Whether automatic refresh is enabled.
    pub enabled: bool,
}

impl<T> Default for RefreshState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: true,
            error: None,
            last_updated: None,
            refresh_count: 0,
            enabled: true,
        }
    }
}

impl<T> RefreshState<T> {
    /// Initial state for a poller with the given options.
    pub fn initial(options: &RefreshOptions) -> Self {
        Self {
            enabled: options.enabled,
            ..Self::default()
        }
    }

    /// True while nothing has been loaded yet and a fetch is running.
    pub fn is_first_load(&self) -> bool {
        self.loading && self.data.is_none()
    }

    /// True when data is shown but the latest fetch failed.
    pub fn is_stale(&self) -> bool {
        self.data.is_some() && self.error.is_some()
    }

    /// Borrow the loaded data, if any.
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    fn begin_fetch(&mut self) {
        self.loading = true;
    }

    fn complete(&mut self, result: Result<T>) {
        match result {
            Ok(value) => {
                self.data = Some(value);
                self.error = None;
                self.last_updated = Some(Utc::now());
                self.refresh_count += 1;
            }
            Err(e) => {
                self.error = Some(e.to_string());
            }
        }
        self.loading = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_initial_state_is_loading_without_data() {
        let state: RefreshState<u32> = RefreshState::initial(&RefreshOptions::default());
        assert!(state.loading);
        assert!(state.is_first_load());
        assert_eq!(state.refresh_count, 0);
        assert!(state.last_updated.is_none());
    }

    #[test]
    fn test_failure_keeps_previous_data() {
        let mut state: RefreshState<u32> = RefreshState::default();
        state.begin_fetch();
        state.complete(Ok(7));
        let updated = state.last_updated;

        state.begin_fetch();
        state.complete(Err(Error::network("offline")));

        assert_eq!(state.data, Some(7));
        assert_eq!(state.refresh_count, 1);
        assert_eq!(state.last_updated, updated);
        assert!(state.is_stale());
        assert!(!state.loading);
    }

    #[test]
    fn test_success_clears_error() {
        let mut state: RefreshState<u32> = RefreshState::default();
        state.complete(Err(Error::network("offline")));
        assert!(state.error.is_some());

        state.complete(Ok(1));
        assert!(state.error.is_none());
        assert_eq!(state.refresh_count, 1);
        assert!(state.last_updated.is_some());
    }
}
