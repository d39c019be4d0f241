//! The polling task and its control handle.

use super::{Fetcher, RefreshOptions, RefreshState};
use crate::error::{Error, Result};
use futures::future::{BoxFuture, OptionFuture};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};

/// Shortest timer period accepted; `tokio::time::interval` rejects zero.
const MIN_INTERVAL: Duration = Duration::from_millis(10);

/// Control messages sent from a [`RefreshHandle`] to its task.
enum Command<T> {
    Refresh,
    SetEnabled(bool),
    SetInterval(Duration),
    Replace(Fetcher<T>),
}

/// Background task that periodically runs a fetch function.
pub struct AutoRefresh<T> {
    fetcher: Fetcher<T>,
    options: RefreshOptions,
    state_tx: watch::Sender<RefreshState<T>>,
    command_rx: mpsc::UnboundedReceiver<Command<T>>,
}

impl<T> AutoRefresh<T>
where
    T: Send + Sync + 'static,
{
    /// Spawn a poller on the current tokio runtime.
    ///
    /// The first fetch starts immediately, even when `options.enabled` is
    /// false; the timer only drives subsequent fetches.
    pub fn spawn(fetcher: Fetcher<T>, options: RefreshOptions) -> RefreshHandle<T> {
        let (state_tx, state_rx) = watch::channel(RefreshState::initial(&options));
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let poller = Self {
            fetcher,
            options,
            state_tx,
            command_rx,
        };
        let task = tokio::spawn(poller.run());

        RefreshHandle {
            command_tx,
            state_rx,
            task,
        }
    }

    async fn run(mut self) {
        let mut ticker = new_ticker(self.options.interval);
        let mut in_flight = Some(self.start_fetch());

        loop {
            tokio::select! {
                Some(result) = OptionFuture::from(in_flight.as_mut()), if in_flight.is_some() => {
                    in_flight = None;
                    self.finish_fetch(result);
                }

                command = self.command_rx.recv() => {
                    let Some(command) = command else {
                        tracing::debug!("refresh handle dropped, stopping poller");
                        break;
                    };
                    match command {
                        Command::Refresh => {
                            if in_flight.is_none() {
                                in_flight = Some(self.start_fetch());
                            }
                        }
                        Command::SetEnabled(enabled) => {
                            if enabled == self.options.enabled {
                                continue;
                            }
                            self.options.enabled = enabled;
                            self.state_tx.send_modify(|s| s.enabled = enabled);
                            if enabled {
                                ticker = new_ticker(self.options.interval);
                                if in_flight.is_none() {
                                    in_flight = Some(self.start_fetch());
                                }
                            }
                        }
                        Command::SetInterval(interval) => {
                            self.options.interval = interval;
                            ticker = new_ticker(interval);
                        }
                        Command::Replace(fetcher) => {
                            // Dropping the in-flight future cancels it.
                            self.fetcher = fetcher;
                            in_flight = Some(self.start_fetch());
                            ticker = new_ticker(self.options.interval);
                        }
                    }
                }

                _ = ticker.tick(), if self.options.enabled => {
                    if in_flight.is_none() {
                        in_flight = Some(self.start_fetch());
                    }
                }
            }
        }
    }

    fn start_fetch(&mut self) -> BoxFuture<'static, Result<T>> {
        self.state_tx.send_modify(RefreshState::begin_fetch);
        (self.fetcher)()
    }

    fn finish_fetch(&mut self, result: Result<T>) {
        if let Err(e) = &result {
            tracing::warn!(error = %e, "refresh fetch failed, keeping previous data");
        }
        self.state_tx.send_modify(|s| s.complete(result));
    }
}

fn new_ticker(period: Duration) -> Interval {
    let period = period.max(MIN_INTERVAL);
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

/// Handle for observing and controlling an [`AutoRefresh`] task.
///
/// Dropping the handle stops the task.
pub struct RefreshHandle<T> {
    command_tx: mpsc::UnboundedSender<Command<T>>,
    state_rx: watch::Receiver<RefreshState<T>>,
    task: JoinHandle<()>,
}

impl<T> RefreshHandle<T> {
    /// Fetch now, regardless of the timer.
    pub fn refresh(&self) -> Result<()> {
        self.send(Command::Refresh)
    }

    /// Enable or disable automatic refresh.
    pub fn set_enabled(&self, enabled: bool) -> Result<()> {
        self.send(Command::SetEnabled(enabled))
    }

    /// Change the refresh interval; the timer restarts.
    pub fn set_interval(&self, interval: Duration) -> Result<()> {
        self.send(Command::SetInterval(interval))
    }

    /// Swap the fetch function after its inputs changed.
    ///
    /// Fetches immediately with the new function and restarts the timer.
    /// Loaded data stays in place until the new fetch completes.
    pub fn replace_fetcher(&self, fetcher: Fetcher<T>) -> Result<()> {
        self.send(Command::Replace(fetcher))
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<RefreshState<T>> {
        self.state_rx.clone()
    }

    /// Whether automatic refresh is currently enabled.
    pub fn is_enabled(&self) -> bool {
        self.state_rx.borrow().enabled
    }

    /// Stop the poller.
    pub fn shutdown(self) {
        self.task.abort();
    }

    fn send(&self, command: Command<T>) -> Result<()> {
        self.command_tx
            .send(command)
            .map_err(|_| Error::channel("refresh task is no longer running"))
    }
}

impl<T: Clone> RefreshHandle<T> {
    /// Copy of the current state.
    pub fn snapshot(&self) -> RefreshState<T> {
        self.state_rx.borrow().clone()
    }
}

impl<T> Drop for RefreshHandle<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refresh::fetcher;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio_test::assert_ok;

    fn counting_fetcher(calls: Arc<AtomicU32>) -> Fetcher<u32> {
        fetcher(move || {
            let calls = calls.clone();
            async move { Ok(calls.fetch_add(1, Ordering::SeqCst) + 1) }
        })
    }

    async fn wait_until<T: Clone>(
        rx: &mut watch::Receiver<RefreshState<T>>,
        predicate: impl FnMut(&RefreshState<T>) -> bool,
    ) -> RefreshState<T> {
        rx.wait_for(predicate).await.unwrap().clone()
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetches_immediately_then_on_interval() {
        let calls = Arc::new(AtomicU32::new(0));
        let handle = AutoRefresh::spawn(
            counting_fetcher(calls.clone()),
            RefreshOptions::every(Duration::from_secs(1)),
        );
        let mut rx = handle.subscribe();

        let state = wait_until(&mut rx, |s| s.refresh_count == 1).await;
        assert_eq!(state.data, Some(1));
        assert!(!state.loading);
        assert!(state.last_updated.is_some());

        let state = wait_until(&mut rx, |s| s.refresh_count == 3).await;
        assert_eq!(state.data, Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_poller_fetches_once_and_on_demand() {
        let calls = Arc::new(AtomicU32::new(0));
        let handle = AutoRefresh::spawn(
            counting_fetcher(calls.clone()),
            RefreshOptions::every(Duration::from_secs(1)).with_enabled(false),
        );
        let mut rx = handle.subscribe();

        wait_until(&mut rx, |s| s.refresh_count == 1).await;
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!handle.is_enabled());

        assert_ok!(handle.refresh());
        let state = wait_until(&mut rx, |s| s.refresh_count == 2).await;
        assert_eq!(state.data, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabling_stops_the_timer() {
        let calls = Arc::new(AtomicU32::new(0));
        let handle = AutoRefresh::spawn(
            counting_fetcher(calls.clone()),
            RefreshOptions::every(Duration::from_secs(1)),
        );
        let mut rx = handle.subscribe();
        wait_until(&mut rx, |s| s.refresh_count == 2).await;

        assert_ok!(handle.set_enabled(false));
        wait_until(&mut rx, |s| !s.enabled && !s.loading).await;
        let before = calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), before);

        assert_ok!(handle.set_enabled(true));
        wait_until(&mut rx, |s| s.enabled && s.refresh_count > u64::from(before)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_fetch_preserves_stale_data() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let handle = AutoRefresh::spawn(
            fetcher(move || {
                let n = c.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Ok(42u32)
                    } else {
                        Err(Error::network("backend unreachable"))
                    }
                }
            }),
            RefreshOptions::every(Duration::from_secs(1)),
        );
        let mut rx = handle.subscribe();

        let loaded = wait_until(&mut rx, |s| s.refresh_count == 1).await;
        let failed = wait_until(&mut rx, |s| s.error.is_some() && !s.loading).await;

        assert_eq!(failed.data, Some(42));
        assert_eq!(failed.refresh_count, 1);
        assert_eq!(failed.last_updated, loaded.last_updated);
        assert!(failed.is_stale());
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_is_set_while_fetching() {
        let handle = AutoRefresh::spawn(
            fetcher(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Ok("done")
            }),
            RefreshOptions::every(Duration::from_secs(60)),
        );

        let state = handle.snapshot();
        assert!(state.is_first_load());

        let mut rx = handle.subscribe();
        let state = wait_until(&mut rx, |s| !s.loading).await;
        assert_eq!(state.data, Some("done"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_replacing_fetcher_discards_in_flight_result() {
        let handle = AutoRefresh::spawn(
            fetcher(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok("AAPL")
            }),
            RefreshOptions::every(Duration::from_secs(3600)),
        );
        let mut rx = handle.subscribe();

        handle
            .replace_fetcher(fetcher(|| async { Ok("MSFT") }))
            .unwrap();

        let state = wait_until(&mut rx, |s| s.data.is_some()).await;
        assert_eq!(state.data, Some("MSFT"));

        tokio::time::sleep(Duration::from_secs(10)).await;
        let state = handle.snapshot();
        assert_eq!(state.data, Some("MSFT"));
        assert_eq!(state.refresh_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replacing_fetcher_keeps_data_until_new_result() {
        let handle = AutoRefresh::spawn(
            fetcher(|| async { Ok(1u32) }),
            RefreshOptions::every(Duration::from_secs(3600)),
        );
        let mut rx = handle.subscribe();
        wait_until(&mut rx, |s| s.refresh_count == 1).await;

        handle
            .replace_fetcher(fetcher(|| async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok(2u32)
            }))
            .unwrap();

        let state = wait_until(&mut rx, |s| s.loading).await;
        assert_eq!(state.data, Some(1));

        let state = wait_until(&mut rx, |s| s.refresh_count == 2).await;
        assert_eq!(state.data, Some(2));
    }

    fn slow_counting_fetcher(calls: Arc<AtomicU32>, running: Arc<AtomicU32>) -> Fetcher<u32> {
        fetcher(move || {
            let calls = calls.clone();
            let running = running.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                assert_eq!(running.fetch_add(1, Ordering::SeqCst), 0, "fetches overlapped");
                tokio::time::sleep(Duration::from_millis(2500)).await;
                running.fetch_sub(1, Ordering::SeqCst);
                Ok(n)
            }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_refresh_during_fetch_is_ignored() {
        let calls = Arc::new(AtomicU32::new(0));
        let handle = AutoRefresh::spawn(
            slow_counting_fetcher(calls.clone(), Arc::new(AtomicU32::new(0))),
            RefreshOptions::every(Duration::from_secs(3600)),
        );
        let mut rx = handle.subscribe();

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_ok!(handle.refresh());
        assert_ok!(handle.refresh());

        let state = wait_until(&mut rx, |s| s.refresh_count == 1).await;
        assert_eq!(state.data, Some(1));
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_due_during_fetch_are_skipped() {
        let calls = Arc::new(AtomicU32::new(0));
        let _handle = AutoRefresh::spawn(
            slow_counting_fetcher(calls.clone(), Arc::new(AtomicU32::new(0))),
            RefreshOptions::every(Duration::from_secs(1)),
        );

        tokio::time::sleep(Duration::from_secs(22)).await;

        // One fetch every 3s (2.5s fetch, next free tick), never one per second.
        let calls = calls.load(Ordering::SeqCst);
        assert!((7..=8).contains(&calls), "unexpected fetch count {calls}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_interval_restarts_timer() {
        let calls = Arc::new(AtomicU32::new(0));
        let handle = AutoRefresh::spawn(
            counting_fetcher(calls.clone()),
            RefreshOptions::every(Duration::from_secs(1)),
        );
        let mut rx = handle.subscribe();
        wait_until(&mut rx, |s| s.refresh_count == 1).await;

        assert_ok!(handle.set_interval(Duration::from_secs(100)));
        tokio::time::sleep(Duration::from_secs(50)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_fetching() {
        let calls = Arc::new(AtomicU32::new(0));
        let handle = AutoRefresh::spawn(
            counting_fetcher(calls.clone()),
            RefreshOptions::every(Duration::from_secs(1)),
        );
        let mut rx = handle.subscribe();
        wait_until(&mut rx, |s| s.refresh_count == 1).await;

        handle.shutdown();
        tokio::task::yield_now().await;
        let after_shutdown = calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), after_shutdown);
    }
}
