//! Background data tasks behind the dashboard.
//!
//! A [`Session`] owns the pollers, the debounced search task and the
//! reactions to connectivity changes. Everything it learns reaches the
//! store as [`Action`]s on the shared channel.

use crate::api::MarketDataService;
use crate::config::RefreshConfig;
use crate::connectivity::ConnectivityEvent;
use crate::error::Result;
use crate::feeds::{DetailsFeed, HistoryFeed, TrendingFeed};
use crate::refresh::{AutoRefresh, RefreshHandle, RefreshOptions, RefreshState};
use crate::state::{
    Action, Fetched, PriceHistory, Region, StockDetails, StockQuote, TimeRange, Toast,
};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Pollers of the detail view.
struct DetailPollers {
    symbol: String,
    range: TimeRange,
    details: RefreshHandle<Fetched<StockDetails>>,
    history: RefreshHandle<Fetched<PriceHistory>>,
    forwarders: [JoinHandle<()>; 2],
}

impl DetailPollers {
    fn shutdown(self) {
        for forwarder in &self.forwarders {
            forwarder.abort();
        }
        self.details.shutdown();
        self.history.shutdown();
    }
}

/// Data side of the application.
pub struct Session {
    service: Arc<MarketDataService>,
    refresh: RefreshConfig,
    action_tx: mpsc::UnboundedSender<Action>,
    auto_refresh: bool,
    trending: RefreshHandle<Fetched<Vec<StockQuote>>>,
    trending_forwarder: JoinHandle<()>,
    detail: Option<DetailPollers>,
    search_task: Option<JoinHandle<()>>,
}

impl Session {
    /// Start the trending poller. Must be called within a tokio runtime.
    pub fn start(
        service: Arc<MarketDataService>,
        refresh: RefreshConfig,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        let auto_refresh = refresh.enabled;
        let feed = Arc::new(TrendingFeed::new(Arc::clone(&service)));
        let trending = AutoRefresh::spawn(
            feed.into_fetcher(),
            RefreshOptions::every(refresh.trending_interval()).with_enabled(auto_refresh),
        );
        let trending_forwarder =
            forward(trending.subscribe(), action_tx.clone(), Action::TrendingUpdated);

        info!(
            auto_refresh,
            interval_ms = refresh.trending_ms,
            "data session started"
        );

        Self {
            service,
            refresh,
            action_tx,
            auto_refresh,
            trending,
            trending_forwarder,
            detail: None,
            search_task: None,
        }
    }

    /// Whether pollers currently refresh on their timers.
    pub fn auto_refresh(&self) -> bool {
        self.auto_refresh
    }

    /// Symbol whose detail pollers are running.
    pub fn detail_symbol(&self) -> Option<&str> {
        self.detail.as_ref().map(|d| d.symbol.as_str())
    }

    /// Range whose history poller is running.
    pub fn detail_range(&self) -> Option<TimeRange> {
        self.detail.as_ref().map(|d| d.range)
    }

    /// Fetch everything on screen now.
    pub fn refresh_all(&self) -> Result<()> {
        self.trending.refresh()?;
        if let Some(detail) = &self.detail {
            detail.details.refresh()?;
            detail.history.refresh()?;
        }
        Ok(())
    }

    /// Pause or resume timer-driven refresh on every poller.
    pub fn set_auto_refresh(&mut self, enabled: bool) -> Result<()> {
        self.auto_refresh = enabled;
        self.trending.set_enabled(enabled)?;
        if let Some(detail) = &self.detail {
            detail.details.set_enabled(enabled)?;
            detail.history.set_enabled(enabled)?;
        }
        info!(enabled, "auto-refresh changed");
        Ok(())
    }

    /// Run detail pollers only while a symbol is on screen.
    ///
    /// Pollers are started for a newly shown symbol, pointed at new inputs
    /// when the symbol or range changes, and stopped when the detail view
    /// is left.
    pub fn sync_detail(&mut self, shown: Option<(&str, TimeRange)>) -> Result<()> {
        let Some((symbol, range)) = shown else {
            if let Some(detail) = self.detail.take() {
                debug!(symbol = %detail.symbol, "stopping detail pollers");
                detail.shutdown();
            }
            return Ok(());
        };

        let Some(detail) = self.detail.as_mut() else {
            self.detail = Some(self.spawn_detail(symbol, range));
            return Ok(());
        };

        if detail.symbol != symbol {
            debug!(from = %detail.symbol, to = symbol, "switching detail symbol");
            detail
                .details
                .replace_fetcher(DetailsFeed::new(Arc::clone(&self.service), symbol).into_fetcher())?;
            detail.history.replace_fetcher(
                Arc::new(HistoryFeed::new(Arc::clone(&self.service), symbol, range)).into_fetcher(),
            )?;
            detail.symbol = symbol.to_string();
            detail.range = range;
        } else if detail.range != range {
            debug!(symbol, %range, "switching chart range");
            detail.history.replace_fetcher(
                Arc::new(HistoryFeed::new(Arc::clone(&self.service), symbol, range)).into_fetcher(),
            )?;
            detail.range = range;
        }
        Ok(())
    }

    /// Search after the debounce delay, replacing any pending search.
    pub fn schedule_search(&mut self, query: String, regions: Vec<Region>) {
        if let Some(task) = self.search_task.take() {
            task.abort();
        }
        if query.trim().is_empty() {
            return;
        }

        let service = Arc::clone(&self.service);
        let action_tx = self.action_tx.clone();
        let debounce = self.refresh.search_debounce();

        self.search_task = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if action_tx.send(Action::SearchStarted(query.clone())).is_err() {
                return;
            }
            let action = match service.search(query.trim(), &regions).await {
                Ok(results) => Action::SearchResultsLoaded { query, results },
                Err(e) => Action::SearchFailed {
                    query,
                    error: e.to_string(),
                },
            };
            let _ = action_tx.send(action);
        }));
    }

    /// React to the device going offline or coming back.
    pub fn on_connectivity(&self, event: ConnectivityEvent) -> Result<()> {
        match event {
            ConnectivityEvent::WentOffline => {
                self.notify(Toast::offline(
                    "You are offline. Showing cached or generated data.",
                ));
            }
            ConnectivityEvent::CameOnline => {
                self.service.reset_availability();
                self.trending.refresh()?;
                self.notify(Toast::success("Back online. Refreshing data."));
            }
        }
        Ok(())
    }

    fn notify(&self, toast: Toast) {
        let _ = self.action_tx.send(Action::ShowToast(toast));
    }

    fn spawn_detail(&self, symbol: &str, range: TimeRange) -> DetailPollers {
        debug!(symbol, %range, "starting detail pollers");
        let details = AutoRefresh::spawn(
            DetailsFeed::new(Arc::clone(&self.service), symbol).into_fetcher(),
            RefreshOptions::every(self.refresh.details_interval()).with_enabled(self.auto_refresh),
        );
        let history = AutoRefresh::spawn(
            Arc::new(HistoryFeed::new(Arc::clone(&self.service), symbol, range)).into_fetcher(),
            RefreshOptions::every(self.refresh.chart_interval()).with_enabled(self.auto_refresh),
        );
        let forwarders = [
            forward(details.subscribe(), self.action_tx.clone(), Action::DetailsUpdated),
            forward(history.subscribe(), self.action_tx.clone(), Action::HistoryUpdated),
        ];

        DetailPollers {
            symbol: symbol.to_string(),
            range,
            details,
            history,
            forwarders,
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.trending_forwarder.abort();
        if let Some(task) = self.search_task.take() {
            task.abort();
        }
        if let Some(detail) = self.detail.take() {
            detail.shutdown();
        }
    }
}

/// Publish every state of a poller as an action.
fn forward<T, F>(
    mut rx: watch::Receiver<RefreshState<T>>,
    action_tx: mpsc::UnboundedSender<Action>,
    to_action: F,
) -> JoinHandle<()>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(RefreshState<T>) -> Action + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            let state = rx.borrow_and_update().clone();
            if action_tx.send(to_action(state)).is_err() {
                break;
            }
            if rx.changed().await.is_err() {
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockStockApi;
    use crate::config::ApiConfig;
    use crate::mock::MockGenerator;
    use std::time::Duration;

    fn session() -> (Session, mpsc::UnboundedReceiver<Action>) {
        // Remote disabled: every answer is generated and the mock API is never called.
        let service = MarketDataService::new(Arc::new(MockStockApi::new()), &ApiConfig::default())
            .with_generator(MockGenerator::seeded(3));
        let (tx, rx) = mpsc::unbounded_channel();
        (Session::start(Arc::new(service), RefreshConfig::default(), tx), rx)
    }

    async fn next_matching(
        rx: &mut mpsc::UnboundedReceiver<Action>,
        mut predicate: impl FnMut(&Action) -> bool,
    ) -> Action {
        loop {
            let action = rx.recv().await.unwrap();
            if predicate(&action) {
                return action;
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_trending_updates_reach_the_channel() {
        let (_session, mut rx) = session();

        let action = next_matching(&mut rx, |a| {
            matches!(a, Action::TrendingUpdated(s) if s.data.is_some())
        })
        .await;
        let Action::TrendingUpdated(state) = action else { unreachable!() };
        let quotes = state.data.unwrap();
        assert!(quotes.is_mock());
        assert_eq!(quotes.value.len(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_detail_pollers_follow_symbol_and_range() {
        let (mut session, mut rx) = session();

        session.sync_detail(Some(("AAPL", TimeRange::OneDay))).unwrap();
        assert_eq!(session.detail_symbol(), Some("AAPL"));
        next_matching(&mut rx, |a| {
            matches!(a, Action::DetailsUpdated(s) if s.data.as_ref().is_some_and(|d| d.value.symbol == "AAPL"))
        })
        .await;

        session.sync_detail(Some(("MSFT", TimeRange::OneDay))).unwrap();
        next_matching(&mut rx, |a| {
            matches!(a, Action::DetailsUpdated(s) if s.data.as_ref().is_some_and(|d| d.value.symbol == "MSFT"))
        })
        .await;

        session.sync_detail(Some(("MSFT", TimeRange::OneYear))).unwrap();
        assert_eq!(session.detail_range(), Some(TimeRange::OneYear));
        next_matching(&mut rx, |a| {
            matches!(a, Action::HistoryUpdated(s) if s.data.as_ref().is_some_and(|h| h.value.range == TimeRange::OneYear))
        })
        .await;

        session.sync_detail(None).unwrap();
        assert_eq!(session.detail_symbol(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_is_debounced() {
        let (mut session, mut rx) = session();

        session.schedule_search("a".to_string(), vec![Region::Usa]);
        tokio::time::sleep(Duration::from_millis(100)).await;
        session.schedule_search("appl".to_string(), vec![Region::Usa]);

        let action = next_matching(&mut rx, |a| {
            matches!(a, Action::SearchStarted(_) | Action::SearchResultsLoaded { .. })
        })
        .await;
        assert!(matches!(action, Action::SearchStarted(q) if q == "appl"));

        let action = next_matching(&mut rx, |a| matches!(a, Action::SearchResultsLoaded { .. })).await;
        let Action::SearchResultsLoaded { query, results } = action else { unreachable!() };
        assert_eq!(query, "appl");
        assert!(results.value.iter().any(|r| r.symbol == "AAPL"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_online_refreshes_and_notifies() {
        let (session, mut rx) = session();

        session.on_connectivity(ConnectivityEvent::CameOnline).unwrap();
        let action = next_matching(&mut rx, |a| matches!(a, Action::ShowToast(_))).await;
        let Action::ShowToast(toast) = action else { unreachable!() };
        assert_eq!(toast.level, crate::state::ToastLevel::Success);

        session.on_connectivity(ConnectivityEvent::WentOffline).unwrap();
        let action = next_matching(&mut rx, |a| matches!(a, Action::ShowToast(_))).await;
        let Action::ShowToast(toast) = action else { unreachable!() };
        assert_eq!(toast.level, crate::state::ToastLevel::Offline);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pausing_auto_refresh_reaches_pollers() {
        let (mut session, _rx) = session();
        session.sync_detail(Some(("TSLA", TimeRange::OneDay))).unwrap();

        session.set_auto_refresh(false).unwrap();
        assert!(!session.auto_refresh());

        let mut rx = session.trending.subscribe();
        rx.wait_for(|s| !s.enabled).await.unwrap();
    }
}
