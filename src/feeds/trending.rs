use crate::api::MarketDataService;
use crate::error::Result;
use crate::refresh::{Fetcher, fetcher};
use crate::state::{Fetched, StockQuote, preserve_order};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::warn;

/// Trending quotes with a stable display order.
#[derive(Debug)]
pub struct TrendingFeed {
    service: Arc<MarketDataService>,
    previous: Mutex<Vec<StockQuote>>,
}

impl TrendingFeed {
    pub fn new(service: Arc<MarketDataService>) -> Self {
        Self {
            service,
            previous: Mutex::new(Vec::new()),
        }
    }

    /// Fetch the next list.
    ///
    /// Symbols already shown keep their rows. When the fetch fails the last
    /// list is re-served with new random changes, or a generated list if
    /// nothing was shown yet.
    pub async fn next(&self) -> Result<Fetched<Vec<StockQuote>>> {
        self.service.check_backend_availability().await;

        let fetched = match self.service.trending().await {
            Ok(fetched) => {
                let previous = self.previous();
                fetched.map(|quotes| preserve_order(&previous, quotes))
            }
            Err(e) => {
                warn!(error = %e, "trending fetch failed, serving generated quotes");
                let previous = self.previous();
                if previous.is_empty() {
                    Fetched::mock(self.service.mock_trending())
                } else {
                    Fetched::mock(self.service.jitter_quotes(&previous))
                }
            }
        };

        *self.previous.lock().unwrap_or_else(PoisonError::into_inner) = fetched.value.clone();
        Ok(fetched)
    }

    /// Fetcher for a poller.
    pub fn into_fetcher(self: Arc<Self>) -> Fetcher<Fetched<Vec<StockQuote>>> {
        fetcher(move || {
            let feed = Arc::clone(&self);
            async move { feed.next().await }
        })
    }

    fn previous(&self) -> Vec<StockQuote> {
        self.previous
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
