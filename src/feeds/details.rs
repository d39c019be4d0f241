use crate::api::MarketDataService;
use crate::error::Result;
use crate::refresh::{Fetcher, fetcher};
use crate::state::{Fetched, StockDetails};
use std::sync::Arc;

/// Detailed quote for one symbol.
#[derive(Debug, Clone)]
pub struct DetailsFeed {
    service: Arc<MarketDataService>,
    symbol: String,
}

impl DetailsFeed {
    pub fn new(service: Arc<MarketDataService>, symbol: impl Into<String>) -> Self {
        Self {
            service,
            symbol: symbol.into(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub async fn next(&self) -> Result<Fetched<StockDetails>> {
        self.service.stock_details(&self.symbol).await
    }

    /// Fetcher for a poller.
    pub fn into_fetcher(self) -> Fetcher<Fetched<StockDetails>> {
        let feed = Arc::new(self);
        fetcher(move || {
            let feed = Arc::clone(&feed);
            async move { feed.next().await }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, ApiErrorKind, MockStockApi};
    use crate::config::ApiConfig;
    use crate::refresh::{AutoRefresh, RefreshOptions};
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_poller_serves_generated_details_after_failure() {
        let mut api = MockStockApi::new();
        api.expect_stock_details()
            .times(1)
            .returning(|_| Err(ApiError::new(ApiErrorKind::Network, "refused")));
        let config = ApiConfig {
            enabled: true,
            ..ApiConfig::default()
        };
        let service = Arc::new(MarketDataService::new(Arc::new(api), &config));

        let handle = AutoRefresh::spawn(
            DetailsFeed::new(service, "TSLA").into_fetcher(),
            RefreshOptions::every(Duration::from_secs(1)),
        );
        let mut rx = handle.subscribe();
        let state = rx
            .wait_for(|s| s.refresh_count >= 3)
            .await
            .unwrap()
            .clone();

        let details = state.data.unwrap();
        assert!(details.is_mock());
        assert_eq!(details.value.symbol, "TSLA");
        assert!(state.error.is_none());
    }
}
