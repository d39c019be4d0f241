use crate::api::MarketDataService;
use crate::error::Result;
use crate::refresh::{Fetcher, fetcher};
use crate::state::{Fetched, PriceHistory, TimeRange};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Price series for one symbol and range.
///
/// The last non-empty series is kept and served again when a later fetch
/// fails or comes back empty, so the chart does not blank out.
#[derive(Debug)]
pub struct HistoryFeed {
    service: Arc<MarketDataService>,
    symbol: String,
    range: TimeRange,
    remembered: Mutex<Option<Fetched<PriceHistory>>>,
}

impl HistoryFeed {
    pub fn new(service: Arc<MarketDataService>, symbol: impl Into<String>, range: TimeRange) -> Self {
        Self {
            service,
            symbol: symbol.into(),
            range,
            remembered: Mutex::new(None),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn range(&self) -> TimeRange {
        self.range
    }

    /// Fetch the next series.
    pub async fn next(&self) -> Result<Fetched<PriceHistory>> {
        self.service.check_backend_availability().await;

        match self.service.stock_history(&self.symbol, self.range).await {
            Ok(fetched) if !fetched.value.is_empty() => {
                *self.lock() = Some(fetched.clone());
                Ok(fetched)
            }
            Ok(empty) => {
                debug!(symbol = %self.symbol, range = %self.range, "empty history");
                Ok(self.remembered().unwrap_or(empty))
            }
            Err(e) => match self.remembered() {
                Some(previous) => {
                    debug!(symbol = %self.symbol, error = %e, "serving remembered history");
                    Ok(previous)
                }
                None => Err(e),
            },
        }
    }

    /// Fetcher for a poller.
    pub fn into_fetcher(self: Arc<Self>) -> Fetcher<Fetched<PriceHistory>> {
        fetcher(move || {
            let feed = Arc::clone(&self);
            async move { feed.next().await }
        })
    }

    fn remembered(&self) -> Option<Fetched<PriceHistory>> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Fetched<PriceHistory>>> {
        self.remembered.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, ApiErrorKind, MockStockApi};
    use crate::config::ApiConfig;
    use crate::state::{DataSource, PricePoint};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn series(len: usize) -> PriceHistory {
        PriceHistory {
            symbol: "AAPL".to_string(),
            range: TimeRange::OneMonth,
            points: (0..len)
                .map(|i| PricePoint {
                    label: format!("d{i}"),
                    price: dec!(10),
                })
                .collect(),
        }
    }

    fn feed(api: MockStockApi) -> HistoryFeed {
        let config = ApiConfig {
            enabled: true,
            fallback_to_mock: false,
            ..ApiConfig::default()
        };
        let service = MarketDataService::new(Arc::new(api), &config);
        HistoryFeed::new(Arc::new(service), "AAPL", TimeRange::OneMonth)
    }

    #[tokio::test]
    async fn test_empty_result_serves_remembered_series() {
        let mut api = MockStockApi::new();
        api.expect_probe().returning(|| true);
        let mut round = 0;
        api.expect_stock_history()
            .withf(|symbol, range| symbol == "AAPL" && *range == TimeRange::OneMonth)
            .times(2)
            .returning(move |_, _| {
                round += 1;
                Ok(series(if round == 1 { 3 } else { 0 }))
            });
        let feed = feed(api);

        assert_eq!(feed.next().await.unwrap().value.points.len(), 3);
        let second = feed.next().await.unwrap();
        assert_eq!(second.value.points.len(), 3);
        assert_eq!(second.source, DataSource::Live);
    }

    #[tokio::test]
    async fn test_error_serves_remembered_series() {
        let mut api = MockStockApi::new();
        api.expect_probe().returning(|| true);
        let mut round = 0;
        api.expect_stock_history().times(2).returning(move |_, _| {
            round += 1;
            if round == 1 {
                Ok(series(5))
            } else {
                Err(ApiError::new(ApiErrorKind::Timeout, "slow"))
            }
        });
        let feed = feed(api);

        feed.next().await.unwrap();
        assert_eq!(feed.next().await.unwrap().value.points.len(), 5);
    }

    #[tokio::test]
    async fn test_error_without_history_propagates() {
        let mut api = MockStockApi::new();
        api.expect_probe().returning(|| true);
        api.expect_stock_history()
            .returning(|_, _| Err(ApiError::new(ApiErrorKind::NotFound, "404")));
        let feed = feed(api);

        assert!(feed.next().await.is_err());
    }

    #[tokio::test]
    async fn test_empty_first_result_is_returned_as_is() {
        let mut api = MockStockApi::new();
        api.expect_probe().returning(|| true);
        api.expect_stock_history().returning(|_, _| Ok(series(0)));
        let feed = feed(api);

        assert!(feed.next().await.unwrap().value.is_empty());
    }
}
