//! Market data with fallback to generated data.

use super::client::{ApiResult, HttpStockApi, StockApi};
use super::{ApiError, ApiErrorKind};
use crate::config::ApiConfig;
use crate::error::Result;
use crate::mock::{DEFAULT_TRENDING_COUNT, MockGenerator};
use crate::state::{
    Fetched, PriceHistory, Region, SearchResult, StockDetails, StockQuote, TimeRange,
};
use chrono::Local;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Maximum number of search results returned.
const MAX_SEARCH_RESULTS: usize = 10;

/// Market data access shared by all feeds.
///
/// Once a backend call fails, the service switches to generated data for
/// every later call except search until
/// [`reset_availability`](Self::reset_availability) is called.
pub struct MarketDataService {
    api: Arc<dyn StockApi>,
    remote_enabled: bool,
    fallback_to_mock: bool,
    trending_count: usize,
    using_mock: AtomicBool,
    generator: Mutex<MockGenerator>,
}

impl std::fmt::Debug for MarketDataService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketDataService")
            .field("remote_enabled", &self.remote_enabled)
            .field("fallback_to_mock", &self.fallback_to_mock)
            .field("using_mock", &self.is_using_mock())
            .finish_non_exhaustive()
    }
}

impl MarketDataService {
    /// Service over an arbitrary backend.
    pub fn new(api: Arc<dyn StockApi>, config: &ApiConfig) -> Self {
        Self {
            api,
            remote_enabled: config.enabled,
            fallback_to_mock: config.fallback_to_mock,
            trending_count: DEFAULT_TRENDING_COUNT,
            using_mock: AtomicBool::new(false),
            generator: Mutex::new(MockGenerator::new()),
        }
    }

    /// Service over the HTTP backend described by `config`.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let api = HttpStockApi::new(config.clone())?;
        info!(
            base_url = api.base_url(),
            enabled = config.enabled,
            "market data backend configured"
        );
        Ok(Self::new(Arc::new(api), config))
    }

    /// Set how many quotes generated trending lists contain.
    pub fn with_trending_count(mut self, count: usize) -> Self {
        self.trending_count = count.max(1);
        self
    }

    /// Replace the generator, e.g. with a seeded one.
    pub fn with_generator(mut self, generator: MockGenerator) -> Self {
        self.generator = Mutex::new(generator);
        self
    }

    /// Whether calls are currently answered with generated data.
    pub fn is_using_mock(&self) -> bool {
        self.using_mock.load(Ordering::SeqCst)
    }

    /// Forget a previous backend failure.
    pub fn reset_availability(&self) {
        if self.using_mock.swap(false, Ordering::SeqCst) {
            info!("backend availability reset");
        }
    }

    fn mark_unavailable(&self) {
        if !self.using_mock.swap(true, Ordering::SeqCst) {
            info!("switching to generated market data");
        }
    }

    fn serve_mock(&self) -> bool {
        self.fallback_to_mock && self.is_using_mock()
    }

    fn generator(&self) -> MutexGuard<'_, MockGenerator> {
        self.generator.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether the backend should be asked at all.
    pub async fn check_backend_availability(&self) -> bool {
        if self.is_using_mock() {
            return false;
        }
        if !self.remote_enabled {
            self.mark_unavailable();
            return false;
        }
        let available = self.api.probe().await;
        if !available {
            self.mark_unavailable();
        }
        available
    }

    async fn call<T, F, Fut>(&self, operation: &'static str, request: F) -> ApiResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = ApiResult<T>>,
    {
        if !self.remote_enabled {
            return Err(ApiError::new(
                ApiErrorKind::Network,
                "remote data source disabled",
            ));
        }
        let result = request().await;
        if let Err(e) = &result {
            if e.is_canceled() {
                debug!(operation, "request canceled");
            } else {
                warn!(operation, code = e.kind.code(), error = %e, "backend request failed");
            }
        }
        result
    }

    /// Detailed quote, generated when the backend is unavailable.
    pub async fn stock_details(&self, symbol: &str) -> Result<Fetched<StockDetails>> {
        if self.serve_mock() {
            return Ok(Fetched::mock(self.generator().details(symbol)));
        }
        match self
            .call("stock_details", || self.api.stock_details(symbol))
            .await
        {
            Ok(details) => Ok(Fetched::live(details)),
            Err(e) => {
                self.mark_unavailable();
                if self.fallback_to_mock {
                    Ok(Fetched::mock(self.generator().details(symbol)))
                } else {
                    Err(e.into())
                }
            }
        }
    }

    /// Price history, generated when the backend is unavailable.
    pub async fn stock_history(
        &self,
        symbol: &str,
        range: TimeRange,
    ) -> Result<Fetched<PriceHistory>> {
        if self.serve_mock() {
            return Ok(Fetched::mock(self.mock_history(symbol, range)));
        }
        match self
            .call("stock_history", || self.api.stock_history(symbol, range))
            .await
        {
            Ok(history) => Ok(Fetched::live(history)),
            Err(e) => {
                self.mark_unavailable();
                if self.fallback_to_mock {
                    Ok(Fetched::mock(self.mock_history(symbol, range)))
                } else {
                    Err(e.into())
                }
            }
        }
    }

    /// Trending quotes, generated when the backend is unavailable.
    pub async fn trending(&self) -> Result<Fetched<Vec<StockQuote>>> {
        if self.serve_mock() {
            return Ok(Fetched::mock(self.mock_trending()));
        }
        match self.call("trending", || self.api.trending()).await {
            Ok(quotes) => Ok(Fetched::live(quotes)),
            Err(e) => {
                self.mark_unavailable();
                if self.fallback_to_mock {
                    Ok(Fetched::mock(self.mock_trending()))
                } else {
                    Err(e.into())
                }
            }
        }
    }

    /// Search restricted to `regions`.
    ///
    /// The backend is always asked. Failures fall back to catalog matches
    /// when fallback is enabled or the backend already failed before, and
    /// never switch other calls to generated data.
    pub async fn search(
        &self,
        query: &str,
        regions: &[Region],
    ) -> Result<Fetched<Vec<SearchResult>>> {
        match self.call("search", || self.api.search(query)).await {
            Ok(results) => Ok(Fetched::live(
                results
                    .into_iter()
                    .filter(|r| regions.contains(&r.region))
                    .take(MAX_SEARCH_RESULTS)
                    .collect(),
            )),
            Err(e) => {
                let fall_back = self.fallback_to_mock || self.is_using_mock();
                if fall_back {
                    Ok(Fetched::mock(self.generator().search(query, regions)))
                } else {
                    Err(e.into())
                }
            }
        }
    }

    /// A freshly generated trending list.
    pub fn mock_trending(&self) -> Vec<StockQuote> {
        self.generator()
            .trending(self.trending_count, Region::Usa)
    }

    /// The given quotes with freshly generated changes.
    pub fn jitter_quotes(&self, quotes: &[StockQuote]) -> Vec<StockQuote> {
        self.generator().jitter_quotes(quotes)
    }

    fn mock_history(&self, symbol: &str, range: TimeRange) -> PriceHistory {
        self.generator()
            .history(symbol, range, Local::now().naive_local())
    }
}
