//! Market data backend client.

use super::converter::{
    DataConverter, WireHistoryRow, WireQuote, WireSearchResult, WireStockInfo,
};
use super::{ApiError, ApiErrorKind};
use crate::config::ApiConfig;
use crate::state::{PriceHistory, SearchResult, StockDetails, StockQuote, TimeRange};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Result of a backend request.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Operations offered by a market data backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StockApi: Send + Sync {
    /// Search symbols and company names.
    async fn search(&self, query: &str) -> ApiResult<Vec<SearchResult>>;

    /// Detailed quote for one symbol.
    async fn stock_details(&self, symbol: &str) -> ApiResult<StockDetails>;

    /// Price series for one symbol.
    async fn stock_history(&self, symbol: &str, range: TimeRange) -> ApiResult<PriceHistory>;

    /// Most active stocks.
    async fn trending(&self) -> ApiResult<Vec<StockQuote>>;

    /// Whether the backend answers at all.
    async fn probe(&self) -> bool;
}

/// Builder for creating an HTTP client.
pub struct HttpStockApiBuilder {
    config: ApiConfig,
}

impl HttpStockApiBuilder {
    /// Create a new builder with default config.
    pub fn new() -> Self {
        Self {
            config: ApiConfig::default(),
        }
    }

    /// Set the API configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Build the client.
    pub fn build(self) -> crate::Result<HttpStockApi> {
        HttpStockApi::new(self.config)
    }
}

impl Default for HttpStockApiBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// [`StockApi`] over the JSON HTTP backend.
pub struct HttpStockApi {
    base_url: String,
    probe_timeout: Duration,
    http: reqwest::Client,
}

impl HttpStockApi {
    /// Create a new client.
    pub fn new(config: ApiConfig) -> crate::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .map_err(ApiError::from)?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            probe_timeout: config.probe_timeout(),
            http,
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> ApiResult<T> {
        let url = self.url(path);
        tracing::debug!(%url, "GET");
        let response = self.http.get(&url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::from_status(status));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

fn symbol_path(symbol: &str) -> ApiResult<String> {
    let symbol = symbol.trim();
    if symbol.is_empty() || symbol.contains('/') {
        return Err(ApiError::new(
            ApiErrorKind::BadRequest,
            format!("invalid symbol {symbol:?}"),
        ));
    }
    Ok(symbol.to_uppercase())
}

#[async_trait]
impl StockApi for HttpStockApi {
    async fn search(&self, query: &str) -> ApiResult<Vec<SearchResult>> {
        let rows: Vec<WireSearchResult> = self.get_json("/search", &[("q", query)]).await?;
        Ok(rows
            .into_iter()
            .map(DataConverter::convert_search_result)
            .collect())
    }

    async fn stock_details(&self, symbol: &str) -> ApiResult<StockDetails> {
        let symbol = symbol_path(symbol)?;
        let info: WireStockInfo = self.get_json(&format!("/stock/{symbol}/info"), &[]).await?;
        Ok(DataConverter::convert_details(info))
    }

    async fn stock_history(&self, symbol: &str, range: TimeRange) -> ApiResult<PriceHistory> {
        let symbol = symbol_path(symbol)?;
        let (period, interval) = range.period_and_interval();
        let rows: Vec<WireHistoryRow> = self
            .get_json(
                &format!("/stock/{symbol}/history"),
                &[("period", period), ("interval", interval)],
            )
            .await?;
        Ok(DataConverter::convert_history(&symbol, range, rows))
    }

    async fn trending(&self) -> ApiResult<Vec<StockQuote>> {
        let rows: Vec<WireQuote> = self.get_json("/trending", &[]).await?;
        Ok(rows.into_iter().map(DataConverter::convert_quote).collect())
    }

    async fn probe(&self) -> bool {
        // Any HTTP status means the server is up.
        match self
            .http
            .head(&self.base_url)
            .timeout(self.probe_timeout)
            .send()
            .await
        {
            Ok(response) => {
                tracing::trace!(status = %response.status(), "backend probe answered");
                true
            }
            Err(e) => {
                tracing::debug!(error = %e, "backend probe failed");
                false
            }
        }
    }
}
