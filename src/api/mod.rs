//! Market data API integration.
//!
//! This module provides the HTTP backend client, the classification of its
//! failures, the conversion of its wire formats, and the service that
//! falls back to generated data when the backend is disabled or failing.

mod client;
mod converter;
mod failure;
mod service;

pub use client::{ApiResult, HttpStockApi, HttpStockApiBuilder, StockApi};
pub use converter::DataConverter;
pub use failure::{ApiError, ApiErrorKind};
pub use service::MarketDataService;

#[cfg(test)]
pub use client::MockStockApi;
