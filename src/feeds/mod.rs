//! Fetch functions behind each auto-refreshing view.
//!
//! A feed wraps the [`MarketDataService`](crate::api::MarketDataService) with
//! the per-view policy for failures and empty results, and turns into a
//! [`Fetcher`](crate::refresh::Fetcher) for an
//! [`AutoRefresh`](crate::refresh::AutoRefresh) poller.

mod details;
mod history;
mod trending;

pub use details::DetailsFeed;
pub use history::HistoryFeed;
pub use trending::TrendingFeed;
