//! Per-symbol detail and chart state.

use super::{Fetched, Region};
use crate::refresh::RefreshState;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Chart time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeRange {
    #[default]
    OneDay,
    FiveDays,
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    FiveYears,
}

impl TimeRange {
    /// All ranges in display order.
    pub const ALL: [TimeRange; 7] = [
        Self::OneDay,
        Self::FiveDays,
        Self::OneMonth,
        Self::ThreeMonths,
        Self::SixMonths,
        Self::OneYear,
        Self::FiveYears,
    ];

    /// Range identifier ("1d", "5d", "1mo", ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneDay => "1d",
            Self::FiveDays => "5d",
            Self::OneMonth => "1mo",
            Self::ThreeMonths => "3mo",
            Self::SixMonths => "6mo",
            Self::OneYear => "1y",
            Self::FiveYears => "5y",
        }
    }

    /// Short button label ("1D", "5D", "1M", ...).
    pub fn label(self) -> &'static str {
        match self {
            Self::OneDay => "1D",
            Self::FiveDays => "5D",
            Self::OneMonth => "1M",
            Self::ThreeMonths => "3M",
            Self::SixMonths => "6M",
            Self::OneYear => "1Y",
            Self::FiveYears => "5Y",
        }
    }

    /// Backend `(period, interval)` query parameters.
    pub fn period_and_interval(self) -> (&'static str, &'static str) {
        match self {
            Self::OneDay => ("1d", "5m"),
            Self::FiveDays => ("5d", "15m"),
            Self::OneMonth => ("1mo", "1d"),
            Self::ThreeMonths => ("3mo", "1d"),
            Self::SixMonths => ("6mo", "1d"),
            Self::OneYear => ("1y", "1wk"),
            Self::FiveYears => ("5y", "1mo"),
        }
    }

    /// Parse a range identifier or label, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s || r.label().to_ascii_lowercase() == s)
    }

    /// The next longer range, wrapping around.
    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|r| *r == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    /// The next shorter range, wrapping around.
    pub fn prev(self) -> Self {
        let i = Self::ALL.iter().position(|r| *r == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Detailed quote data for a single symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockDetails {
    pub symbol: String,
    pub name: String,
    pub price: Decimal,
    pub change: Decimal,
    pub change_percent: Decimal,
    pub currency: String,
    pub exchange: String,
    pub region: Region,
    pub previous_close: Decimal,
    pub open: Decimal,
    pub day_low: Decimal,
    pub day_high: Decimal,
    pub volume: u64,
    pub market_cap: Decimal,
    /// Price/earnings ratio, when known.
    pub pe_ratio: Option<Decimal>,
    pub year_low: Decimal,
    pub year_high: Decimal,
    /// Dividend yield as a fraction (0.012 = 1.2 %).
    pub dividend_yield: Option<Decimal>,
}

impl StockDetails {
    /// Whether the stock is flat or up.
    pub fn is_up(&self) -> bool {
        self.change >= Decimal::ZERO
    }
}

/// One point of a price series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Axis label (time or date).
    pub label: String,
    /// Closing price.
    pub price: Decimal,
}

/// A price series for charting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    pub symbol: String,
    pub range: TimeRange,
    pub points: Vec<PricePoint>,
}

impl PriceHistory {
    /// Whether the series has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Lowest price in the series.
    pub fn min_price(&self) -> Option<Decimal> {
        self.points.iter().map(|p| p.price).min()
    }

    /// Highest price in the series.
    pub fn max_price(&self) -> Option<Decimal> {
        self.points.iter().map(|p| p.price).max()
    }

    /// Change from the first to the last point, in percent.
    pub fn change_percent(&self) -> Option<Decimal> {
        let first = self.points.first()?.price;
        let last = self.points.last()?.price;
        if first.is_zero() {
            return None;
        }
        Some(((last - first) / first * Decimal::ONE_HUNDRED).round_dp(2))
    }

    /// `(index, price)` pairs for plotting.
    pub fn chart_points(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.price.to_f64().map(|price| (i as f64, price)))
            .collect()
    }
}

/// State for the detail view.
#[derive(Debug, Default)]
pub struct DetailState {
    /// Symbol being shown.
    pub symbol: Option<String>,
    /// Chart range.
    pub time_range: TimeRange,
    /// Latest details snapshot.
    pub details: RefreshState<Fetched<StockDetails>>,
    /// Latest history snapshot.
    pub history: RefreshState<Fetched<PriceHistory>>,
}

impl DetailState {
    /// Switch to another symbol, dropping data for the previous one.
    pub fn open(&mut self, symbol: impl Into<String>) {
        let symbol = symbol.into();
        if self.symbol.as_deref() != Some(symbol.as_str()) {
            self.details = RefreshState::default();
            self.history = RefreshState::default();
        }
        self.symbol = Some(symbol);
    }

    /// Loaded details for the current symbol.
    pub fn details(&self) -> Option<&StockDetails> {
        self.details
            .data()
            .map(|d| &d.value)
            .filter(|d| Some(d.symbol.as_str()) == self.symbol.as_deref())
    }

    /// Loaded history for the current symbol.
    pub fn history(&self) -> Option<&PriceHistory> {
        self.history
            .data()
            .map(|h| &h.value)
            .filter(|h| Some(h.symbol.as_str()) == self.symbol.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn history(prices: &[Decimal]) -> PriceHistory {
        PriceHistory {
            symbol: "AAPL".to_string(),
            range: TimeRange::OneMonth,
            points: prices
                .iter()
                .enumerate()
                .map(|(i, p)| PricePoint {
                    label: format!("d{i}"),
                    price: *p,
                })
                .collect(),
        }
    }

    #[test]
    fn test_time_range_cycles() {
        assert_eq!(TimeRange::OneDay.next(), TimeRange::FiveDays);
        assert_eq!(TimeRange::FiveYears.next(), TimeRange::OneDay);
        assert_eq!(TimeRange::OneDay.prev(), TimeRange::FiveYears);
    }

    #[test]
    fn test_time_range_parse_accepts_ids_and_labels() {
        assert_eq!(TimeRange::parse("1mo"), Some(TimeRange::OneMonth));
        assert_eq!(TimeRange::parse("1M"), Some(TimeRange::OneMonth));
        assert_eq!(TimeRange::parse("5Y"), Some(TimeRange::FiveYears));
        assert_eq!(TimeRange::parse("2w"), None);
    }

    #[test]
    fn test_backend_parameters() {
        assert_eq!(TimeRange::OneDay.period_and_interval(), ("1d", "5m"));
        assert_eq!(TimeRange::OneYear.period_and_interval(), ("1y", "1wk"));
        assert_eq!(TimeRange::FiveYears.period_and_interval(), ("5y", "1mo"));
    }

    #[test]
    fn test_history_statistics() {
        let h = history(&[dec!(100), dec!(90), dec!(110)]);
        assert_eq!(h.min_price(), Some(dec!(90)));
        assert_eq!(h.max_price(), Some(dec!(110)));
        assert_eq!(h.change_percent(), Some(dec!(10)));
        assert_eq!(h.chart_points()[1], (1.0, 90.0));
    }

    #[test]
    fn test_empty_history_has_no_statistics() {
        let h = history(&[]);
        assert!(h.is_empty());
        assert_eq!(h.change_percent(), None);
        assert_eq!(h.min_price(), None);
    }

    #[test]
    fn test_open_resets_data_for_new_symbol_only() {
        let mut state = DetailState::default();
        state.open("AAPL");
        state.history.data = Some(Fetched::mock(history(&[dec!(1)])));
        state.open("AAPL");
        assert!(state.history().is_some());

        state.open("MSFT");
        assert!(state.history().is_none());
        assert!(state.history.is_first_load());
    }
}
