//! Trending stocks state.

use super::Fetched;
use crate::refresh::RefreshState;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price quote shown in the trending grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockQuote {
    /// Ticker symbol.
    pub symbol: String,
    /// Company name.
    pub name: String,
    /// Last price.
    pub price: Decimal,
    /// Absolute change since previous close.
    pub change: Decimal,
    /// Change in percent.
    pub change_percent: Decimal,
    /// Quote currency.
    pub currency: String,
}

impl StockQuote {
    /// Whether the quote is flat or up.
    pub fn is_up(&self) -> bool {
        self.change_percent >= Decimal::ZERO
    }
}

/// Reorder `fresh` so that symbols present in `previous` keep their positions.
///
/// Symbols not seen before are placed after all known ones, in the order
/// they arrived.
pub fn preserve_order(previous: &[StockQuote], fresh: Vec<StockQuote>) -> Vec<StockQuote> {
    if previous.is_empty() {
        return fresh;
    }

    let position_of = |symbol: &str| {
        previous
            .iter()
            .position(|q| q.symbol == symbol)
            .unwrap_or(previous.len())
    };

    let mut ranked: Vec<(usize, StockQuote)> = fresh
        .into_iter()
        .map(|q| (position_of(&q.symbol), q))
        .collect();
    ranked.sort_by_key(|(position, _)| *position);
    ranked.into_iter().map(|(_, q)| q).collect()
}

/// State for the trending view.
#[derive(Debug, Default)]
pub struct TrendingState {
    /// Latest poller snapshot.
    pub feed: RefreshState<Fetched<Vec<StockQuote>>>,
    /// Currently selected row.
    pub selected_index: Option<usize>,
}

impl TrendingState {
    /// Loaded quotes, empty before the first fetch.
    pub fn quotes(&self) -> &[StockQuote] {
        self.feed
            .data()
            .map(|fetched| fetched.value.as_slice())
            .unwrap_or_default()
    }

    /// The selected quote.
    pub fn selected_quote(&self) -> Option<&StockQuote> {
        self.selected_index.and_then(|i| self.quotes().get(i))
    }

    /// Whether the shown quotes are synthetic.
    pub fn is_mock(&self) -> bool {
        self.feed.data().is_some_and(Fetched::is_mock)
    }

    /// Clamp the selection to the loaded rows.
    pub fn clamp_selection(&mut self) {
        let len = self.quotes().len();
        self.selected_index = match (self.selected_index, len) {
            (_, 0) => None,
            (None, _) => Some(0),
            (Some(i), len) => Some(i.min(len - 1)),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn quote(symbol: &str, change_percent: Decimal) -> StockQuote {
        StockQuote {
            symbol: symbol.to_string(),
            name: format!("{symbol} Inc."),
            price: dec!(100),
            change: change_percent,
            change_percent,
            currency: "USD".to_string(),
        }
    }

    fn symbols(quotes: &[StockQuote]) -> Vec<&str> {
        quotes.iter().map(|q| q.symbol.as_str()).collect()
    }

    #[test]
    fn test_preserve_order_keeps_previous_positions() {
        let previous = vec![quote("AAPL", dec!(1)), quote("MSFT", dec!(2)), quote("TSLA", dec!(3))];
        let fresh = vec![quote("TSLA", dec!(9)), quote("AAPL", dec!(5)), quote("MSFT", dec!(1))];

        let ordered = preserve_order(&previous, fresh);
        assert_eq!(symbols(&ordered), vec!["AAPL", "MSFT", "TSLA"]);
        assert_eq!(ordered[2].change_percent, dec!(9));
    }

    #[test]
    fn test_preserve_order_appends_new_symbols() {
        let previous = vec![quote("AAPL", dec!(1)), quote("MSFT", dec!(2))];
        let fresh = vec![quote("NVDA", dec!(4)), quote("MSFT", dec!(1)), quote("META", dec!(2))];

        let ordered = preserve_order(&previous, fresh);
        assert_eq!(symbols(&ordered), vec!["MSFT", "NVDA", "META"]);
    }

    #[test]
    fn test_preserve_order_without_history_is_identity() {
        let fresh = vec![quote("B", dec!(1)), quote("A", dec!(2))];
        assert_eq!(symbols(&preserve_order(&[], fresh)), vec!["B", "A"]);
    }

    #[test]
    fn test_clamp_selection() {
        let mut state = TrendingState::default();
        state.clamp_selection();
        assert_eq!(state.selected_index, None);

        state.feed.data = Some(Fetched::mock(vec![quote("A", dec!(1)), quote("B", dec!(1))]));
        state.clamp_selection();
        assert_eq!(state.selected_index, Some(0));

        state.selected_index = Some(5);
        state.clamp_selection();
        assert_eq!(state.selected_index, Some(1));
        assert_eq!(state.selected_quote().map(|q| q.symbol.as_str()), Some("B"));
    }
}
