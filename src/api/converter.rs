//! Backend wire formats and their conversion to internal state types.

use crate::mock::catalog;
use crate::state::{
    PriceHistory, PricePoint, Region, SearchResult, StockDetails, StockQuote, TimeRange,
};
use rust_decimal::Decimal;
use serde::Deserialize;

/// A row of `GET /search`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireSearchResult {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub exchange: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// A row of `GET /trending`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireQuote {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub change: Decimal,
    #[serde(default)]
    pub change_percent: Option<Decimal>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Body of `GET /stock/{symbol}/info`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireStockInfo {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub change: Decimal,
    #[serde(default)]
    pub change_percent: Option<Decimal>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub exchange: Option<String>,
    #[serde(default)]
    pub market_cap: Decimal,
    #[serde(default)]
    pub volume: u64,
    #[serde(default, alias = "dayHigh")]
    pub high: Decimal,
    #[serde(default, alias = "dayLow")]
    pub low: Decimal,
    #[serde(default)]
    pub open: Decimal,
    #[serde(default)]
    pub previous_close: Decimal,
    #[serde(default, alias = "yearHigh")]
    pub fifty_two_week_high: Decimal,
    #[serde(default, alias = "yearLow")]
    pub fifty_two_week_low: Decimal,
    #[serde(default, alias = "pe")]
    pub trailing_pe: Option<Decimal>,
    /// Percent, e.g. 0.5 for half a percent.
    #[serde(default)]
    pub dividend_yield: Option<Decimal>,
}

/// A row of `GET /stock/{symbol}/history`.
#[derive(Debug, Clone, Deserialize)]
pub struct WireHistoryRow {
    pub date: String,
    #[serde(default)]
    pub open: Decimal,
    #[serde(default)]
    pub high: Decimal,
    #[serde(default)]
    pub low: Decimal,
    pub close: Decimal,
    #[serde(default)]
    pub volume: u64,
}

/// Converts API responses to internal state types.
pub struct DataConverter;

impl DataConverter {
    pub fn convert_search_result(row: WireSearchResult) -> SearchResult {
        let symbol = row.symbol.to_uppercase();
        SearchResult {
            name: row.name.unwrap_or_else(|| catalog::company_name(&symbol)),
            exchange: row
                .exchange
                .unwrap_or_else(|| catalog::exchange_for(&symbol)),
            region: Region::from_symbol(&symbol),
            kind: row.kind.unwrap_or_else(|| "Equity".to_string()),
            symbol,
        }
    }

    pub fn convert_quote(row: WireQuote) -> StockQuote {
        let change_percent = row
            .change_percent
            .unwrap_or_else(|| percent_of(row.change, row.price));
        StockQuote {
            name: row.name.unwrap_or_else(|| row.symbol.clone()),
            currency: row
                .currency
                .unwrap_or_else(|| Region::from_symbol(&row.symbol).currency().to_string()),
            symbol: row.symbol,
            price: row.price,
            change: row.change,
            change_percent,
        }
    }

    pub fn convert_details(info: WireStockInfo) -> StockDetails {
        let region = Region::from_symbol(&info.symbol);
        let change_percent = info
            .change_percent
            .unwrap_or_else(|| percent_of(info.change, info.price));
        StockDetails {
            name: info.name.unwrap_or_else(|| info.symbol.clone()),
            currency: info
                .currency
                .unwrap_or_else(|| region.currency().to_string()),
            exchange: info
                .exchange
                .unwrap_or_else(|| catalog::exchange_for(&info.symbol)),
            region,
            price: info.price,
            change: info.change,
            change_percent,
            previous_close: info.previous_close,
            open: info.open,
            day_low: info.low,
            day_high: info.high,
            volume: info.volume,
            market_cap: info.market_cap,
            pe_ratio: info.trailing_pe.filter(|pe| !pe.is_zero()),
            year_low: info.fifty_two_week_low,
            year_high: info.fifty_two_week_high,
            dividend_yield: info
                .dividend_yield
                .filter(|y| !y.is_zero())
                .map(|y| y / Decimal::ONE_HUNDRED),
            symbol: info.symbol,
        }
    }

    pub fn convert_history(symbol: &str, range: TimeRange, rows: Vec<WireHistoryRow>) -> PriceHistory {
        PriceHistory {
            symbol: symbol.to_string(),
            range,
            points: rows
                .into_iter()
                .map(|row| PricePoint {
                    label: row.date,
                    price: row.close,
                })
                .collect(),
        }
    }
}

/// Change relative to the previous close, zero when it cannot be represented.
fn percent_of(change: Decimal, price: Decimal) -> Decimal {
    price
        .checked_sub(change)
        .and_then(|previous| change.checked_div(previous))
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map_or(Decimal::ZERO, |percent| percent.round_dp(2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_history_rows_use_close_price() {
        let rows: Vec<WireHistoryRow> = serde_json::from_str(
            r#"[
                {"date": "2024-01-02", "open": 1.0, "high": 2.0, "low": 0.5, "close": 1.5, "volume": 10},
                {"date": "2024-01-03", "close": 1.75}
            ]"#,
        )
        .unwrap();

        let history = DataConverter::convert_history("AAPL", TimeRange::OneMonth, rows);
        assert_eq!(history.points.len(), 2);
        assert_eq!(history.points[0].label, "2024-01-02");
        assert_eq!(history.points[1].price, dec!(1.75));
    }

    #[test]
    fn test_details_from_camel_case_body() {
        let info: WireStockInfo = serde_json::from_str(
            r#"{
                "symbol": "VOD.L", "name": "Vodafone", "price": 70, "change": 2,
                "marketCap": 1000, "volume": 5, "high": 71, "low": 68,
                "previousClose": 68, "fiftyTwoWeekHigh": 90, "fiftyTwoWeekLow": 50,
                "trailingPE": 0, "dividendYield": 5
            }"#,
        )
        .unwrap();

        let details = DataConverter::convert_details(info);
        assert_eq!(details.region, Region::Uk);
        assert_eq!(details.currency, "GBP");
        assert_eq!(details.exchange, "LSE");
        assert_eq!(details.day_high, dec!(71));
        assert_eq!(details.previous_close, dec!(68));
        assert_eq!(details.change_percent, dec!(2.94));
        assert_eq!(details.pe_ratio, None);
        assert_eq!(details.dividend_yield, Some(dec!(0.05)));
    }

    #[test]
    fn test_search_result_defaults() {
        let row: WireSearchResult =
            serde_json::from_str(r#"{"symbol": "comi.ca", "name": "CIB"}"#).unwrap();
        let result = DataConverter::convert_search_result(row);
        assert_eq!(result.symbol, "COMI.CA");
        assert_eq!(result.exchange, "EGX");
        assert_eq!(result.region, Region::Egypt);
        assert_eq!(result.kind, "Equity");
    }

    #[test]
    fn test_quote_keeps_reported_percent() {
        let row: WireQuote = serde_json::from_str(
            r#"{"symbol": "AAPL", "price": 100, "change": 5, "changePercent": 4.9}"#,
        )
        .unwrap();
        let quote = DataConverter::convert_quote(row);
        assert_eq!(quote.change_percent, dec!(4.9));
        assert_eq!(quote.currency, "USD");
        assert_eq!(quote.name, "AAPL");
    }

    #[test]
    fn test_percent_of_out_of_range_values_is_zero() {
        assert_eq!(percent_of(dec!(5), dec!(105)), dec!(5));
        assert_eq!(percent_of(dec!(3), dec!(3)), Decimal::ZERO);
        assert_eq!(percent_of(dec!(1), dec!(1.0000000000000000000000000001)), Decimal::ZERO);
        assert_eq!(percent_of(Decimal::MAX, Decimal::MAX - dec!(1)), Decimal::ZERO);
        assert_eq!(percent_of(Decimal::MAX, dec!(-1)), Decimal::ZERO);
    }
}
