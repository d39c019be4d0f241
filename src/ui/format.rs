//! Number and time formatting for display.

use chrono::{DateTime, Local, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Value with an explicit sign and two decimals, e.g. `+1.50` or `-0.25`.
pub fn signed(value: Decimal) -> String {
    let value = value.round_dp(2);
    if value.is_zero() {
        "+0.00".to_string()
    } else if value > Decimal::ZERO {
        format!("+{value:.2}")
    } else {
        format!("{value:.2}")
    }
}

/// Signed percentage, e.g. `+1.25%`.
pub fn percent(value: Decimal) -> String {
    format!("{}%", signed(value))
}

/// Absolute and relative change, e.g. `+1.50 (+0.84%)`.
pub fn change(change: Decimal, change_percent: Decimal) -> String {
    format!("{} ({})", signed(change), percent(change_percent))
}

/// Price with its currency symbol, or the currency code when there is none.
pub fn price(value: Decimal, currency: &str) -> String {
    let value = value.round_dp(2);
    let symbol = match currency {
        "" | "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "JPY" | "CNY" => Some("¥"),
        _ => None,
    };
    match symbol {
        Some(symbol) => format!("{symbol}{value:.2}"),
        None => format!("{value:.2} {currency}"),
    }
}

/// Market capitalization in billions, `N/A` when unknown.
pub fn market_cap(value: Decimal) -> String {
    if value <= Decimal::ZERO {
        return "N/A".to_string();
    }
    format!("{:.2}B", (value / Decimal::from(1_000_000_000u64)).round_dp(2))
}

/// Integer with thousands separators, e.g. `12,345,678`.
pub fn thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Volume with separators, `N/A` when zero.
pub fn volume(value: u64) -> String {
    if value == 0 {
        "N/A".to_string()
    } else {
        thousands(value)
    }
}

/// Optional ratio with two decimals.
pub fn ratio(value: Option<Decimal>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{:.2}", v.round_dp(2)))
}

/// Fraction as a percentage, e.g. `0.0125` as `1.25%`.
pub fn fraction_percent(value: Option<Decimal>) -> String {
    value.map_or_else(
        || "N/A".to_string(),
        |v| format!("{:.2}%", (v * Decimal::ONE_HUNDRED).round_dp(2)),
    )
}

/// Local wall-clock time of the last update, `Never` before the first one.
pub fn last_updated(at: Option<DateTime<Utc>>) -> String {
    match at {
        Some(at) => at.with_timezone(&Local).format("%H:%M:%S").to_string(),
        None => "Never".to_string(),
    }
}

/// Low and high of a range, e.g. `98.10 - 104.20`.
pub fn range(low: Decimal, high: Decimal) -> String {
    format!("{:.2} - {:.2}", low.round_dp(2), high.round_dp(2))
}

/// Chart axis value.
pub fn axis(value: f64) -> String {
    format!("{value:.2}")
}

/// Decimal as f64 for plotting, zero when out of range.
pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_signed_values() {
        assert_eq!(signed(dec!(1.5)), "+1.50");
        assert_eq!(signed(dec!(-0.254)), "-0.25");
        assert_eq!(signed(Decimal::ZERO), "+0.00");
        assert_eq!(change(dec!(2.1), dec!(-0.5)), "+2.10 (-0.50%)");
    }

    #[test]
    fn test_price_uses_currency_symbol() {
        assert_eq!(price(dec!(187.2), "USD"), "$187.20");
        assert_eq!(price(dec!(71.9), "EGP"), "71.90 EGP");
        assert_eq!(price(dec!(3), "GBP"), "£3.00");
    }

    #[test]
    fn test_market_cap_in_billions() {
        assert_eq!(market_cap(dec!(2950000000000)), "2950.00B");
        assert_eq!(market_cap(dec!(1234000000)), "1.23B");
        assert_eq!(market_cap(Decimal::ZERO), "N/A");
    }

    #[test]
    fn test_thousands_separators() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1_000), "1,000");
        assert_eq!(thousands(12_345_678), "12,345,678");
        assert_eq!(volume(0), "N/A");
    }

    #[test]
    fn test_optional_values() {
        assert_eq!(ratio(None), "N/A");
        assert_eq!(ratio(Some(dec!(28.456))), "28.46");
        assert_eq!(fraction_percent(Some(dec!(0.0125))), "1.25%");
    }

    #[test]
    fn test_missing_timestamp_is_never() {
        assert_eq!(last_updated(None), "Never");
        assert_eq!(last_updated(Some(Utc::now())).len(), 8);
    }
}
