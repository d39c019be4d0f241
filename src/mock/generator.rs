//! Random but plausible market data.

use super::catalog;
use crate::state::{
    PriceHistory, PricePoint, Region, SearchResult, StockDetails, StockQuote, TimeRange,
};
use chrono::{Datelike, Duration as ChronoDuration, Months, NaiveDateTime, NaiveTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

/// Number of quotes in a generated trending list.
pub const DEFAULT_TRENDING_COUNT: usize = 10;

/// Minimum number of points in a generated series.
const MIN_HISTORY_POINTS: usize = 10;

/// Relative step size of the random walk.
const VOLATILITY: f64 = 0.02;

/// Upward drift for long ranges.
const LONG_RANGE_TREND: f64 = 0.002;

/// Generator of synthetic quotes, details, series and search results.
#[derive(Debug)]
pub struct MockGenerator {
    rng: StdRng,
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGenerator {
    /// Generator seeded from the OS.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible generator.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Detailed quote at the symbol's reference price.
    pub fn details(&mut self, symbol: &str) -> StockDetails {
        let symbol = symbol.trim().to_uppercase();
        let base = catalog::base_price(&symbol);
        let base_f = base.to_f64().unwrap_or_default();
        let region = Region::from_symbol(&symbol);

        let change = cents(self.rng.random_range(-5.0..5.0));
        let market_cap_shares: u64 = self.rng.random_range(500_000_000..1_500_000_000);

        StockDetails {
            name: catalog::company_name(&symbol),
            price: base,
            change,
            change_percent: percent(change, base),
            currency: region.currency().to_string(),
            exchange: catalog::exchange_for(&symbol),
            region,
            previous_close: base - change,
            open: cents(base_f - self.rng.random_range(0.0..2.0)),
            day_low: cents(base_f - (self.rng.random_range(0.0..5.0) + 2.0)),
            day_high: cents(base_f + self.rng.random_range(0.0..5.0)),
            volume: self.rng.random_range(1_000_000..11_000_000),
            market_cap: base * Decimal::from(market_cap_shares),
            pe_ratio: Some(cents(self.rng.random_range(5.0..35.0))),
            year_low: (base * Decimal::new(7, 1)).round_dp(2),
            year_high: (base * Decimal::new(13, 1)).round_dp(2),
            dividend_yield: Some(
                Decimal::from_f64(self.rng.random_range(0.0..0.05))
                    .unwrap_or_default()
                    .round_dp(4),
            ),
            symbol,
        }
    }

    /// Price series for a symbol ending around `now`.
    ///
    /// The walk is driven by a sine hash of the symbol, the day of month and
    /// the point index, so repeated calls on the same day draw the same chart.
    pub fn history(&self, symbol: &str, range: TimeRange, now: NaiveDateTime) -> PriceHistory {
        let symbol = symbol.trim().to_uppercase();
        let base = catalog::base_price(&symbol).to_f64().unwrap_or_default();
        let volatility = base * VOLATILITY;
        let trend = match range {
            TimeRange::OneYear | TimeRange::FiveYears => LONG_RANGE_TREND,
            _ => 0.0,
        };
        let first_char = symbol.chars().next().map(u32::from).unwrap_or_default();
        let start = series_start(range, now);

        let mut price = base;
        let points = (0..point_count(range))
            .map(|i| {
                let at = point_time(range, start, i);
                let seed = f64::from(first_char) + f64::from(at.day()) + i as f64;
                price += (seeded_noise(seed) - 0.5 + trend) * volatility;
                if price <= 0.0 {
                    price = base * 0.1;
                }
                PricePoint {
                    label: point_label(range, at),
                    price: cents(price),
                }
            })
            .collect();

        PriceHistory {
            symbol,
            range,
            points,
        }
    }

    /// Most active stocks of a region, biggest movers first.
    pub fn trending(&mut self, count: usize, region: Region) -> Vec<StockQuote> {
        let mut quotes: Vec<StockQuote> = catalog::symbols_in(region)
            .into_iter()
            .take(count)
            .map(|listing| {
                let price = listing.base_price();
                let change = self.random_change();
                StockQuote {
                    symbol: listing.symbol.to_string(),
                    name: listing.name.to_string(),
                    price,
                    change,
                    change_percent: percent(change, price),
                    currency: region.currency().to_string(),
                }
            })
            .collect();

        quotes.sort_by(|a, b| b.change_percent.abs().cmp(&a.change_percent.abs()));
        quotes
    }

    /// Search the catalog.
    pub fn search(&self, query: &str, regions: &[Region]) -> Vec<SearchResult> {
        catalog::search(query, regions)
    }

    /// Same stocks in the same order with freshly drawn changes.
    pub fn jitter_quotes(&mut self, quotes: &[StockQuote]) -> Vec<StockQuote> {
        quotes
            .iter()
            .map(|quote| {
                let change = self.random_change();
                StockQuote {
                    change,
                    change_percent: percent(change, quote.price),
                    ..quote.clone()
                }
            })
            .collect()
    }

    fn random_change(&mut self) -> Decimal {
        cents(self.rng.random_range(-3.0..7.0))
    }
}

/// Points generated for a range.
pub fn point_count(range: TimeRange) -> usize {
    let count = match range {
        TimeRange::OneDay => 24,
        TimeRange::FiveDays => 5 * 8,
        TimeRange::OneMonth => 30,
        TimeRange::ThreeMonths => 90,
        TimeRange::SixMonths => 180,
        TimeRange::OneYear => 365,
        TimeRange::FiveYears => 5 * 52,
    };
    count.max(MIN_HISTORY_POINTS)
}

fn series_start(range: TimeRange, now: NaiveDateTime) -> NaiveDateTime {
    let months_back = |months: u32| {
        now.checked_sub_months(Months::new(months))
            .unwrap_or(now)
    };
    match range {
        TimeRange::OneDay => now.date().and_time(NaiveTime::MIN),
        TimeRange::FiveDays => now - ChronoDuration::days(5),
        TimeRange::OneMonth => months_back(1),
        TimeRange::ThreeMonths => months_back(3),
        TimeRange::SixMonths => months_back(6),
        TimeRange::OneYear => months_back(12),
        TimeRange::FiveYears => months_back(60),
    }
}

fn point_time(range: TimeRange, start: NaiveDateTime, i: usize) -> NaiveDateTime {
    let i = i as i64;
    match range {
        TimeRange::OneDay => start + ChronoDuration::hours(i),
        TimeRange::FiveDays => start + ChronoDuration::hours(i * 3),
        TimeRange::FiveYears => start + ChronoDuration::days(i * 7),
        _ => start + ChronoDuration::days(i),
    }
}

fn point_label(range: TimeRange, at: NaiveDateTime) -> String {
    match range {
        TimeRange::OneDay => at.format("%H:%M").to_string(),
        TimeRange::FiveDays => at.format("%b %-d %H:%M").to_string(),
        TimeRange::FiveYears => at.format("%b %-d, %Y").to_string(),
        _ => at.format("%b %-d").to_string(),
    }
}

/// Fractional part of `sin(seed) * 10000`, in `[0, 1)`.
pub fn seeded_noise(seed: f64) -> f64 {
    let x = seed.sin() * 10_000.0;
    x - x.floor()
}

fn cents(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default().round_dp(2)
}

fn percent(change: Decimal, price: Decimal) -> Decimal {
    if price.is_zero() {
        Decimal::ZERO
    } else {
        (change / price * Decimal::ONE_HUNDRED).round_dp(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn noon(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(12, 0, 0))
            .unwrap()
    }

    #[test]
    fn test_point_counts() {
        let counts: Vec<usize> = TimeRange::ALL.iter().map(|r| point_count(*r)).collect();
        assert_eq!(counts, vec![24, 40, 30, 90, 180, 365, 260]);
    }

    #[test]
    fn test_history_is_deterministic_for_a_day() {
        let generator = MockGenerator::seeded(1);
        let now = noon(2024, 3, 15);
        let a = generator.history("AAPL", TimeRange::OneMonth, now);
        let b = MockGenerator::seeded(99).history("aapl", TimeRange::OneMonth, now);

        assert_eq!(a, b);
        assert_eq!(a.points.len(), 30);
        assert_eq!(a.symbol, "AAPL");
        assert_eq!(a.points[0].label, "Feb 15");
    }

    #[test]
    fn test_history_labels_per_range() {
        let generator = MockGenerator::seeded(1);
        let now = noon(2024, 3, 15);

        let day = generator.history("MSFT", TimeRange::OneDay, now);
        assert_eq!(day.points[0].label, "00:00");
        assert_eq!(day.points[23].label, "23:00");

        let five_years = generator.history("MSFT", TimeRange::FiveYears, now);
        assert_eq!(five_years.points[1].label, "Mar 22, 2019");
    }

    #[test]
    fn test_history_prices_are_positive_cents() {
        let generator = MockGenerator::seeded(1);
        let history = generator.history("DFM.DU", TimeRange::FiveYears, noon(2024, 1, 31));
        for point in &history.points {
            assert!(point.price > Decimal::ZERO);
            assert_eq!(point.price, point.price.round_dp(2));
        }
    }

    #[test]
    fn test_details_ranges() {
        let mut generator = MockGenerator::seeded(7);
        for _ in 0..50 {
            let d = generator.details("aapl");
            assert_eq!(d.symbol, "AAPL");
            assert_eq!(d.price, dec!(182.52));
            assert!(d.change >= dec!(-5) && d.change < dec!(5.01));
            assert_eq!(d.previous_close, d.price - d.change);
            assert!((1_000_000..11_000_000).contains(&d.volume));
            assert!(d.pe_ratio.is_some_and(|pe| pe >= dec!(5) && pe <= dec!(35)));
            assert_eq!(d.year_low, dec!(127.76));
            assert_eq!(d.year_high, dec!(237.28));
            assert!(d.dividend_yield.is_some_and(|y| y >= dec!(0) && y <= dec!(0.05)));
            assert!(d.day_low < d.price && d.day_high >= d.price);
        }
    }

    #[test]
    fn test_details_for_unknown_symbol() {
        let d = MockGenerator::seeded(1).details("xyz.pa");
        assert_eq!(d.name, "Company XYZ.PA");
        assert_eq!(d.exchange, "PA");
        assert_eq!(d.region, Region::Eu);
        assert_eq!(d.currency, "EUR");
    }

    #[test]
    fn test_trending_sorted_by_movement() {
        let mut generator = MockGenerator::seeded(3);
        let quotes = generator.trending(DEFAULT_TRENDING_COUNT, Region::Usa);
        assert_eq!(quotes.len(), 10);
        for pair in quotes.windows(2) {
            assert!(pair[0].change_percent.abs() >= pair[1].change_percent.abs());
        }

        assert_eq!(generator.trending(20, Region::Egypt).len(), 5);
        assert_eq!(generator.trending(3, Region::Uk).len(), 3);
    }

    #[test]
    fn test_jitter_keeps_stocks_and_order() {
        let mut generator = MockGenerator::seeded(5);
        let quotes = generator.trending(DEFAULT_TRENDING_COUNT, Region::Usa);
        let jittered = generator.jitter_quotes(&quotes);

        let before: Vec<_> = quotes.iter().map(|q| (&q.symbol, q.price)).collect();
        let after: Vec<_> = jittered.iter().map(|q| (&q.symbol, q.price)).collect();
        assert_eq!(before, after);
        assert!(jittered.iter().all(|q| q.change >= dec!(-3) && q.change <= dec!(7)));
    }

    #[test]
    fn test_seeded_noise_range() {
        for seed in 0..500 {
            let n = seeded_noise(f64::from(seed));
            assert!((0.0..1.0).contains(&n));
        }
    }
}
