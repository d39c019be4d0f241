//! Static reference data for generated quotes.

use crate::state::{Region, SearchResult};
use rust_decimal::Decimal;

/// A known listing.
#[derive(Debug, Clone, Copy)]
pub struct Listing {
    pub symbol: &'static str,
    pub name: &'static str,
    /// Reference price in cents.
    pub price_cents: i64,
    /// Extra search terms besides symbol and name.
    pub keywords: &'static [&'static str],
}

impl Listing {
    pub fn base_price(&self) -> Decimal {
        Decimal::new(self.price_cents, 2)
    }

    pub fn region(&self) -> Region {
        Region::from_symbol(self.symbol)
    }

    fn matches(&self, query: &str) -> bool {
        self.symbol.to_lowercase().contains(query)
            || self.name.to_lowercase().contains(query)
            || self.keywords.iter().any(|k| k.contains(query))
    }

    fn to_search_result(self) -> SearchResult {
        SearchResult {
            symbol: self.symbol.to_string(),
            name: self.name.to_string(),
            exchange: exchange_for(self.symbol),
            region: self.region(),
            kind: "Equity".to_string(),
        }
    }
}

const fn listing(
    symbol: &'static str,
    name: &'static str,
    price_cents: i64,
    keywords: &'static [&'static str],
) -> Listing {
    Listing {
        symbol,
        name,
        price_cents,
        keywords,
    }
}

/// Every listing known to the generator, grouped by region in trending order.
pub const LISTINGS: &[Listing] = &[
    // United States
    listing("AAPL", "Apple Inc.", 18252, &["apple", "iphone"]),
    listing("MSFT", "Microsoft Corporation", 41532, &["microsoft", "windows"]),
    listing("GOOGL", "Alphabet Inc.", 14265, &["google", "alphabet"]),
    listing("AMZN", "Amazon.com Inc.", 17875, &["amazon"]),
    listing("TSLA", "Tesla Inc.", 17534, &["tesla", "electric"]),
    listing("META", "Meta Platforms Inc.", 48558, &["facebook", "meta"]),
    listing("NVDA", "NVIDIA Corporation", 82279, &["nvidia", "gpu"]),
    listing("JPM", "JPMorgan Chase & Co.", 18896, &["jpmorgan", "bank"]),
    listing("V", "Visa Inc.", 27810, &["visa", "payments"]),
    listing("WMT", "Walmart Inc.", 6021, &["walmart", "retail"]),
    // Egypt
    listing("COMI.CA", "Commercial International Bank", 5215, &["commercial", "bank", "cib"]),
    listing("ETEL.CA", "Telecom Egypt", 2432, &["telecom", "egypt"]),
    listing("EAST.CA", "Eastern Company", 1875, &["eastern", "tobacco"]),
    listing("EFIC.CA", "Egyptian Financial & Industrial", 3690, &["egypt", "fertilizer"]),
    listing("HRHO.CA", "EFG Hermes Holding", 1984, &["hermes", "efg"]),
    // Saudi Arabia
    listing("2222.SR", "Saudi Aramco", 2985, &["aramco", "saudi", "oil"]),
    listing("1120.SR", "Al Rajhi Bank", 8970, &["rajhi", "bank"]),
    listing("2010.SR", "Saudi Basic Industries", 7860, &["sabic", "saudi"]),
    listing("1211.SR", "Saudi Arabian Mining Co.", 4215, &["maaden", "mining"]),
    listing("2350.SR", "Saudi Kayan Petrochemical", 925, &["kayan", "saudi"]),
    // United Arab Emirates
    listing("ETISALAT.AD", "Emirates Telecommunications Group", 2450, &["etisalat", "emirates", "telecom"]),
    listing("EMAAR.DU", "Emaar Properties", 725, &["emaar", "property"]),
    listing("DIB.DU", "Dubai Islamic Bank", 580, &["dubai", "bank"]),
    listing("FAB.AD", "First Abu Dhabi Bank", 1362, &["abu dhabi", "bank"]),
    listing("DFM.DU", "Dubai Financial Market", 142, &["dubai", "exchange"]),
    // United Kingdom
    listing("HSBA.L", "HSBC Holdings", 62030, &["hsbc", "bank"]),
    listing("VOD.L", "Vodafone Group", 6842, &["vodafone", "telecom"]),
    listing("BP.L", "BP p.l.c.", 47215, &["bp", "oil"]),
    listing("GSK.L", "GSK plc", 156420, &["gsk", "pharma"]),
    listing("LLOY.L", "Lloyds Banking Group", 5418, &["lloyds", "bank"]),
    // European Union
    listing("SAP.DE", "SAP SE", 17850, &["sap", "software"]),
    listing("MC.PA", "LVMH Moet Hennessy Louis Vuitton", 80240, &["lvmh", "luxury"]),
    listing("ASML.AS", "ASML Holding", 87320, &["asml", "semiconductor"]),
    // China
    listing("600519.SS", "Kweichow Moutai", 168800, &["moutai", "liquor"]),
    listing("000858.SZ", "Wuliangye Yibin", 14820, &["wuliangye", "liquor"]),
    // Japan
    listing("7203.T", "Toyota Motor Corporation", 359000, &["toyota", "auto"]),
    listing("6758.T", "Sony Group Corporation", 1295000, &["sony", "electronics"]),
];

/// Maximum number of search results.
pub const MAX_SEARCH_RESULTS: usize = 10;

/// Look up a listing by symbol, case-insensitively.
pub fn find(symbol: &str) -> Option<&'static Listing> {
    LISTINGS
        .iter()
        .find(|l| l.symbol.eq_ignore_ascii_case(symbol))
}

/// Listings of a region, in trending order.
pub fn symbols_in(region: Region) -> Vec<&'static Listing> {
    LISTINGS.iter().filter(|l| l.region() == region).collect()
}

/// Reference price of a symbol.
///
/// Unknown symbols get a stable price in `[150, 250)` derived from the
/// symbol text.
pub fn base_price(symbol: &str) -> Decimal {
    match find(symbol) {
        Some(listing) => listing.base_price(),
        None => {
            let offset = (symbol_hash(&symbol.to_uppercase()) % 10_000) as i64;
            Decimal::new(15_000 + offset, 2)
        }
    }
}

/// Company name of a symbol, `Company {SYMBOL}` when unknown.
pub fn company_name(symbol: &str) -> String {
    match find(symbol) {
        Some(listing) => listing.name.to_string(),
        None => format!("Company {}", symbol.to_uppercase()),
    }
}

/// Exchange a symbol trades on, from its suffix.
pub fn exchange_for(symbol: &str) -> String {
    let upper = symbol.to_uppercase();
    match upper.split_once('.') {
        Some((_, "CA")) => "EGX".to_string(),
        Some((_, "SR")) => "Tadawul".to_string(),
        Some((_, "AD")) => "ADX".to_string(),
        Some((_, "DU")) => "DFM".to_string(),
        Some((_, "L")) => "LSE".to_string(),
        Some((_, suffix)) => suffix.to_string(),
        None => "NASDAQ".to_string(),
    }
}

/// Match listings against a query within the given regions.
pub fn search(query: &str, regions: &[Region]) -> Vec<SearchResult> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    LISTINGS
        .iter()
        .filter(|l| regions.contains(&l.region()))
        .filter(|l| l.matches(&query))
        .take(MAX_SEARCH_RESULTS)
        .map(|l| l.to_search_result())
        .collect()
}

// FNV-1a, stable across runs and platforms.
fn symbol_hash(symbol: &str) -> u64 {
    symbol.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, b| {
        (hash ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
    })
}
