//! Symbol search state.

use super::DataSource;
use serde::{Deserialize, Serialize};

/// Market region used to filter search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Region {
    #[default]
    Usa,
    Egypt,
    SaudiArabia,
    Uae,
    Uk,
    Eu,
    China,
    Japan,
}

impl Region {
    /// All regions in selector order.
    pub const ALL: [Region; 8] = [
        Self::Usa,
        Self::Egypt,
        Self::SaudiArabia,
        Self::Uae,
        Self::Uk,
        Self::Eu,
        Self::China,
        Self::Japan,
    ];

    /// Short identifier.
    pub fn id(self) -> &'static str {
        match self {
            Self::Usa => "USA",
            Self::Egypt => "EGY",
            Self::SaudiArabia => "KSA",
            Self::Uae => "UAE",
            Self::Uk => "UK",
            Self::Eu => "EU",
            Self::China => "CHN",
            Self::Japan => "JPN",
        }
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Usa => "United States",
            Self::Egypt => "Egypt",
            Self::SaudiArabia => "Saudi Arabia",
            Self::Uae => "United Arab Emirates",
            Self::Uk => "United Kingdom",
            Self::Eu => "European Union",
            Self::China => "China",
            Self::Japan => "Japan",
        }
    }

    /// Local currency code.
    pub fn currency(self) -> &'static str {
        match self {
            Self::Usa => "USD",
            Self::Egypt => "EGP",
            Self::SaudiArabia => "SAR",
            Self::Uae => "AED",
            Self::Uk => "GBP",
            Self::Eu => "EUR",
            Self::China => "CNY",
            Self::Japan => "JPY",
        }
    }

    /// Infer the region from an exchange suffix on the symbol.
    pub fn from_symbol(symbol: &str) -> Self {
        let symbol = symbol.to_ascii_uppercase();
        if symbol.ends_with(".CA") {
            Self::Egypt
        } else if symbol.ends_with(".SR") {
            Self::SaudiArabia
        } else if symbol.ends_with(".AD") || symbol.ends_with(".DU") {
            Self::Uae
        } else if symbol.ends_with(".L") {
            Self::Uk
        } else if [".PA", ".DE", ".AS", ".MI"].iter().any(|s| symbol.ends_with(s)) {
            Self::Eu
        } else if symbol.ends_with(".SS") || symbol.ends_with(".SZ") {
            Self::China
        } else if symbol.ends_with(".T") {
            Self::Japan
        } else {
            Self::Usa
        }
    }

    /// Parse an identifier such as "KSA".
    pub fn parse(id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.id().eq_ignore_ascii_case(id))
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A symbol returned by search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub symbol: String,
    pub name: String,
    pub exchange: String,
    pub region: Region,
    /// Instrument type, e.g. "Equity".
    pub kind: String,
}

/// State for the search view.
#[derive(Debug)]
pub struct SearchState {
    /// Current query text.
    pub query: String,
    /// Query the current results belong to.
    pub results_query: Option<String>,
    /// Results for `results_query`.
    pub results: Vec<SearchResult>,
    /// Source of the results.
    pub source: Option<DataSource>,
    /// Whether a search is pending.
    pub loading: bool,
    /// Last search error.
    pub error: Option<String>,
    /// Regions included in the search; never empty.
    pub regions: Vec<Region>,
    /// Region highlighted in the selector.
    pub region_cursor: usize,
    /// Selected result row.
    pub selected_index: Option<usize>,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            query: String::new(),
            results_query: None,
            results: Vec::new(),
            source: None,
            loading: false,
            error: None,
            regions: vec![Region::Usa],
            region_cursor: 0,
            selected_index: None,
        }
    }
}

impl SearchState {
    /// Create search state with the given regions preselected.
    pub fn with_regions(regions: Vec<Region>) -> Self {
        let mut state = Self::default();
        if !regions.is_empty() {
            state.regions = regions;
        }
        state
    }

    /// Whether a region is included.
    pub fn is_selected(&self, region: Region) -> bool {
        self.regions.contains(&region)
    }

    /// Include or exclude a region. The last selected region stays selected.
    ///
    /// Returns true when the selection changed.
    pub fn toggle_region(&mut self, region: Region) -> bool {
        if let Some(pos) = self.regions.iter().position(|r| *r == region) {
            if self.regions.len() == 1 {
                return false;
            }
            self.regions.remove(pos);
        } else {
            self.regions.push(region);
        }
        true
    }

    /// Region under the selector cursor.
    pub fn focused_region(&self) -> Region {
        Region::ALL[self.region_cursor % Region::ALL.len()]
    }

    /// Move the selector cursor to the next region.
    pub fn focus_next_region(&mut self) {
        self.region_cursor = (self.region_cursor + 1) % Region::ALL.len();
    }

    /// Store results if they still match the current query.
    ///
    /// Returns false for results of an outdated query.
    pub fn apply_results(
        &mut self,
        query: &str,
        results: Vec<SearchResult>,
        source: DataSource,
    ) -> bool {
        if query != self.query {
            return false;
        }
        self.results_query = Some(query.to_string());
        self.results = results;
        self.source = Some(source);
        self.loading = false;
        self.error = None;
        self.selected_index = if self.results.is_empty() { None } else { Some(0) };
        true
    }

    /// Clear query and results.
    pub fn clear(&mut self) {
        self.query.clear();
        self.results_query = None;
        self.results.clear();
        self.source = None;
        self.loading = false;
        self.error = None;
        self.selected_index = None;
    }

    /// The selected result.
    pub fn selected_result(&self) -> Option<&SearchResult> {
        self.selected_index.and_then(|i| self.results.get(i))
    }
}
