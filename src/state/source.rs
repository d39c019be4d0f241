//! Provenance of loaded data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DataSource {
    /// Returned by the remote market data API.
    Live,
    /// Generated locally.
    #[default]
    Mock,
}

impl DataSource {
    /// Whether this value is synthetic.
    pub fn is_mock(self) -> bool {
        self == Self::Mock
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Live => write!(f, "Live"),
            Self::Mock => write!(f, "Mock"),
        }
    }
}

/// A value tagged with its source and retrieval time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fetched<T> {
    pub value: T,
    pub source: DataSource,
    pub fetched_at: DateTime<Utc>,
}

impl<T> Fetched<T> {
    /// Wrap a value returned by the API.
    pub fn live(value: T) -> Self {
        Self {
            value,
            source: DataSource::Live,
            fetched_at: Utc::now(),
        }
    }

    /// Wrap a generated value.
    pub fn mock(value: T) -> Self {
        Self {
            value,
            source: DataSource::Mock,
            fetched_at: Utc::now(),
        }
    }

    /// Whether the value is synthetic.
    pub fn is_mock(&self) -> bool {
        self.source.is_mock()
    }

    /// Transform the value, keeping the provenance.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        Fetched {
            value: f(self.value),
            source: self.source,
            fetched_at: self.fetched_at,
        }
    }
}
