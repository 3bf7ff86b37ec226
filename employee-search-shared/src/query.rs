//! Search query and response types.

use serde::{Deserialize, Serialize};

use crate::Document;

/// Default cap on the number of hits returned by a search.
pub const DEFAULT_RESULT_SIZE: usize = 100;

/// A field/value match with a result-size cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Field to match against.
    pub field: String,
    /// Value the field must match.
    pub value: String,
    /// Maximum number of hits to return.
    pub size: usize,
}

impl SearchQuery {
    /// Create a match query on `field` with the default result cap.
    pub fn exact(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            size: DEFAULT_RESULT_SIZE,
        }
    }

    /// Override the result cap.
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }
}

/// A single document returned by a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Backend-assigned document id.
    pub id: String,
    /// The stored document.
    pub source: Document,
}

/// Hits returned by a search plus the backend-reported total.
///
/// `total` may exceed `hits.len()` when more documents matched than the
/// query's size cap allowed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub hits: Vec<SearchHit>,
    pub total: u64,
}

impl SearchResponse {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of hits actually returned.
    pub fn hit_count(&self) -> usize {
        self.hits.len()
    }

    /// Whether any document matched.
    pub fn is_match(&self) -> bool {
        !self.hits.is_empty()
    }

    /// Whether the result cap cut off some matches.
    pub fn is_truncated(&self) -> bool {
        self.total > self.hits.len() as u64
    }
}
