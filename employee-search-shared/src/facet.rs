//! Term aggregation results.

use serde::{Deserialize, Serialize};

/// One distinct field value and the number of documents holding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetBucket {
    pub key: String,
    pub doc_count: u64,
}

/// Buckets of a terms aggregation over a single field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetReport {
    /// The field as requested by the caller.
    pub field: String,
    /// Buckets ordered by descending document count, as returned by the backend.
    pub buckets: Vec<FacetBucket>,
}

impl FacetReport {
    pub fn new(field: impl Into<String>, buckets: Vec<FacetBucket>) -> Self {
        Self {
            field: field.into(),
            buckets,
        }
    }

    /// True when no document holds a value for the field.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Sum of all bucket counts.
    pub fn total(&self) -> u64 {
        self.buckets.iter().map(|b| b.doc_count).sum()
    }

    /// Count for a given key, if present.
    pub fn count_for(&self, key: &str) -> Option<u64> {
        self.buckets
            .iter()
            .find(|b| b.key == key)
            .map(|b| b.doc_count)
    }
}
