//! OpenSearch index configuration and mappings.
//!
//! This module defines the settings and mappings applied when an employee
//! collection is created, and resolves which backend field a facet should
//! aggregate on.

use serde_json::{json, Map, Value};

/// Fields mapped as `keyword` in every employee collection.
pub const KEYWORD_FIELDS: [&str; 3] = ["Department", "Gender", "Employee ID"];

/// Sub-field name the backend's dynamic mapping adds to string fields.
const DYNAMIC_KEYWORD_SUBFIELD: &str = "keyword";

/// Settings and explicit mappings for an employee collection.
///
/// Fields not listed in `keyword_fields` are left to dynamic mapping, which
/// maps strings to `text` with a `.keyword` sub-field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexConfig {
    pub number_of_shards: u32,
    pub number_of_replicas: u32,
    pub keyword_fields: Vec<String>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            number_of_shards: 1,
            number_of_replicas: 0,
            keyword_fields: KEYWORD_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl IndexConfig {
    /// Whether `field` is explicitly mapped as `keyword`.
    pub fn is_keyword(&self, field: &str) -> bool {
        self.keyword_fields.iter().any(|f| f == field)
    }

    /// The backend field a terms aggregation over `field` should use.
    ///
    /// Keyword-mapped fields aggregate directly. Dynamically mapped fields
    /// aggregate on their `.keyword` sub-field, since `text` fields are not
    /// aggregatable.
    pub fn aggregation_field(&self, field: &str) -> String {
        if self.is_keyword(field) {
            field.to_string()
        } else {
            format!("{}.{}", field, DYNAMIC_KEYWORD_SUBFIELD)
        }
    }

    /// The request body for creating a collection.
    pub fn index_body(&self) -> Value {
        let properties: Map<String, Value> = self
            .keyword_fields
            .iter()
            .map(|field| (field.clone(), json!({ "type": "keyword" })))
            .collect();

        json!({
            "settings": {
                "number_of_shards": self.number_of_shards,
                "number_of_replicas": self.number_of_replicas
            },
            "mappings": {
                "properties": properties
            }
        })
    }
}
