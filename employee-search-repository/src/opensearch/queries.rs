//! OpenSearch query builders.
//!
//! This module provides functions to build the request bodies sent to
//! OpenSearch: match searches, terms aggregations and bulk payloads.

use opensearch::http::request::JsonBody;
use serde_json::{json, Value};

use employee_search_shared::{Document, SearchQuery};

/// Name of the aggregation in facet requests and responses.
pub const FACET_AGGREGATION: &str = "facet";

/// Build a match query restricted to a single field.
///
/// On keyword-mapped fields this is an exact, case-sensitive match; on
/// dynamically mapped text fields the value is analysed.
pub fn build_match_query(query: &SearchQuery, track_total: bool) -> Value {
    let mut body = json!({
        "query": {
            "match": {
                query.field.as_str(): query.value
            }
        },
        "size": query.size
    });

    if track_total {
        body["track_total_hits"] = json!(true);
    }

    body
}

/// Build a size-zero search carrying a single terms aggregation.
pub fn build_terms_aggregation(field: &str, size: usize) -> Value {
    json!({
        "size": 0,
        "aggs": {
            FACET_AGGREGATION: {
                "terms": {
                    "field": field,
                    "size": size,
                    "min_doc_count": 1
                }
            }
        }
    })
}

/// Build the NDJSON lines of a bulk insert.
///
/// Each document gets an `index` action without `_id`, so the backend
/// assigns one. The target collection comes from the request path.
pub fn build_bulk_body(documents: &[Document]) -> Vec<JsonBody<Value>> {
    let mut body: Vec<JsonBody<Value>> = Vec::with_capacity(documents.len() * 2);

    for doc in documents {
        body.push(json!({"index": {}}).into());
        body.push(Value::Object(doc.fields().clone()).into());
    }

    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_match_query() {
        let query = SearchQuery::exact("Department", "IT");
        let body = build_match_query(&query, false);

        assert_eq!(body["query"]["match"]["Department"], "IT");
        assert_eq!(body["size"], 100);
        assert!(body.get("track_total_hits").is_none());
    }

    #[test]
    fn test_build_match_query_field_with_space() {
        let query = SearchQuery::exact("Employee ID", "E02004").with_size(10_000);
        let body = build_match_query(&query, true);

        assert_eq!(body["query"]["match"]["Employee ID"], "E02004");
        assert_eq!(body["size"], 10_000);
        assert_eq!(body["track_total_hits"], true);
    }

    #[test]
    fn test_build_terms_aggregation() {
        let body = build_terms_aggregation("Department", 100);

        assert_eq!(body["size"], 0);
        let terms = &body["aggs"][FACET_AGGREGATION]["terms"];
        assert_eq!(terms["field"], "Department");
        assert_eq!(terms["size"], 100);
        assert_eq!(terms["min_doc_count"], 1);
    }

    #[test]
    fn test_build_bulk_body_pairs_actions_with_sources() {
        let docs = vec![
            Document::new().with_field("Employee ID", "E1"),
            Document::new().with_field("Employee ID", "E2"),
        ];

        let body = build_bulk_body(&docs);

        assert_eq!(body.len(), 4);
    }
}
