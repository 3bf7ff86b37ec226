//! OpenSearch response parsing.
//!
//! Turns raw JSON response bodies into the shared result types.

use serde_json::Value;

use crate::errors::SearchIndexError;
use crate::types::{BatchOperationResult, BatchOperationSummary};
use employee_search_shared::{Document, FacetBucket, SearchHit, SearchResponse};

/// Parse a search response into hits and total.
pub fn parse_search_response(body: &Value) -> Result<SearchResponse, SearchIndexError> {
    let hits_obj = body
        .get("hits")
        .ok_or_else(|| SearchIndexError::parse("Search response has no 'hits' object"))?;

    let raw_hits = hits_obj
        .get("hits")
        .and_then(Value::as_array)
        .ok_or_else(|| SearchIndexError::parse("Search response has no 'hits.hits' array"))?;

    let hits = raw_hits
        .iter()
        .map(parse_hit)
        .collect::<Result<Vec<_>, _>>()?;

    // Older backends report `total` as a bare number.
    let total = match hits_obj.get("total") {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(total) => total.get("value").and_then(Value::as_u64).unwrap_or(0),
        None => hits.len() as u64,
    };

    Ok(SearchResponse { hits, total })
}

fn parse_hit(hit: &Value) -> Result<SearchHit, SearchIndexError> {
    let id = hit
        .get("_id")
        .and_then(Value::as_str)
        .ok_or_else(|| SearchIndexError::parse("Search hit has no '_id'"))?
        .to_string();

    let source = match hit.get("_source") {
        Some(Value::Object(fields)) => Document::from(fields.clone()),
        _ => Document::new(),
    };

    Ok(SearchHit { id, source })
}

/// Parse a count response.
pub fn parse_count_response(body: &Value) -> Result<u64, SearchIndexError> {
    body.get("count")
        .and_then(Value::as_u64)
        .ok_or_else(|| SearchIndexError::parse("Count response has no numeric 'count'"))
}

/// Parse the buckets of the named terms aggregation.
///
/// Numeric and boolean keys are rendered as strings. For booleans the backend
/// also sends `key_as_string`, which is preferred when present.
pub fn parse_facet_buckets(
    body: &Value,
    aggregation: &str,
) -> Result<Vec<FacetBucket>, SearchIndexError> {
    let buckets = body
        .get("aggregations")
        .and_then(|aggs| aggs.get(aggregation))
        .and_then(|agg| agg.get("buckets"))
        .and_then(Value::as_array)
        .ok_or_else(|| {
            SearchIndexError::parse(format!(
                "Aggregation response has no buckets for '{}'",
                aggregation
            ))
        })?;

    buckets
        .iter()
        .map(|bucket| {
            let key = match bucket.get("key_as_string").and_then(Value::as_str) {
                Some(key) => key.to_string(),
                None => match bucket.get("key") {
                    Some(Value::String(s)) => s.clone(),
                    Some(other) if !other.is_null() => other.to_string(),
                    _ => return Err(SearchIndexError::parse("Facet bucket has no 'key'")),
                },
            };
            let doc_count = bucket
                .get("doc_count")
                .and_then(Value::as_u64)
                .ok_or_else(|| SearchIndexError::parse("Facet bucket has no 'doc_count'"))?;

            Ok(FacetBucket { key, doc_count })
        })
        .collect()
}

/// Parse a bulk response into per-document results.
///
/// `offset` is the batch position of the first document in this request, and
/// `expected` the number of documents sent. A response listing fewer items
/// than expected marks the missing positions as failed, so the summary still
/// accounts for every document.
pub fn parse_bulk_response(
    body: &Value,
    offset: usize,
    expected: usize,
) -> Result<BatchOperationSummary, SearchIndexError> {
    let items = body
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| SearchIndexError::parse("Bulk response has no 'items' array"))?;

    let mut results = Vec::with_capacity(expected);

    for (i, item) in items.iter().take(expected).enumerate() {
        let position = offset + i;
        // Each item is keyed by its action name ("index" or "create").
        let outcome = item
            .as_object()
            .and_then(|obj| obj.values().next())
            .cloned()
            .unwrap_or(Value::Null);

        let status = outcome.get("status").and_then(Value::as_u64).unwrap_or(0);
        let document_id = outcome
            .get("_id")
            .and_then(Value::as_str)
            .map(str::to_string);

        match outcome.get("error") {
            None if (200..300).contains(&status) => results.push(BatchOperationResult {
                position,
                document_id,
                success: true,
                error: None,
            }),
            error => {
                let reason = error
                    .map(describe_bulk_error)
                    .unwrap_or_else(|| "no error detail".to_string());
                results.push(BatchOperationResult {
                    position,
                    document_id,
                    success: false,
                    error: Some(SearchIndexError::backend(status as u16, reason)),
                });
            }
        }
    }

    for position in (offset + results.len())..(offset + expected) {
        results.push(BatchOperationResult {
            position,
            document_id: None,
            success: false,
            error: Some(SearchIndexError::parse(
                "Bulk response did not report this document",
            )),
        });
    }

    Ok(BatchOperationSummary::from_results(results))
}

fn describe_bulk_error(error: &Value) -> String {
    match (
        error.get("type").and_then(Value::as_str),
        error.get("reason").and_then(Value::as_str),
    ) {
        (Some(kind), Some(reason)) => format!("{}: {}", kind, reason),
        (Some(kind), None) => kind.to_string(),
        _ => error.to_string(),
    }
}

/// Extract a readable reason from an error response body.
///
/// Falls back to the raw body when it is not the backend's JSON error shape.
pub fn error_reason(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").cloned())
        .map(|error| match error {
            Value::String(s) => s,
            other => describe_bulk_error(&other),
        })
        .unwrap_or_else(|| body.to_string())
}
