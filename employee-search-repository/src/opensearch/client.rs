//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `SearchIndexProvider`
//! using the OpenSearch Rust client.

use async_trait::async_trait;
use opensearch::{
    cert::CertificateValidation,
    cluster::ClusterHealthParts,
    http::response::Response,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesExistsParts, IndicesRefreshParts},
    BulkParts, CountParts, DeleteParts, OpenSearch, SearchParts,
};
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::opensearch::index_config::IndexConfig;
use crate::opensearch::queries::{
    build_bulk_body, build_match_query, build_terms_aggregation, FACET_AGGREGATION,
};
use crate::opensearch::responses::{
    error_reason, parse_bulk_response, parse_count_response, parse_facet_buckets,
    parse_search_response,
};
use crate::types::BatchOperationSummary;
use employee_search_shared::{Document, FacetBucket, SearchQuery, SearchResponse};

/// Whether TLS certificates presented by the backend are validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsVerification {
    /// Validate certificates against the system trust store.
    #[default]
    Enabled,
    /// Accept any certificate. Insecure; only for local clusters with
    /// self-signed certificates.
    Disabled,
}

/// OpenSearch client implementation.
///
/// Holds a single connection pool for the lifetime of the client.
///
/// # Example
///
/// ```ignore
/// use employee_search_repository::opensearch::{IndexConfig, OpenSearchClient, TlsVerification};
///
/// let client = OpenSearchClient::new(
///     "http://localhost:9200",
///     IndexConfig::default(),
///     TlsVerification::Enabled,
/// )?;
/// client.create_collection("employees").await?;
/// ```
pub struct OpenSearchClient {
    client: OpenSearch,
    index_config: IndexConfig,
}

impl OpenSearchClient {
    /// Create a new OpenSearch client connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    /// * `index_config` - Settings and mappings applied to created collections
    /// * `tls` - Whether to validate the server's TLS certificate
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchClient)` - A new client instance
    /// * `Err(SearchIndexError)` - If connection setup fails
    pub fn new(
        url: &str,
        index_config: IndexConfig,
        tls: TlsVerification,
    ) -> Result<Self, SearchIndexError> {
        let parsed_url =
            Url::parse(url).map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let mut builder = TransportBuilder::new(conn_pool).disable_proxy();

        if tls == TlsVerification::Disabled {
            warn!(url = %url, "TLS certificate validation is disabled");
            builder = builder.cert_validation(CertificateValidation::None);
        }

        let transport = builder
            .build()
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %url,
            shards = index_config.number_of_shards,
            replicas = index_config.number_of_replicas,
            "Created OpenSearch client"
        );

        Ok(Self {
            client,
            index_config,
        })
    }

    pub fn index_config(&self) -> &IndexConfig {
        &self.index_config
    }

    /// Turn a non-success response into an error.
    ///
    /// Missing collections become `CollectionNotFound`, throttling and
    /// unavailability statuses stay `BackendError` so they can be retried, and
    /// anything else is wrapped by the operation-specific `kind`.
    async fn failure(
        collection: &str,
        response: Response,
        kind: fn(String) -> SearchIndexError,
    ) -> SearchIndexError {
        let status = response.status_code().as_u16();
        let body = response.text().await.unwrap_or_default();
        let reason = error_reason(&body);

        error!(collection = %collection, status = status, reason = %reason, "Request failed");

        if status == 404 && reason.contains("index_not_found_exception") {
            SearchIndexError::collection_not_found(collection)
        } else if matches!(status, 429 | 502 | 503 | 504) {
            SearchIndexError::backend(status, reason)
        } else {
            kind(format!("status {}: {}", status, reason))
        }
    }

    async fn json_body(response: Response) -> Result<Value, SearchIndexError> {
        response
            .json::<Value>()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))
    }
}

fn transport_error(e: opensearch::Error) -> SearchIndexError {
    SearchIndexError::connection(e.to_string())
}

#[async_trait]
impl SearchIndexProvider for OpenSearchClient {
    async fn collection_exists(&self, collection: &str) -> Result<bool, SearchIndexError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[collection]))
            .send()
            .await
            .map_err(transport_error)?;

        match response.status_code().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            _ => Err(Self::failure(collection, response, SearchIndexError::IndexError).await),
        }
    }

    async fn create_collection(&self, collection: &str) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(collection))
            .body(self.index_config.index_body())
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status_code().is_success() {
            return Err(
                Self::failure(collection, response, SearchIndexError::IndexCreationError).await,
            );
        }

        debug!(collection = %collection, "Collection created");
        Ok(())
    }

    /// Insert documents with a single `_bulk` request.
    ///
    /// The response's `items` array is read item by item so that documents
    /// rejected by the backend (e.g. mapping conflicts) are counted as
    /// failures while the rest of the batch succeeds.
    #[instrument(skip(self, documents), fields(collection = %collection, count = documents.len()))]
    async fn bulk_index_documents(
        &self,
        collection: &str,
        documents: &[Document],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        if documents.is_empty() {
            return Ok(BatchOperationSummary::empty());
        }

        let response = self
            .client
            .bulk(BulkParts::Index(collection))
            .body(build_bulk_body(documents))
            .send()
            .await
            .map_err(|e| SearchIndexError::bulk_operation(e.to_string()))?;

        if !response.status_code().is_success() {
            return Err(
                Self::failure(collection, response, SearchIndexError::BulkOperationError).await,
            );
        }

        let body = Self::json_body(response).await?;
        let summary = parse_bulk_response(&body, 0, documents.len())?;

        if summary.failed > 0 {
            warn!(
                succeeded = summary.succeeded,
                failed = summary.failed,
                "Bulk request had per-document failures"
            );
        } else {
            debug!(succeeded = summary.succeeded, "Bulk request completed");
        }

        Ok(summary)
    }

    async fn refresh(&self, collection: &str) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .indices()
            .refresh(IndicesRefreshParts::Index(&[collection]))
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status_code().is_success() {
            return Err(Self::failure(collection, response, SearchIndexError::IndexError).await);
        }

        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query: &SearchQuery,
        track_total: bool,
    ) -> Result<SearchResponse, SearchIndexError> {
        let response = self
            .client
            .search(SearchParts::Index(&[collection]))
            .body(build_match_query(query, track_total))
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status_code().is_success() {
            return Err(Self::failure(collection, response, SearchIndexError::QueryError).await);
        }

        let body = Self::json_body(response).await?;
        parse_search_response(&body)
    }

    async fn count(&self, collection: &str) -> Result<u64, SearchIndexError> {
        let response = self
            .client
            .count(CountParts::Index(&[collection]))
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status_code().is_success() {
            return Err(Self::failure(collection, response, SearchIndexError::QueryError).await);
        }

        let body = Self::json_body(response).await?;
        parse_count_response(&body)
    }

    /// Delete a document from the collection.
    ///
    /// A 404 for the document itself is reported as `Ok(false)`; a 404 for
    /// the collection is `CollectionNotFound`.
    async fn delete_document(
        &self,
        collection: &str,
        document_id: &str,
    ) -> Result<bool, SearchIndexError> {
        let response = self
            .client
            .delete(DeleteParts::IndexId(collection, document_id))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status_code();
        if status.is_success() {
            debug!(collection = %collection, document_id = %document_id, "Document deleted");
            return Ok(true);
        }

        if status.as_u16() == 404 {
            let body = response.text().await.unwrap_or_default();
            if body.contains("index_not_found_exception") {
                return Err(SearchIndexError::collection_not_found(collection));
            }
            debug!(collection = %collection, document_id = %document_id, "Document already gone");
            return Ok(false);
        }

        Err(Self::failure(collection, response, SearchIndexError::DeleteError).await)
    }

    async fn term_facet(
        &self,
        collection: &str,
        field: &str,
        size: usize,
    ) -> Result<Vec<FacetBucket>, SearchIndexError> {
        let aggregation_field = self.index_config.aggregation_field(field);
        debug!(
            collection = %collection,
            field = %field,
            aggregation_field = %aggregation_field,
            "Running terms aggregation"
        );

        let response = self
            .client
            .search(SearchParts::Index(&[collection]))
            .body(build_terms_aggregation(&aggregation_field, size))
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status_code().is_success() {
            return Err(Self::failure(collection, response, SearchIndexError::QueryError).await);
        }

        let body = Self::json_body(response).await?;
        parse_facet_buckets(&body, FACET_AGGREGATION)
    }

    async fn health_check(&self) -> Result<bool, SearchIndexError> {
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status_code().is_success() {
            return Ok(false);
        }

        let health = Self::json_body(response).await?;
        let status = health
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("unknown");

        info!(status = %status, "OpenSearch cluster status");
        Ok(status == "green" || status == "yellow")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_invalid_url() {
        let result = OpenSearchClient::new(
            "not a url",
            IndexConfig::default(),
            TlsVerification::Enabled,
        );
        assert!(matches!(result, Err(SearchIndexError::ConnectionError(_))));
    }

    #[test]
    fn test_new_keeps_index_config() {
        let client = OpenSearchClient::new(
            "https://localhost:9200",
            IndexConfig::default(),
            TlsVerification::Disabled,
        )
        .unwrap();

        assert_eq!(client.index_config().number_of_replicas, 0);
        assert!(client.index_config().is_keyword("Gender"));
    }

    #[test]
    fn test_tls_verification_defaults_to_enabled() {
        assert_eq!(TlsVerification::default(), TlsVerification::Enabled);
    }
}
