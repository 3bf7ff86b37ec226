//! Search index provider trait definition.
//!
//! This module defines the abstract interface for search index operations,
//! allowing for different backend implementations (OpenSearch, Elasticsearch, etc.).

use async_trait::async_trait;

use crate::errors::SearchIndexError;
use crate::types::BatchOperationSummary;
use employee_search_shared::{Document, FacetBucket, SearchQuery, SearchResponse};

/// Abstracts the underlying search index implementation (OpenSearch, Elasticsearch, etc.).
///
/// Implementations are injected into `SearchIndexClient` to enable dependency
/// injection and easy testing with mock implementations. Each method maps to
/// a single backend request; retry, validation and refresh sequencing live in
/// the client.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Check whether a collection exists.
    async fn collection_exists(&self, collection: &str) -> Result<bool, SearchIndexError>;

    /// Create a collection with the provider's fixed settings and mappings.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the collection was created
    /// * `Err(SearchIndexError::IndexCreationError)` - If the backend rejected the request.
    ///   A rejection because the collection already exists carries
    ///   `resource_already_exists_exception` in its message.
    async fn create_collection(&self, collection: &str) -> Result<(), SearchIndexError>;

    /// Insert documents in one bulk request and report per-document outcomes.
    ///
    /// Per-document failures are reported in the summary. An `Err` means the
    /// request as a whole could not be executed.
    async fn bulk_index_documents(
        &self,
        collection: &str,
        documents: &[Document],
    ) -> Result<BatchOperationSummary, SearchIndexError>;

    /// Make recently written documents visible to search.
    async fn refresh(&self, collection: &str) -> Result<(), SearchIndexError>;

    /// Run a match query.
    ///
    /// When `track_total` is true the backend counts every match exactly
    /// rather than stopping at its default tracking threshold.
    async fn search(
        &self,
        collection: &str,
        query: &SearchQuery,
        track_total: bool,
    ) -> Result<SearchResponse, SearchIndexError>;

    /// Count all documents in the collection.
    async fn count(&self, collection: &str) -> Result<u64, SearchIndexError>;

    /// Delete a document by its backend id.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the document was deleted
    /// * `Ok(false)` - If no document with that id existed
    async fn delete_document(
        &self,
        collection: &str,
        document_id: &str,
    ) -> Result<bool, SearchIndexError>;

    /// Run a terms aggregation over `field` and return its buckets.
    ///
    /// The provider resolves which backend field to aggregate on from its
    /// index configuration.
    async fn term_facet(
        &self,
        collection: &str,
        field: &str,
        size: usize,
    ) -> Result<Vec<FacetBucket>, SearchIndexError>;

    /// Check if the search engine is healthy and reachable.
    async fn health_check(&self) -> Result<bool, SearchIndexError>;
}
