//! Search index client implementation.
//!
//! This module provides the main client for interacting with the search index.
//! Application code uses this to create collections, ingest, query, count,
//! facet and delete documents. Every operation returns a typed `Result`.

use std::future::Future;

use tracing::{debug, error, info, instrument, warn};

use crate::config::SearchIndexConfig;
use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::types::{BatchOperationSummary, CollectionStatus, DeleteOutcome};
use employee_search_shared::{Document, FacetReport, SearchQuery, SearchResponse};

/// Characters the backend forbids in index names.
const FORBIDDEN_NAME_CHARS: [char; 11] = ['\\', '/', '*', '?', '"', '<', '>', '|', ',', '#', ' '];

/// Maximum index name length in bytes.
const MAX_NAME_BYTES: usize = 255;

/// Check a collection name against the backend's index naming rules.
pub fn validate_collection_name(name: &str) -> Result<(), SearchIndexError> {
    if name.is_empty() {
        return Err(SearchIndexError::validation("collection name is required"));
    }
    if name.len() > MAX_NAME_BYTES {
        return Err(SearchIndexError::validation(format!(
            "collection name exceeds {} bytes",
            MAX_NAME_BYTES
        )));
    }
    if name == "." || name == ".." {
        return Err(SearchIndexError::validation(
            "collection name cannot be '.' or '..'",
        ));
    }
    if name.starts_with(['-', '_', '+']) {
        return Err(SearchIndexError::validation(format!(
            "collection name '{}' cannot start with '-', '_' or '+'",
            name
        )));
    }
    if name.chars().any(|c| c.is_uppercase()) {
        return Err(SearchIndexError::validation(format!(
            "collection name '{}' must be lowercase",
            name
        )));
    }
    if let Some(c) = name.chars().find(|c| FORBIDDEN_NAME_CHARS.contains(c)) {
        return Err(SearchIndexError::validation(format!(
            "collection name '{}' contains forbidden character '{}'",
            name, c
        )));
    }
    Ok(())
}

fn validate_field(field: &str) -> Result<(), SearchIndexError> {
    if field.trim().is_empty() {
        return Err(SearchIndexError::validation("field name is required"));
    }
    Ok(())
}

/// The main client for interacting with the search index.
///
/// Constructed once with an injected provider and passed to whoever needs it.
/// Holds no state besides the provider's connection handle and its config.
pub struct SearchIndexClient {
    provider: Box<dyn SearchIndexProvider>,
    config: SearchIndexConfig,
}

impl SearchIndexClient {
    /// Create a new SearchIndexClient with default configuration.
    pub fn new(provider: Box<dyn SearchIndexProvider>) -> Self {
        Self {
            provider,
            config: SearchIndexConfig::default(),
        }
    }

    /// Create a new SearchIndexClient with custom configuration.
    pub fn with_config(provider: Box<dyn SearchIndexProvider>, config: SearchIndexConfig) -> Self {
        Self { provider, config }
    }

    /// Release the client and its connection pool.
    pub fn close(self) {
        debug!("Search index client closed");
    }

    /// Run an idempotent operation, retrying transient failures with
    /// exponential backoff.
    async fn with_retry<T, F, Fut>(&self, operation: &str, mut f: F) -> Result<T, SearchIndexError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SearchIndexError>>,
    {
        let retry = &self.config.retry;
        let mut attempt = 0;

        loop {
            match f().await {
                Ok(value) => {
                    if attempt > 0 {
                        info!(operation = operation, attempt = attempt, "Succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) if e.is_retryable() && attempt < retry.max_retries => {
                    let delay = retry.delay_for(attempt);
                    warn!(
                        operation = operation,
                        attempt = attempt + 1,
                        max_retries = retry.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Transient failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!(operation = operation, error = %e, "Operation failed");
                    return Err(e);
                }
            }
        }
    }

    async fn refresh(&self, collection: &str) -> Result<(), SearchIndexError> {
        self.with_retry("refresh", || self.provider.refresh(collection))
            .await
    }

    /// Ensure a collection exists with the fixed employee schema.
    ///
    /// Idempotent: an existing collection is left untouched. A concurrent
    /// creation between the existence check and the create call is also
    /// reported as `AlreadyExists`.
    #[instrument(skip(self))]
    pub async fn ensure_collection(
        &self,
        collection: &str,
    ) -> Result<CollectionStatus, SearchIndexError> {
        validate_collection_name(collection)?;

        let exists = self
            .with_retry("collection_exists", || {
                self.provider.collection_exists(collection)
            })
            .await?;

        if exists {
            info!(collection = %collection, "Collection already exists");
            return Ok(CollectionStatus::AlreadyExists);
        }

        let created = self
            .with_retry("create_collection", || {
                self.provider.create_collection(collection)
            })
            .await;

        match created {
            Ok(()) => {
                info!(collection = %collection, "Collection created");
                Ok(CollectionStatus::Created)
            }
            Err(SearchIndexError::IndexCreationError(msg))
                if msg.contains("resource_already_exists_exception") =>
            {
                info!(collection = %collection, "Collection created concurrently");
                Ok(CollectionStatus::AlreadyExists)
            }
            Err(e) => Err(e),
        }
    }

    /// Insert documents, tolerating per-document failures.
    ///
    /// Documents are sent in bulk chunks of `bulk_chunk_size`. A chunk that
    /// fails as a whole marks its documents as failed and the remaining
    /// chunks are still sent. Bulk inserts are not retried since the backend
    /// assigns ids and a retry could duplicate documents.
    #[instrument(skip(self, documents), fields(count = documents.len()))]
    pub async fn index_documents(
        &self,
        collection: &str,
        documents: &[Document],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        validate_collection_name(collection)?;

        let mut summary = BatchOperationSummary::empty();
        if documents.is_empty() {
            return Ok(summary);
        }

        let chunk_size = self.config.bulk_chunk_size.max(1);
        for (chunk_index, chunk) in documents.chunks(chunk_size).enumerate() {
            let offset = chunk_index * chunk_size;

            match self.provider.bulk_index_documents(collection, chunk).await {
                Ok(mut chunk_summary) => {
                    for result in &mut chunk_summary.results {
                        result.position += offset;
                    }
                    summary.merge(chunk_summary);
                }
                Err(e) => {
                    error!(
                        collection = %collection,
                        offset = offset,
                        count = chunk.len(),
                        error = %e,
                        "Bulk chunk failed"
                    );
                    summary.merge(BatchOperationSummary::all_failed(
                        offset..offset + chunk.len(),
                        e,
                    ));
                }
            }
        }

        info!(
            collection = %collection,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Bulk indexing completed"
        );

        Ok(summary)
    }

    /// Find documents whose `field` matches `value`.
    ///
    /// Refreshes first so that documents written just before are visible.
    /// Returns at most `result_size` hits.
    #[instrument(skip(self))]
    pub async fn exact_match(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<SearchResponse, SearchIndexError> {
        validate_collection_name(collection)?;
        validate_field(field)?;

        self.refresh(collection).await?;

        let query = SearchQuery::exact(field, value).with_size(self.config.result_size);
        let response = self
            .with_retry("search", || self.provider.search(collection, &query, false))
            .await?;

        debug!(
            collection = %collection,
            hits = response.hit_count(),
            total = response.total,
            "Search completed"
        );
        Ok(response)
    }

    /// Delete every document whose `key_field` matches `key_value`.
    ///
    /// At most `delete_scan_limit` documents are fetched and deleted one by
    /// one by id. If more matched, the outcome reports it through
    /// [`DeleteOutcome::is_complete`] and the call can be repeated.
    ///
    /// A failed per-id delete stops the loop. The error is returned only if
    /// nothing was deleted yet; otherwise the partial count is returned.
    #[instrument(skip(self))]
    pub async fn delete_by_key(
        &self,
        collection: &str,
        key_field: &str,
        key_value: &str,
    ) -> Result<DeleteOutcome, SearchIndexError> {
        validate_collection_name(collection)?;
        validate_field(key_field)?;

        self.refresh(collection).await?;

        let query =
            SearchQuery::exact(key_field, key_value).with_size(self.config.delete_scan_limit);
        let response = self
            .with_retry("delete_lookup", || {
                self.provider.search(collection, &query, true)
            })
            .await?;

        if !response.is_match() {
            info!(
                collection = %collection,
                key_field = %key_field,
                key_value = %key_value,
                "No documents to delete"
            );
            return Ok(DeleteOutcome::NotFound);
        }

        if response.is_truncated() {
            warn!(
                matched = response.total,
                limit = self.config.delete_scan_limit,
                "More documents matched than the delete scan limit; remaining ones are kept"
            );
        }

        let matched = response.total.max(response.hit_count() as u64);
        let mut deleted = 0;
        for hit in &response.hits {
            let result = self
                .with_retry("delete_document", || {
                    self.provider.delete_document(collection, &hit.id)
                })
                .await;

            match result {
                Ok(true) => deleted += 1,
                Ok(false) => debug!(document_id = %hit.id, "Document already gone"),
                Err(e) if deleted == 0 => return Err(e),
                Err(e) => {
                    error!(
                        collection = %collection,
                        document_id = %hit.id,
                        deleted = deleted,
                        matched = matched,
                        error = %e,
                        "Delete stopped early"
                    );
                    break;
                }
            }
        }

        info!(
            collection = %collection,
            deleted = deleted,
            matched = matched,
            "Documents deleted"
        );

        Ok(DeleteOutcome::Deleted { deleted, matched })
    }

    /// Count all documents in a collection after a refresh.
    #[instrument(skip(self))]
    pub async fn count_all(&self, collection: &str) -> Result<u64, SearchIndexError> {
        validate_collection_name(collection)?;

        self.refresh(collection).await?;

        self.with_retry("count", || self.provider.count(collection))
            .await
    }

    /// Group documents by the distinct values of `field`.
    ///
    /// Runs a single terms aggregation capped at `facet_size` buckets with a
    /// minimum document count of one.
    #[instrument(skip(self))]
    pub async fn term_facet(
        &self,
        collection: &str,
        field: &str,
    ) -> Result<FacetReport, SearchIndexError> {
        validate_collection_name(collection)?;
        validate_field(field)?;

        self.refresh(collection).await?;

        let buckets = self
            .with_retry("term_facet", || {
                self.provider
                    .term_facet(collection, field, self.config.facet_size)
            })
            .await?;

        Ok(FacetReport::new(field, buckets))
    }

    /// Check whether the backend is reachable and healthy.
    pub async fn health_check(&self) -> Result<bool, SearchIndexError> {
        self.with_retry("health_check", || self.provider.health_check())
            .await
    }
}
