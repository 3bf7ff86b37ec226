//! Loader module for the employee search ingest.
//!
//! Loads source rows into a search collection.

use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::errors::IngestError;
use crate::source::CsvSource;
use employee_search_repository::{BatchOperationResult, SearchIndexClient};

/// Outcome of loading one source into one collection.
///
/// `succeeded + failed == rows_read` always holds.
#[derive(Debug, Clone)]
pub struct IngestSummary {
    /// Target collection.
    pub collection: String,
    /// Data rows read from the source.
    pub rows_read: usize,
    /// The column dropped from every row, if it was present.
    pub dropped_column: Option<String>,
    /// Documents the backend accepted.
    pub succeeded: usize,
    /// Documents the backend rejected or never received.
    pub failed: usize,
    /// Per-document failure details, by row position.
    pub failures: Vec<BatchOperationResult>,
}

impl IngestSummary {
    /// `(success count, fail count)`.
    pub fn counts(&self) -> (usize, usize) {
        (self.succeeded, self.failed)
    }
}

/// Loader that indexes source rows into the search index.
///
/// The loader is responsible for:
/// - Reading the source with column exclusion
/// - Submitting all rows as one partial-failure-tolerant bulk insertion
/// - Reporting per-document failures
pub struct SearchLoader {
    client: Arc<SearchIndexClient>,
}

impl SearchLoader {
    /// Create a new search loader with the given client.
    pub fn new(client: Arc<SearchIndexClient>) -> Self {
        Self { client }
    }

    /// Read `source`, drop `excluded` and bulk-index every row into `collection`.
    ///
    /// Per-document rejections are counted in the summary rather than
    /// returned as errors. Source errors abort before anything is sent.
    #[instrument(skip(self, source), fields(path = %source.path().display()))]
    pub async fn load_and_index(
        &self,
        collection: &str,
        source: &CsvSource,
        excluded: Option<&str>,
    ) -> Result<IngestSummary, IngestError> {
        let records = source.read(excluded).await.map_err(|e| {
            error!(error = %e, "Failed to read source");
            e
        })?;

        let rows_read = records.documents.len();
        let batch = self
            .client
            .index_documents(collection, &records.documents)
            .await?;

        let failures: Vec<BatchOperationResult> = batch.failures().cloned().collect();
        for failure in failures.iter().take(10) {
            warn!(
                position = failure.position,
                error = ?failure.error,
                "Document rejected"
            );
        }

        let summary = IngestSummary {
            collection: collection.to_string(),
            rows_read,
            dropped_column: records.dropped_column,
            succeeded: batch.succeeded,
            failed: batch.failed,
            failures,
        };

        info!(
            collection = %collection,
            rows = rows_read,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Source loaded"
        );

        Ok(summary)
    }

    /// Check if the search backend is healthy.
    pub async fn health_check(&self) -> Result<bool, IngestError> {
        Ok(self.client.health_check().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceConfig;
    use async_trait::async_trait;
    use employee_search_repository::{
        BatchOperationSummary, SearchIndexError, SearchIndexProvider,
    };
    use employee_search_shared::{Document, FacetBucket, SearchQuery, SearchResponse};
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;
    use tokio::sync::Mutex;

    /// Mock provider that stores indexed documents per collection.
    ///
    /// Clones share their storage, so a test can keep one for assertions.
    #[derive(Clone, Default)]
    struct MockProvider {
        collections: Arc<Mutex<HashMap<String, Vec<Document>>>>,
        /// Employee ID the mock rejects during bulk insertion.
        reject_id: Option<String>,
    }

    impl MockProvider {
        async fn documents(&self, collection: &str) -> Vec<Document> {
            self.collections
                .lock()
                .await
                .get(collection)
                .cloned()
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl SearchIndexProvider for MockProvider {
        async fn collection_exists(&self, collection: &str) -> Result<bool, SearchIndexError> {
            Ok(self.collections.lock().await.contains_key(collection))
        }

        async fn create_collection(&self, collection: &str) -> Result<(), SearchIndexError> {
            self.collections
                .lock()
                .await
                .insert(collection.to_string(), Vec::new());
            Ok(())
        }

        async fn bulk_index_documents(
            &self,
            collection: &str,
            documents: &[Document],
        ) -> Result<BatchOperationSummary, SearchIndexError> {
            let mut collections = self.collections.lock().await;
            let stored = collections.entry(collection.to_string()).or_default();

            let results = documents
                .iter()
                .enumerate()
                .map(|(position, doc)| {
                    let rejected = self.reject_id.is_some()
                        && doc.get_str("Employee ID") == self.reject_id.as_deref();
                    if !rejected {
                        stored.push(doc.clone());
                    }
                    BatchOperationResult {
                        position,
                        document_id: (!rejected).then(|| format!("doc-{}", position)),
                        success: !rejected,
                        error: rejected
                            .then(|| SearchIndexError::backend(400, "mapper_parsing_exception")),
                    }
                })
                .collect();

            Ok(BatchOperationSummary::from_results(results))
        }

        async fn refresh(&self, _collection: &str) -> Result<(), SearchIndexError> {
            Ok(())
        }

        async fn search(
            &self,
            _collection: &str,
            _query: &SearchQuery,
            _track_total: bool,
        ) -> Result<SearchResponse, SearchIndexError> {
            Ok(SearchResponse::empty())
        }

        async fn count(&self, collection: &str) -> Result<u64, SearchIndexError> {
            Ok(self.documents(collection).await.len() as u64)
        }

        async fn delete_document(
            &self,
            _collection: &str,
            _document_id: &str,
        ) -> Result<bool, SearchIndexError> {
            Ok(false)
        }

        async fn term_facet(
            &self,
            _collection: &str,
            _field: &str,
            _size: usize,
        ) -> Result<Vec<FacetBucket>, SearchIndexError> {
            Ok(Vec::new())
        }

        async fn health_check(&self) -> Result<bool, SearchIndexError> {
            Ok(true)
        }
    }

    const FIVE_ROWS: &[u8] = b"Employee ID,Department,Gender\n\
        E02001,IT,Male\n\
        E02002,Finance,Female\n\
        E02003,IT,Female\n\
        E02004,Sales,Male\n\
        E02005,IT,Male\n";

    fn setup(provider: MockProvider) -> (SearchLoader, Arc<SearchIndexClient>, MockProvider) {
        let client = Arc::new(SearchIndexClient::new(Box::new(provider.clone())));
        (SearchLoader::new(client.clone()), client, provider)
    }

    fn write_source(dir: &TempDir, contents: &[u8]) -> CsvSource {
        let path = dir.path().join("employees.csv");
        fs::write(&path, contents).unwrap();
        CsvSource::new(SourceConfig::new(path))
    }

    #[tokio::test]
    async fn test_load_five_rows_excluding_department() {
        let dir = TempDir::new().unwrap();
        let source = write_source(&dir, FIVE_ROWS);
        let (loader, client, provider) = setup(MockProvider::default());
        client.ensure_collection("hash_praveenkumar").await.unwrap();

        let summary = loader
            .load_and_index("hash_praveenkumar", &source, Some("Department"))
            .await
            .unwrap();

        assert_eq!(summary.rows_read, 5);
        assert_eq!(summary.counts(), (5, 0));
        assert_eq!(summary.dropped_column.as_deref(), Some("Department"));

        let docs = provider.documents("hash_praveenkumar").await;
        assert_eq!(docs.len(), 5);
        assert!(docs.iter().all(|doc| !doc.contains_field("Department")));
        assert!(docs
            .iter()
            .all(|doc| doc.has_value("Employee ID") && doc.has_value("Gender")));

        assert_eq!(client.count_all("hash_praveenkumar").await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_load_reports_rejected_documents() {
        let dir = TempDir::new().unwrap();
        let source = write_source(&dir, FIVE_ROWS);
        let (loader, client, _provider) = setup(MockProvider {
            reject_id: Some("E02003".to_string()),
            ..MockProvider::default()
        });
        client.ensure_collection("hash_0233").await.unwrap();

        let summary = loader
            .load_and_index("hash_0233", &source, Some("Gender"))
            .await
            .unwrap();

        assert_eq!(summary.counts(), (4, 1));
        assert_eq!(summary.succeeded + summary.failed, summary.rows_read);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].position, 2);
    }

    #[tokio::test]
    async fn test_load_missing_source_sends_nothing() {
        let dir = TempDir::new().unwrap();
        let source = CsvSource::new(SourceConfig::new(dir.path().join("missing.csv")));
        let (loader, _client, provider) = setup(MockProvider::default());

        let result = loader.load_and_index("hash_0233", &source, None).await;

        assert!(matches!(result, Err(IngestError::SourceNotFound(_))));
        assert!(provider.collections.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_load_invalid_collection_name() {
        let dir = TempDir::new().unwrap();
        let source = write_source(&dir, FIVE_ROWS);
        let (loader, _client, _provider) = setup(MockProvider::default());

        let result = loader.load_and_index("Hash_Upper", &source, None).await;

        assert!(matches!(
            result,
            Err(IngestError::SearchError(SearchIndexError::ValidationError(_)))
        ));
    }

    #[tokio::test]
    async fn test_health_check() {
        let (loader, _client, _provider) = setup(MockProvider::default());
        assert!(loader.health_check().await.unwrap());
    }
}
