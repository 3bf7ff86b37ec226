//! The fixed demonstration sequence.
//!
//! Creates two collections, loads the employee file into both with a
//! different column dropped from each, then deletes, searches and facets.
//! A failing step is reported and the sequence moves on.

use std::io::Write;
use std::sync::Arc;

use colored::Colorize;
use tracing::{debug, warn};

use crate::config::Dependencies;
use crate::AppError;
use employee_search_ingest::{CsvSource, SearchLoader};
use employee_search_repository::{CollectionStatus, DeleteOutcome, SearchIndexClient};

/// Collection loaded without the `Department` column.
pub const PRIMARY_COLLECTION: &str = "hash_praveenkumar";

/// Collection loaded without the `Gender` column.
pub const SECONDARY_COLLECTION: &str = "hash_0233";

/// Employee removed from the primary collection.
pub const DELETED_EMPLOYEE_ID: &str = "E02004";

const DEPARTMENT: &str = "Department";
const GENDER: &str = "Gender";
const EMPLOYEE_ID: &str = "Employee ID";

/// Runs the demonstration against a wired client and writes a report.
pub struct DemoRunner {
    client: Arc<SearchIndexClient>,
    loader: SearchLoader,
    source: CsvSource,
}

impl DemoRunner {
    pub fn new(dependencies: Dependencies) -> Self {
        Self {
            client: dependencies.client,
            loader: dependencies.loader,
            source: dependencies.source,
        }
    }

    /// Run every step, writing human-readable results to `out`.
    ///
    /// Only failures to write the report are returned.
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<(), AppError> {
        heading(out, "Creating collections:")?;
        self.create_collection(out, PRIMARY_COLLECTION).await?;
        self.create_collection(out, SECONDARY_COLLECTION).await?;

        heading(out, "Initial counts:")?;
        self.count(out, PRIMARY_COLLECTION).await?;
        self.count(out, SECONDARY_COLLECTION).await?;

        heading(out, "Indexing data:")?;
        self.index(out, PRIMARY_COLLECTION, DEPARTMENT).await?;
        self.index(out, SECONDARY_COLLECTION, GENDER).await?;

        heading(out, "Updated counts:")?;
        self.count(out, PRIMARY_COLLECTION).await?;
        self.count(out, SECONDARY_COLLECTION).await?;

        heading(out, "Deleting employee:")?;
        self.delete_employee(out, PRIMARY_COLLECTION, DELETED_EMPLOYEE_ID)
            .await?;

        heading(out, "Searching for IT department employees:")?;
        self.search(out, PRIMARY_COLLECTION, DEPARTMENT, "IT").await?;
        heading(out, "Searching for Male employees:")?;
        self.search(out, PRIMARY_COLLECTION, GENDER, "Male").await?;
        heading(out, "Searching for IT department employees:")?;
        self.search(out, SECONDARY_COLLECTION, DEPARTMENT, "IT").await?;

        heading(out, "Getting department facets:")?;
        self.department_facet(out, PRIMARY_COLLECTION).await?;
        self.department_facet(out, SECONDARY_COLLECTION).await?;

        Ok(())
    }

    /// Release the client once the loader no longer holds it.
    pub fn close(self) {
        let Self { client, loader, .. } = self;
        drop(loader);
        match Arc::try_unwrap(client) {
            Ok(client) => client.close(),
            Err(_) => debug!("Search client still shared; released on drop"),
        }
    }

    async fn create_collection<W: Write>(&self, out: &mut W, name: &str) -> Result<(), AppError> {
        match self.client.ensure_collection(name).await {
            Ok(CollectionStatus::Created) => {
                writeln!(out, "Collection {} created successfully", name)?
            }
            Ok(CollectionStatus::AlreadyExists) => {
                writeln!(out, "Collection {} already exists", name)?
            }
            Err(e) => failure(out, "Error creating collection", &e)?,
        }
        Ok(())
    }

    async fn count<W: Write>(&self, out: &mut W, name: &str) -> Result<(), AppError> {
        match self.client.count_all(name).await {
            Ok(count) => writeln!(out, "Total employees in {}: {}", name, count)?,
            Err(e) => failure(out, "Error getting employee count", &e)?,
        }
        Ok(())
    }

    async fn index<W: Write>(
        &self,
        out: &mut W,
        name: &str,
        excluded: &str,
    ) -> Result<(), AppError> {
        match self
            .loader
            .load_and_index(name, &self.source, Some(excluded))
            .await
        {
            Ok(summary) => {
                let (succeeded, failed) = summary.counts();
                writeln!(out, "Read {} records from CSV file", summary.rows_read)?;
                writeln!(
                    out,
                    "Successfully indexed {} documents in {}",
                    succeeded, name
                )?;
                if failed > 0 {
                    writeln!(
                        out,
                        "{}",
                        format!("Failed to index {} documents", failed).yellow()
                    )?;
                }
            }
            Err(e) => {
                failure(out, "Error indexing data", &e)?;
                writeln!(
                    out,
                    "Please ensure your CSV file exists and has the correct format"
                )?;
            }
        }
        Ok(())
    }

    async fn delete_employee<W: Write>(
        &self,
        out: &mut W,
        name: &str,
        employee_id: &str,
    ) -> Result<(), AppError> {
        match self
            .client
            .delete_by_key(name, EMPLOYEE_ID, employee_id)
            .await
        {
            Ok(DeleteOutcome::NotFound) => {
                writeln!(out, "No documents found with Employee ID: {}", employee_id)?
            }
            Ok(outcome) => {
                writeln!(out, "Employee ID: {} deleted", employee_id)?;
                if !outcome.is_complete() {
                    warn!(employee_id = %employee_id, "Delete left matching documents behind");
                    writeln!(
                        out,
                        "{}",
                        format!(
                            "Only {} matching documents deleted; run again to remove the rest",
                            outcome.deleted_count()
                        )
                        .yellow()
                    )?;
                }
            }
            Err(e) => failure(out, "Error deleting employee", &e)?,
        }
        Ok(())
    }

    async fn search<W: Write>(
        &self,
        out: &mut W,
        name: &str,
        field: &str,
        value: &str,
    ) -> Result<(), AppError> {
        match self.client.exact_match(name, field, value).await {
            Ok(response) if response.is_match() => writeln!(
                out,
                "Found {} matches for {}: {}",
                response.hit_count(),
                field,
                value
            )?,
            Ok(_) => writeln!(out, "No matches found for {}: {}", field, value)?,
            Err(e) => failure(out, "Error searching data", &e)?,
        }
        Ok(())
    }

    async fn department_facet<W: Write>(&self, out: &mut W, name: &str) -> Result<(), AppError> {
        match self.client.term_facet(name, DEPARTMENT).await {
            Ok(report) if report.is_empty() => writeln!(out, "No department data found")?,
            Ok(report) => {
                writeln!(out, "Department facet for {}:", name)?;
                for bucket in &report.buckets {
                    writeln!(out, "{}: {} employees", bucket.key, bucket.doc_count)?;
                }
            }
            Err(e) => failure(out, "Error getting department facet", &e)?,
        }
        Ok(())
    }
}

fn heading<W: Write>(out: &mut W, title: &str) -> Result<(), AppError> {
    writeln!(out)?;
    writeln!(out, "{}", title.bold())?;
    Ok(())
}

fn failure<W: Write>(
    out: &mut W,
    context: &str,
    error: &dyn std::error::Error,
) -> Result<(), AppError> {
    writeln!(out, "{}", format!("{}: {}", context, error).red())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use async_trait::async_trait;
    use employee_search_ingest::SourceConfig;
    use employee_search_repository::{
        BatchOperationResult, BatchOperationSummary, SearchIndexError, SearchIndexProvider,
    };
    use employee_search_shared::{Document, FacetBucket, SearchHit, SearchQuery, SearchResponse};
    use std::collections::{BTreeMap, HashMap};
    use std::fs;
    use tempfile::TempDir;
    use tokio::sync::Mutex;

    /// In-memory backend with immediate visibility.
    #[derive(Clone, Default)]
    struct MockProvider {
        collections: Arc<Mutex<HashMap<String, BTreeMap<String, Document>>>>,
        next_id: Arc<Mutex<usize>>,
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
                .insert(collection.to_string(), BTreeMap::new());
            Ok(())
        }

        async fn bulk_index_documents(
            &self,
            collection: &str,
            documents: &[Document],
        ) -> Result<BatchOperationSummary, SearchIndexError> {
            let mut collections = self.collections.lock().await;
            let stored = collections.entry(collection.to_string()).or_default();
            let mut next_id = self.next_id.lock().await;

            let results = documents
                .iter()
                .enumerate()
                .map(|(position, doc)| {
                    *next_id += 1;
                    let id = format!("{:06}", *next_id);
                    stored.insert(id.clone(), doc.clone());
                    BatchOperationResult {
                        position,
                        document_id: Some(id),
                        success: true,
                        error: None,
                    }
                })
                .collect();

            Ok(BatchOperationSummary::from_results(results))
        }

        async fn refresh(&self, collection: &str) -> Result<(), SearchIndexError> {
            if self.collections.lock().await.contains_key(collection) {
                Ok(())
            } else {
                Err(SearchIndexError::collection_not_found(collection))
            }
        }

        async fn search(
            &self,
            collection: &str,
            query: &SearchQuery,
            _track_total: bool,
        ) -> Result<SearchResponse, SearchIndexError> {
            let collections = self.collections.lock().await;
            let hits: Vec<SearchHit> = collections
                .get(collection)
                .into_iter()
                .flatten()
                .filter(|(_, doc)| doc.get_str(&query.field) == Some(query.value.as_str()))
                .map(|(id, doc)| SearchHit {
                    id: id.clone(),
                    source: doc.clone(),
                })
                .collect();
            let total = hits.len() as u64;
            Ok(SearchResponse {
                hits: hits.into_iter().take(query.size).collect(),
                total,
            })
        }

        async fn count(&self, collection: &str) -> Result<u64, SearchIndexError> {
            Ok(self
                .collections
                .lock()
                .await
                .get(collection)
                .map(|docs| docs.len() as u64)
                .unwrap_or(0))
        }

        async fn delete_document(
            &self,
            collection: &str,
            document_id: &str,
        ) -> Result<bool, SearchIndexError> {
            Ok(self
                .collections
                .lock()
                .await
                .get_mut(collection)
                .and_then(|docs| docs.remove(document_id))
                .is_some())
        }

        async fn term_facet(
            &self,
            collection: &str,
            field: &str,
            size: usize,
        ) -> Result<Vec<FacetBucket>, SearchIndexError> {
            let collections = self.collections.lock().await;
            let mut counts: BTreeMap<String, u64> = BTreeMap::new();
            for doc in collections.get(collection).into_iter().flat_map(|d| d.values()) {
                if let Some(key) = doc.get_str(field) {
                    *counts.entry(key.to_string()).or_default() += 1;
                }
            }
            let mut buckets: Vec<FacetBucket> = counts
                .into_iter()
                .map(|(key, doc_count)| FacetBucket { key, doc_count })
                .collect();
            buckets.sort_by(|a, b| b.doc_count.cmp(&a.doc_count));
            buckets.truncate(size);
            Ok(buckets)
        }

        async fn health_check(&self) -> Result<bool, SearchIndexError> {
            Ok(true)
        }
    }

    const EMPLOYEES: &[u8] = b"Employee ID,Full Name,Department,Gender\n\
        E02001,Kai Le,IT,Male\n\
        E02002,Robert Patel,IT,Male\n\
        E02003,Cameron Lo,Finance,Female\n\
        E02004,Harper Castillo,IT,Female\n\
        E02005,Harper Dominguez,Sales,Male\n";

    async fn runner(dir: &TempDir, provider: MockProvider) -> DemoRunner {
        let path = dir.path().join("employees.csv");
        fs::write(&path, EMPLOYEES).unwrap();
        let mut settings = Settings::from_lookup(|_: &str| None).unwrap();
        settings.source = SourceConfig::new(path);
        let deps = Dependencies::with_provider(Box::new(provider), &settings)
            .await
            .unwrap();
        DemoRunner::new(deps)
    }

    async fn run_to_string(runner: &DemoRunner) -> String {
        let mut out = Vec::new();
        runner.run(&mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn test_full_sequence() {
        let dir = TempDir::new().unwrap();
        let provider = MockProvider::default();
        let runner = runner(&dir, provider.clone()).await;

        let report = run_to_string(&runner).await;

        assert!(report.contains("Collection hash_praveenkumar created successfully"));
        assert!(report.contains("Collection hash_0233 created successfully"));
        assert!(report.contains("Total employees in hash_praveenkumar: 0"));
        assert!(report.contains("Read 5 records from CSV file"));
        assert!(report.contains("Successfully indexed 5 documents in hash_praveenkumar"));
        assert!(report.contains("Total employees in hash_0233: 5"));
        assert!(report.contains("Employee ID: E02004 deleted"));
        // Department was dropped from the primary collection.
        assert!(report.contains("No matches found for Department: IT"));
        assert!(report.contains("Found 3 matches for Gender: Male"));
        assert!(report.contains("Found 3 matches for Department: IT"));
        assert!(report.contains("No department data found"));
        assert!(report.contains("Department facet for hash_0233:"));
        assert!(report.contains("IT: 3 employees"));

        let collections = provider.collections.lock().await;
        assert_eq!(collections[PRIMARY_COLLECTION].len(), 4);
        assert_eq!(collections[SECONDARY_COLLECTION].len(), 5);
        drop(collections);

        runner.close();
    }

    #[tokio::test]
    async fn test_second_run_reports_existing_collections() {
        let dir = TempDir::new().unwrap();
        let provider = MockProvider::default();
        let runner = runner(&dir, provider.clone()).await;
        run_to_string(&runner).await;

        let report = run_to_string(&runner).await;

        assert!(report.contains("Collection hash_praveenkumar already exists"));
        assert!(report.contains("Total employees in hash_praveenkumar: 4"));
        assert!(report.contains("Employee ID: E02004 deleted"));
    }

    #[tokio::test]
    async fn test_missing_source_continues_sequence() {
        let dir = TempDir::new().unwrap();
        let provider = MockProvider::default();
        let mut settings = Settings::from_lookup(|_: &str| None).unwrap();
        settings.source = SourceConfig::new(dir.path().join("missing.csv"));
        let deps = Dependencies::with_provider(Box::new(provider), &settings)
            .await
            .unwrap();
        let runner = DemoRunner::new(deps);

        let report = run_to_string(&runner).await;

        assert!(report.contains("Error indexing data"));
        assert!(report.contains("Please ensure your CSV file exists"));
        assert!(report.contains("No documents found with Employee ID: E02004"));
        assert!(report.contains("No department data found"));
    }
}
