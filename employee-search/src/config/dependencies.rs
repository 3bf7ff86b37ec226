//! Dependency initialization and wiring for the employee search client.

use std::env;
use std::sync::Arc;
use tracing::info;

use crate::AppError;
use employee_search_ingest::{
    source::{DEFAULT_ENCODING, DEFAULT_SOURCE_PATH},
    CsvSource, SearchLoader, SourceConfig,
};
use employee_search_repository::{
    config::DEFAULT_DELETE_SCAN_LIMIT, IndexConfig, OpenSearchClient, RetryConfig,
    SearchIndexClient, SearchIndexConfig, SearchIndexProvider, TlsVerification,
};

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Settings read from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub opensearch_url: String,
    pub tls: TlsVerification,
    pub source: SourceConfig,
    pub search: SearchIndexConfig,
}

impl Settings {
    /// Read settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `OPENSEARCH_INSECURE_SKIP_VERIFY`: disable TLS certificate validation (default: false)
    /// - `EMPLOYEE_CSV_PATH`: source file (default: EmployeeSampleData1.csv)
    /// - `EMPLOYEE_CSV_ENCODING`: source encoding label (default: ISO-8859-1)
    /// - `SEARCH_MAX_RETRIES`: retries for transient failures (default: 3)
    /// - `SEARCH_DELETE_SCAN_LIMIT`: delete-by-key scan cap (default: 10000)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`, which returns a variable's value if set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let opensearch_url =
            lookup("OPENSEARCH_URL").unwrap_or_else(|| DEFAULT_OPENSEARCH_URL.to_string());

        let skip_verify = match lookup("OPENSEARCH_INSECURE_SKIP_VERIFY") {
            Some(value) => parse_flag("OPENSEARCH_INSECURE_SKIP_VERIFY", &value)?,
            None => false,
        };
        let tls = if skip_verify {
            TlsVerification::Disabled
        } else {
            TlsVerification::Enabled
        };

        let source = SourceConfig::new(
            lookup("EMPLOYEE_CSV_PATH").unwrap_or_else(|| DEFAULT_SOURCE_PATH.to_string()),
        )
        .with_encoding(
            lookup("EMPLOYEE_CSV_ENCODING").unwrap_or_else(|| DEFAULT_ENCODING.to_string()),
        );

        let default_retry = RetryConfig::default();
        let retry = RetryConfig {
            max_retries: parse_number(&lookup, "SEARCH_MAX_RETRIES", default_retry.max_retries)?,
            ..default_retry
        };
        let delete_scan_limit =
            parse_number(&lookup, "SEARCH_DELETE_SCAN_LIMIT", DEFAULT_DELETE_SCAN_LIMIT)?;
        if delete_scan_limit == 0 {
            return Err(AppError::config("SEARCH_DELETE_SCAN_LIMIT must be at least 1"));
        }

        let search = SearchIndexConfig::default()
            .with_retry(retry)
            .with_delete_scan_limit(delete_scan_limit);

        Ok(Self {
            opensearch_url,
            tls,
            source,
            search,
        })
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool, AppError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "" | "0" | "false" | "no" => Ok(false),
        other => Err(AppError::config(format!(
            "{} must be true or false, got '{}'",
            name, other
        ))),
    }
}

fn parse_number<F, T>(lookup: &F, name: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(value) => value.trim().parse().map_err(|_| {
            AppError::config(format!(
                "{} must be a non-negative integer, got '{}'",
                name, value
            ))
        }),
        None => Ok(default),
    }
}

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The shared search client.
    pub client: Arc<SearchIndexClient>,
    /// Loader bound to the same client.
    pub loader: SearchLoader,
    /// The configured source file.
    pub source: CsvSource,
}

impl Dependencies {
    /// Initialize all dependencies from the given settings.
    ///
    /// Connects to OpenSearch and verifies the cluster is healthy before
    /// returning.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(AppError)` - If the client cannot be built or the backend is unreachable
    pub async fn new(settings: &Settings) -> Result<Self, AppError> {
        info!(
            opensearch_url = %settings.opensearch_url,
            source = %settings.source.path.display(),
            encoding = %settings.source.encoding,
            "Initializing dependencies"
        );

        // Initialize OpenSearch client
        let search_client = OpenSearchClient::new(
            &settings.opensearch_url,
            IndexConfig::default(),
            settings.tls,
        )
        .map_err(|e| AppError::config(format!("Failed to create OpenSearch client: {}", e)))?;

        Self::with_provider(Box::new(search_client), settings).await
    }

    /// Wire dependencies around an already constructed provider.
    pub async fn with_provider(
        provider: Box<dyn SearchIndexProvider>,
        settings: &Settings,
    ) -> Result<Self, AppError> {
        let client = Arc::new(SearchIndexClient::with_config(
            provider,
            settings.search.clone(),
        ));

        // Verify the backend is reachable
        let healthy = client
            .health_check()
            .await
            .map_err(|e| AppError::config(format!("OpenSearch health check failed: {}", e)))?;

        if !healthy {
            return Err(AppError::config("OpenSearch cluster is unhealthy"));
        }

        info!("OpenSearch connection verified");

        let loader = SearchLoader::new(client.clone());
        let source = CsvSource::new(settings.source.clone());

        Ok(Self {
            client,
            loader,
            source,
        })
    }
}
