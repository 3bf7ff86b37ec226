//! Configuration types for the SearchIndexClient.

use std::time::Duration;

use employee_search_shared::DEFAULT_RESULT_SIZE;

/// Default number of documents sent per bulk request.
pub const DEFAULT_BULK_CHUNK_SIZE: usize = 500;

/// Default cap on hits fetched by a delete-by-key lookup.
///
/// Matches the backend's default `index.max_result_window`.
pub const DEFAULT_DELETE_SCAN_LIMIT: usize = 10_000;

/// Bounded retry policy for transient backend failures.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first try.
    pub max_retries: u32,
    /// Initial retry delay in milliseconds.
    pub initial_retry_delay_ms: u64,
    /// Maximum retry delay in milliseconds.
    pub max_retry_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_retry_delay_ms: 100,
            max_retry_delay_ms: 5000,
        }
    }
}

impl RetryConfig {
    /// Delay to wait before retry number `attempt` (zero-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        let delay_ms = self
            .initial_retry_delay_ms
            .saturating_mul(factor)
            .min(self.max_retry_delay_ms);
        Duration::from_millis(delay_ms)
    }
}

/// Configuration for the SearchIndexClient.
#[derive(Debug, Clone)]
pub struct SearchIndexConfig {
    /// Maximum hits returned by an exact-match search.
    pub result_size: usize,
    /// Maximum buckets returned by a term facet.
    pub facet_size: usize,
    /// Maximum hits fetched by a single delete-by-key lookup.
    pub delete_scan_limit: usize,
    /// Number of documents sent per bulk request.
    pub bulk_chunk_size: usize,
    /// Retry policy for idempotent operations.
    pub retry: RetryConfig,
}

impl Default for SearchIndexConfig {
    fn default() -> Self {
        Self {
            result_size: DEFAULT_RESULT_SIZE,
            facet_size: DEFAULT_RESULT_SIZE,
            delete_scan_limit: DEFAULT_DELETE_SCAN_LIMIT,
            bulk_chunk_size: DEFAULT_BULK_CHUNK_SIZE,
            retry: RetryConfig::default(),
        }
    }
}

impl SearchIndexConfig {
    /// Create a config with a custom delete scan limit.
    pub fn with_delete_scan_limit(mut self, delete_scan_limit: usize) -> Self {
        self.delete_scan_limit = delete_scan_limit.max(1);
        self
    }

    /// Create a config with a custom bulk chunk size.
    pub fn with_bulk_chunk_size(mut self, bulk_chunk_size: usize) -> Self {
        self.bulk_chunk_size = bulk_chunk_size.max(1);
        self
    }

    /// Create a config with a custom retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}
