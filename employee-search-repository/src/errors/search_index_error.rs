//! Search index error types.
//!
//! This module defines the error types that can occur during search index operations.

use thiserror::Error;

/// Errors that can occur during search index operations.
///
/// Not-found conditions on reads (no hits, no buckets, nothing to delete) are
/// reported as values by the client, not through this type. The one exception
/// is [`SearchIndexError::CollectionNotFound`], which signals that the target
/// collection itself is missing.
#[derive(Debug, Clone, Error)]
pub enum SearchIndexError {
    /// Validation error (e.g., empty field name, invalid collection name).
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Failed to establish connection to the search engine.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Failed to create a collection.
    #[error("Index creation error: {0}")]
    IndexCreationError(String),

    /// Failed to check or refresh a collection.
    #[error("Index error: {0}")]
    IndexError(String),

    /// Bulk operation failed as a whole.
    #[error("Bulk operation error: {0}")]
    BulkOperationError(String),

    /// Search, count or aggregation failed.
    #[error("Query error: {0}")]
    QueryError(String),

    /// Failed to delete a document.
    #[error("Delete error: {0}")]
    DeleteError(String),

    /// Failed to parse a response from the search engine.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The target collection does not exist.
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    /// The backend answered with a non-success HTTP status.
    #[error("Backend returned status {status}: {message}")]
    BackendError { status: u16, message: String },
}

impl SearchIndexError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a bulk operation error.
    pub fn bulk_operation(msg: impl Into<String>) -> Self {
        Self::BulkOperationError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a collection not found error.
    pub fn collection_not_found(collection: &str) -> Self {
        Self::CollectionNotFound(collection.to_string())
    }

    /// Create a backend status error.
    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        Self::BackendError {
            status,
            message: message.into(),
        }
    }

    /// Determine if an error is transient and worth retrying.
    ///
    /// Connection failures and throttling/unavailability statuses are
    /// retryable. Validation, parse and not-found errors are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionError(_) => true,
            Self::BackendError { status, .. } => matches!(status, 429 | 502 | 503 | 504),
            Self::ValidationError(_)
            | Self::IndexCreationError(_)
            | Self::IndexError(_)
            | Self::BulkOperationError(_)
            | Self::QueryError(_)
            | Self::DeleteError(_)
            | Self::ParseError(_)
            | Self::CollectionNotFound(_) => false,
        }
    }
}
