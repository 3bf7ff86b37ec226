//! Error types for the employee search ingest.

use employee_search_repository::SearchIndexError;
use thiserror::Error;

/// Errors that can occur while loading a source file into the search index.
#[derive(Error, Debug)]
pub enum IngestError {
    /// The source file does not exist.
    #[error("Source not found: {0}")]
    SourceNotFound(String),

    /// The source file exists but could not be read or decoded.
    #[error("Read error: {0}")]
    ReadError(String),

    /// The CSV parser rejected the input.
    #[error("CSV error: {0}")]
    Csv(String),

    /// A data row does not fit the header.
    #[error("Malformed row at line {line}: {reason}")]
    MalformedRow { line: u64, reason: String },

    /// Error from the search backend.
    #[error("Search error: {0}")]
    SearchError(#[from] SearchIndexError),
}

impl IngestError {
    /// Create a read error.
    pub fn read(msg: impl Into<String>) -> Self {
        Self::ReadError(msg.into())
    }

    /// Create a malformed row error.
    pub fn malformed_row(line: u64, reason: impl Into<String>) -> Self {
        Self::MalformedRow {
            line,
            reason: reason.into(),
        }
    }
}

impl From<csv::Error> for IngestError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}
