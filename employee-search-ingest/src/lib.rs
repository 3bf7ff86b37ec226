//! # Employee Search Ingest
//!
//! This crate provides the ingest components for loading tabular employee
//! data into the search index.
//!
//! ## Architecture
//!
//! 1. **Source**: Reads and decodes the CSV file, normalising missing values
//!    and inferring column types
//! 2. **Loader**: Drops the excluded column and bulk-indexes the rows through
//!    the `SearchIndexClient`

pub mod errors;
pub mod loader;
pub mod source;

pub use errors::IngestError;
pub use loader::{IngestSummary, SearchLoader};
pub use source::{CsvSource, SourceConfig, SourceRecords};
