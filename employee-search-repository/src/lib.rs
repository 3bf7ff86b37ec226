//! # Employee Search Repository
//!
//! This crate provides traits and implementations for interacting with the
//! search backend. It includes definitions for errors, interfaces, and a
//! concrete implementation for OpenSearch, plus the `SearchIndexClient`
//! facade that application code talks to.

pub mod client;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod types;

pub use client::{validate_collection_name, SearchIndexClient};
pub use config::{RetryConfig, SearchIndexConfig};
pub use errors::SearchIndexError;
pub use interfaces::SearchIndexProvider;
pub use opensearch::{IndexConfig, OpenSearchClient, TlsVerification};
pub use types::{BatchOperationResult, BatchOperationSummary, CollectionStatus, DeleteOutcome};
