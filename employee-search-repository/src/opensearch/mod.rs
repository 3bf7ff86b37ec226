//! OpenSearch implementation of the search index provider.
//!
//! This module provides a concrete implementation of `SearchIndexProvider`
//! using OpenSearch as the backend. The same REST surface is served by
//! Elasticsearch 7.x, so the client works against either.

mod client;
mod index_config;
mod queries;
mod responses;

pub use client::{OpenSearchClient, TlsVerification};
pub use index_config::{IndexConfig, KEYWORD_FIELDS};
