//! # Employee Search Shared
//!
//! Backend-neutral types shared by the repository, ingest and binary crates:
//! the flat [`Document`] built from one source row, the [`SearchQuery`] value
//! object, and the response and facet types returned by the search client.

mod document;
mod facet;
mod query;

pub use document::Document;
pub use facet::{FacetBucket, FacetReport};
pub use query::{SearchHit, SearchQuery, SearchResponse, DEFAULT_RESULT_SIZE};
