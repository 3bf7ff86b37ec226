//! # Employee Search
//!
//! Main library for the employee search ingestion and query client.
//!
//! This crate provides the configuration, dependency wiring and the
//! demonstration sequence run by the `employee-search` binary.

pub mod config;
pub mod demo;

pub use config::{Dependencies, Settings};
pub use demo::DemoRunner;

use thiserror::Error;

/// Errors that can occur during startup or while writing the report.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Ingest error.
    #[error("Ingest error: {0}")]
    IngestError(#[from] employee_search_ingest::IngestError),

    /// Search error.
    #[error("Search error: {0}")]
    SearchError(#[from] employee_search_repository::SearchIndexError),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
