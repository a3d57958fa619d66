//! # Entity Search
//!
//! HTTP service over the entity search index.
//!
//! This crate wires configuration, the OpenSearch connection, and the bulk
//! loader into an axum router.

pub mod config;
pub mod http;

pub use config::{Dependencies, Settings};

use entity_search_repository::SearchIndexError;
use thiserror::Error;

/// Errors that can occur during service initialization or execution.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Search error.
    #[error("Search error: {0}")]
    SearchError(#[from] SearchIndexError),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ServiceError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
