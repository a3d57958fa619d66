//! # Entity Search Repository
//!
//! This crate provides traits and implementations for interacting with the
//! search engine. It includes definitions for errors, interfaces, request
//! types, and a concrete implementation for OpenSearch.
//!
//! ## Architecture
//!
//! - `SearchIndexClient` validates requests and builds engine bodies.
//! - `SearchIndexProvider` is the seam to the engine.
//! - `OpenSearchClient` implements the provider over HTTP.
//!
//! ## Usage
//!
//! ```ignore
//! use entity_search_repository::{OpenSearchClient, OpenSearchConfig, SearchIndexClient};
//!
//! let provider = OpenSearchClient::new(OpenSearchConfig::default())?;
//! let client = SearchIndexClient::new(Box::new(provider));
//! client.create_index().await?;
//! ```

pub mod client;
pub mod config;
pub mod errors;
pub mod interfaces;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod opensearch;
pub mod types;

pub use client::SearchIndexClient;
pub use config::{OpenSearchConfig, SearchIndexConfig};
pub use errors::SearchIndexError;
pub use interfaces::SearchIndexProvider;
pub use opensearch::OpenSearchClient;
pub use types::{
    BatchOperationResult, BatchOperationSummary, CreateEntityRequest, EventRequest,
    JobPostRequest, UpdateEntityRequest,
};
