//! Interface definitions for the search index backend.
//!
//! The `SearchIndexProvider` trait allows dependency injection of the backend,
//! so handlers and loaders can run against OpenSearch or an in-memory stand-in.

mod search_index_provider;

pub use search_index_provider::SearchIndexProvider;
