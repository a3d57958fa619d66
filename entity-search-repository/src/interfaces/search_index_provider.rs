//! Search index provider trait definition.
//!
//! This module defines the abstract interface for search index operations,
//! allowing for different backend implementations (OpenSearch, in-memory, etc.).

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SearchIndexError;
use crate::types::BatchOperationSummary;
use entity_search_shared::Entity;

/// Abstracts the underlying search index implementation.
///
/// Implementations are injected into `SearchIndexClient`. Every method targets
/// the single entity index the provider was configured with. Raw engine bodies
/// are returned as `serde_json::Value` so callers can pass them through unchanged.
///
/// Not-found conditions must be reported as `SearchIndexError::DocumentNotFound`
/// or `SearchIndexError::IndexNotFound`, and an index creation conflict as
/// `SearchIndexError::IndexAlreadyExists`.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Name of the index this provider operates on.
    fn index_name(&self) -> &str;

    /// Create the index with the given settings and mappings.
    async fn create_index(&self, settings: &Value) -> Result<Value, SearchIndexError>;

    /// Drop the index and every document in it.
    async fn delete_index(&self) -> Result<Value, SearchIndexError>;

    /// Fetch a document by identifier. Returns the engine envelope including `_source`.
    async fn get_document(&self, document_id: &str) -> Result<Value, SearchIndexError>;

    /// Index a single entity, replacing any document with the same identifier.
    async fn index_document(&self, entity: &Entity) -> Result<Value, SearchIndexError>;

    /// Merge `partial` into the stored document.
    ///
    /// # Returns
    ///
    /// * `Ok(Value)` - The engine response
    /// * `Err(SearchIndexError::DocumentNotFound)` - If the document doesn't exist
    async fn update_document(
        &self,
        document_id: &str,
        partial: &Value,
    ) -> Result<Value, SearchIndexError>;

    /// Delete a single document.
    async fn delete_document(&self, document_id: &str) -> Result<Value, SearchIndexError>;

    /// Run a search request body and return the `_source` of each hit, in engine order.
    async fn search(&self, body: &Value) -> Result<Vec<Value>, SearchIndexError>;

    /// Index multiple entities in one bulk request and summarize per-document outcomes.
    ///
    /// # Returns
    ///
    /// * `Ok(BatchOperationSummary)` - Contains aggregate statistics and individual results
    /// * `Err(SearchIndexError)` - If the bulk request fails entirely
    async fn bulk_index_documents(
        &self,
        entities: &[Entity],
    ) -> Result<BatchOperationSummary, SearchIndexError>;

    /// Number of documents in the index.
    async fn count(&self) -> Result<u64, SearchIndexError>;

    /// Whether the engine reports itself healthy (green or yellow).
    async fn health_check(&self) -> Result<bool, SearchIndexError>;
}
