//! Search index error types.
//!
//! This module defines the error types that can occur during search index operations.

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur during search index operations.
#[derive(Debug, Clone, Error)]
pub enum SearchIndexError {
    /// Validation error (e.g., missing required fields).
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Failed to reach the search engine.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Document not found.
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// The target index does not exist.
    #[error("Index not found: {0}")]
    IndexNotFound(String),

    /// Index creation conflicted with an existing index. Carries the engine body.
    #[error("Index already exists: {index}")]
    IndexAlreadyExists { index: String, body: Value },

    /// The engine rejected the request.
    #[error("Engine returned status {status}: {reason}")]
    EngineError { status: u16, reason: String },

    /// Bulk operation had failures.
    #[error("Bulk operation error: {0}")]
    BulkOperationError(String),

    /// Batch size exceeds configured maximum.
    #[error("Batch size {provided} exceeds maximum {max}")]
    BatchSizeExceeded { provided: usize, max: usize },

    /// Failed to encode a request or decode a response.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl SearchIndexError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a document not found error.
    pub fn document_not_found(document_id: impl Into<String>) -> Self {
        Self::DocumentNotFound(document_id.into())
    }

    /// Create an index not found error.
    pub fn index_not_found(index: impl Into<String>) -> Self {
        Self::IndexNotFound(index.into())
    }

    /// Create an engine error from a status code and reason.
    pub fn engine(status: u16, reason: impl Into<String>) -> Self {
        Self::EngineError {
            status,
            reason: reason.into(),
        }
    }

    /// Create a bulk operation error.
    pub fn bulk_operation(msg: impl Into<String>) -> Self {
        Self::BulkOperationError(msg.into())
    }

    /// Create a batch size exceeded error.
    pub fn batch_size_exceeded(provided: usize, max: usize) -> Self {
        Self::BatchSizeExceeded { provided, max }
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Whether the error means the addressed document or index is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::DocumentNotFound(_) | Self::IndexNotFound(_))
    }
}

impl From<serde_json::Error> for SearchIndexError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_not_found() {
        assert!(SearchIndexError::document_not_found("abc").is_not_found());
        assert!(SearchIndexError::index_not_found("entity").is_not_found());
        assert!(!SearchIndexError::connection("refused").is_not_found());
        assert!(!SearchIndexError::engine(500, "boom").is_not_found());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            SearchIndexError::batch_size_exceeded(10, 5).to_string(),
            "Batch size 10 exceeds maximum 5"
        );
        assert_eq!(
            SearchIndexError::engine(400, "mapper_parsing_exception").to_string(),
            "Engine returned status 400: mapper_parsing_exception"
        );
    }
}
