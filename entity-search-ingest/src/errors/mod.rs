//! Error types for the entity search ingest.

use entity_search_repository::SearchIndexError;
use thiserror::Error;

/// Errors that can occur while generating and loading documents.
#[derive(Error, Debug)]
pub enum IngestError {
    /// The requested run cannot be executed (e.g. a zero batch size).
    #[error("Invalid generation plan: {0}")]
    InvalidPlan(String),

    /// A bulk submission failed. Earlier batches remain indexed.
    #[error("Batch {batch} failed after {committed} documents were indexed: {source}")]
    BatchFailed {
        batch: usize,
        committed: u64,
        #[source]
        source: SearchIndexError,
    },

    /// The run was stopped by a shutdown signal.
    #[error("Generation cancelled after {committed} documents were indexed")]
    Cancelled { committed: u64 },

    /// The run exceeded its deadline.
    #[error("Generation timed out after {committed} documents were indexed")]
    TimedOut { committed: u64 },

    /// A generation task panicked or was aborted.
    #[error("Generation task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

impl IngestError {
    /// Create an invalid plan error.
    pub fn invalid_plan(msg: impl Into<String>) -> Self {
        Self::InvalidPlan(msg.into())
    }

    /// Documents indexed before the run stopped, where known.
    pub fn committed(&self) -> Option<u64> {
        match self {
            Self::InvalidPlan(_) | Self::TaskFailed(_) => None,
            Self::BatchFailed { committed, .. }
            | Self::Cancelled { committed }
            | Self::TimedOut { committed } => Some(*committed),
        }
    }
}
