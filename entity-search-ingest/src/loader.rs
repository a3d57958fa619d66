//! Bulk loader for synthetic entities.
//!
//! A run is described by a [`GenerationPlan`]: `total` documents split into
//! batches of `batch_size`, the last one holding the remainder. Each batch is
//! generated, submitted as one bulk request, and awaited before the next one
//! is built. The first failed batch ends the run; documents from earlier
//! batches stay in the index.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use crate::errors::IngestError;
use crate::generator::generate_batch;
use entity_search_repository::SearchIndexClient;

/// Configuration for the bulk loader.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Number of documents per bulk request.
    pub batch_size: usize,
    /// Number of documents a run generates unless overridden.
    pub total_documents: u64,
    /// Upper bound on the duration of one run. `None` means no deadline.
    pub timeout: Option<Duration>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: 2000,
            total_documents: 10_000_000,
            timeout: None,
        }
    }
}

/// How many documents to generate and how to split them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationPlan {
    total: u64,
    batch_size: usize,
}

impl GenerationPlan {
    /// Create a plan. A zero batch size is rejected; a zero total is a no-op run.
    pub fn new(total: u64, batch_size: usize) -> Result<Self, IngestError> {
        if batch_size == 0 {
            return Err(IngestError::invalid_plan("batch_size must be at least 1"));
        }
        Ok(Self { total, batch_size })
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of bulk requests the run will make.
    pub fn batch_count(&self) -> u64 {
        self.total.div_ceil(self.batch_size as u64)
    }

    /// Size of each batch, in submission order.
    pub fn batch_sizes(&self) -> impl Iterator<Item = usize> {
        let batch_size = self.batch_size as u64;
        let total = self.total;
        (0..self.batch_count()).map(move |i| (total - i * batch_size).min(batch_size) as usize)
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    /// Documents indexed.
    pub documents: u64,
    /// Bulk requests made.
    pub batches: u64,
    pub elapsed: Duration,
}

/// Generates entities and loads them into the index batch by batch.
pub struct BulkLoader {
    client: Arc<SearchIndexClient>,
    config: LoaderConfig,
}

impl BulkLoader {
    /// Create a new loader with default configuration.
    pub fn new(client: Arc<SearchIndexClient>) -> Self {
        Self {
            client,
            config: LoaderConfig::default(),
        }
    }

    /// Create a new loader with custom configuration.
    pub fn with_config(client: Arc<SearchIndexClient>, config: LoaderConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Execute `plan`.
    ///
    /// Entities are generated on the blocking pool. Stops before the next batch, abandoning any request in flight, when
    /// `shutdown` fires or the configured timeout elapses. A batch the engine
    /// rejects ends the run with [`IngestError::BatchFailed`].
    #[instrument(skip(self, plan, shutdown), fields(total = plan.total(), batch_size = plan.batch_size()))]
    pub async fn run(
        &self,
        plan: GenerationPlan,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> Result<LoadReport, IngestError> {
        let started = Instant::now();
        let deadline = self
            .config
            .timeout
            .map(|timeout| tokio::time::Instant::now() + timeout);
        let batch_count = plan.batch_count();
        let mut committed: u64 = 0;

        info!(batches = batch_count, "Starting bulk generation");

        for (index, size) in plan.batch_sizes().enumerate() {
            let batch = index + 1;

            if shutdown_requested(shutdown) {
                warn!(batch, committed, "Generation cancelled by shutdown");
                return Err(IngestError::Cancelled { committed });
            }
            if deadline.is_some_and(|deadline| tokio::time::Instant::now() >= deadline) {
                warn!(batch, committed, "Generation deadline reached");
                return Err(IngestError::TimedOut { committed });
            }

            let entities = tokio::task::spawn_blocking(move || generate_batch(size)).await?;

            tokio::select! {
                biased;

                Ok(()) = shutdown.recv() => {
                    warn!(batch, committed, "Generation cancelled by shutdown");
                    return Err(IngestError::Cancelled { committed });
                }
                _ = wait_until(deadline) => {
                    warn!(batch, committed, "Generation deadline reached");
                    return Err(IngestError::TimedOut { committed });
                }
                result = self.client.batch_create(&entities) => {
                    if let Err(source) = result {
                        return Err(IngestError::BatchFailed { batch, committed, source });
                    }
                }
            }

            committed += size as u64;
            debug!(batch, of = batch_count, committed, "Batch indexed");
        }

        let report = LoadReport {
            documents: committed,
            batches: batch_count,
            elapsed: started.elapsed(),
        };

        match self.client.count().await {
            Ok(count) => info!(
                documents = report.documents,
                index_count = count,
                elapsed_ms = report.elapsed.as_millis() as u64,
                "Bulk generation finished"
            ),
            Err(e) => warn!(
                documents = report.documents,
                error = %e,
                "Bulk generation finished but the index count is unavailable"
            ),
        }

        Ok(report)
    }
}

/// Whether a shutdown signal is already waiting on `shutdown`.
fn shutdown_requested(shutdown: &mut broadcast::Receiver<()>) -> bool {
    matches!(
        shutdown.try_recv(),
        Ok(()) | Err(broadcast::error::TryRecvError::Lagged(_))
    )
}

/// Sleep until `deadline`, or forever when there is none.
async fn wait_until(deadline: Option<tokio::time::Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
