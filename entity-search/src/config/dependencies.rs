//! Dependency initialization and wiring for the entity search service.

use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Settings;
use crate::ServiceError;
use entity_search_ingest::BulkLoader;
use entity_search_repository::{OpenSearchClient, SearchIndexClient};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// Client for index and document operations.
    pub client: Arc<SearchIndexClient>,
    /// Loader used by data generation.
    pub loader: Arc<BulkLoader>,
}

impl Dependencies {
    /// Build the OpenSearch connection and everything that uses it.
    ///
    /// The cluster is probed once. An unreachable or unhealthy cluster is
    /// logged but does not stop startup, since the engine may come up later.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(ServiceError)` - If the connection cannot be configured
    pub async fn new(settings: &Settings) -> Result<Self, ServiceError> {
        info!(
            opensearch_url = %settings.opensearch.url,
            index = %settings.opensearch.index_name,
            "Initializing dependencies"
        );

        let provider = OpenSearchClient::new(settings.opensearch.clone()).map_err(|e| {
            ServiceError::config(format!("Failed to create OpenSearch client: {}", e))
        })?;

        let client = Arc::new(SearchIndexClient::with_config(
            Box::new(provider),
            settings.search_index_config(),
        ));

        match client.health_check().await {
            Ok(true) => info!("OpenSearch connection verified"),
            Ok(false) => warn!("OpenSearch cluster is unhealthy"),
            Err(e) => warn!(error = %e, "OpenSearch health check failed"),
        }

        let loader = Arc::new(BulkLoader::with_config(
            client.clone(),
            settings.loader.clone(),
        ));

        Ok(Self { client, loader })
    }
}
