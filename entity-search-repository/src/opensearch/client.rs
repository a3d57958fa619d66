//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `SearchIndexProvider`
//! using the OpenSearch Rust client.

use async_trait::async_trait;
use opensearch::{
    auth::Credentials,
    cert::CertificateValidation,
    cluster::ClusterHealthParts,
    http::request::JsonBody,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesDeleteParts},
    params::Refresh,
    BulkParts, CountParts, DeleteParts, GetParts, IndexParts, OpenSearch, SearchParts,
    UpdateParts,
};
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::config::OpenSearchConfig;
use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::opensearch::bulk::{build_bulk_body, parse_bulk_response};
use crate::opensearch::response::read_json;
use crate::types::BatchOperationSummary;
use entity_search_shared::Entity;

/// OpenSearch client implementation.
///
/// Wraps one connection pool to a single node and operates on one index.
/// The underlying client is safe to share between concurrent requests.
///
/// # Example
///
/// ```ignore
/// use entity_search_repository::{OpenSearchClient, OpenSearchConfig};
///
/// let config = OpenSearchConfig::new("https://localhost:9200").with_index_name("entity");
/// let client = OpenSearchClient::new(config)?;
/// let healthy = client.health_check().await?;
/// ```
pub struct OpenSearchClient {
    client: OpenSearch,
    index_name: String,
}

impl OpenSearchClient {
    /// Create a new OpenSearch client from the given connection settings.
    ///
    /// No request is sent; use `health_check` to verify the node is reachable.
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchClient)` - A new client instance
    /// * `Err(SearchIndexError)` - If the URL is invalid or the transport cannot be built
    pub fn new(config: OpenSearchConfig) -> Result<Self, SearchIndexError> {
        let parsed_url =
            Url::parse(&config.url).map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let mut builder = TransportBuilder::new(conn_pool)
            .timeout(config.request_timeout)
            .disable_proxy();

        if config.accept_invalid_certs {
            warn!("TLS certificate validation is disabled for the search engine connection");
            builder = builder.cert_validation(CertificateValidation::None);
        }

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.auth(Credentials::Basic(username.clone(), password.clone()));
        }

        let transport = builder
            .build()
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %config.url,
            index = %config.index_name,
            "Created OpenSearch client"
        );

        Ok(Self {
            client,
            index_name: config.index_name,
        })
    }

    /// Extract the `_source` of every hit from a search response.
    fn extract_sources(body: &Value) -> Vec<Value> {
        body.pointer("/hits/hits")
            .and_then(Value::as_array)
            .map(|hits| {
                hits.iter()
                    .filter_map(|hit| hit.get("_source").cloned())
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn transport_error(err: opensearch::Error) -> SearchIndexError {
    SearchIndexError::connection(err.to_string())
}

#[async_trait]
impl SearchIndexProvider for OpenSearchClient {
    fn index_name(&self) -> &str {
        &self.index_name
    }

    #[instrument(skip(self, settings), fields(index = %self.index_name))]
    async fn create_index(&self, settings: &Value) -> Result<Value, SearchIndexError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(&self.index_name))
            .body(settings)
            .send()
            .await
            .map_err(transport_error)?;

        let body = read_json(response, &self.index_name, None).await?;
        info!("Index created");
        Ok(body)
    }

    #[instrument(skip(self), fields(index = %self.index_name))]
    async fn delete_index(&self) -> Result<Value, SearchIndexError> {
        let response = self
            .client
            .indices()
            .delete(IndicesDeleteParts::Index(&[self.index_name.as_str()]))
            .send()
            .await
            .map_err(transport_error)?;

        let body = read_json(response, &self.index_name, None).await?;
        info!("Index deleted");
        Ok(body)
    }

    #[instrument(skip(self), fields(index = %self.index_name))]
    async fn get_document(&self, document_id: &str) -> Result<Value, SearchIndexError> {
        let response = self
            .client
            .get(GetParts::IndexId(&self.index_name, document_id))
            .send()
            .await
            .map_err(transport_error)?;

        read_json(response, &self.index_name, Some(document_id)).await
    }

    #[instrument(skip(self, entity), fields(index = %self.index_name, entity_id = %entity.entity_id))]
    async fn index_document(&self, entity: &Entity) -> Result<Value, SearchIndexError> {
        let doc_id = entity.document_id();
        let response = self
            .client
            .index(IndexParts::IndexId(&self.index_name, &doc_id))
            .body(entity)
            .refresh(Refresh::WaitFor)
            .send()
            .await
            .map_err(transport_error)?;

        let body = read_json(response, &self.index_name, Some(&doc_id)).await?;
        debug!(doc_id = %doc_id, "Document indexed");
        Ok(body)
    }

    #[instrument(skip(self, partial), fields(index = %self.index_name))]
    async fn update_document(
        &self,
        document_id: &str,
        partial: &Value,
    ) -> Result<Value, SearchIndexError> {
        let response = self
            .client
            .update(UpdateParts::IndexId(&self.index_name, document_id))
            .body(json!({ "doc": partial }))
            .send()
            .await
            .map_err(transport_error)?;

        let body = read_json(response, &self.index_name, Some(document_id)).await?;
        debug!(doc_id = %document_id, "Document updated");
        Ok(body)
    }

    #[instrument(skip(self), fields(index = %self.index_name))]
    async fn delete_document(&self, document_id: &str) -> Result<Value, SearchIndexError> {
        let response = self
            .client
            .delete(DeleteParts::IndexId(&self.index_name, document_id))
            .send()
            .await
            .map_err(transport_error)?;

        let body = read_json(response, &self.index_name, Some(document_id)).await?;
        debug!(doc_id = %document_id, "Document deleted");
        Ok(body)
    }

    #[instrument(skip(self, body), fields(index = %self.index_name))]
    async fn search(&self, body: &Value) -> Result<Vec<Value>, SearchIndexError> {
        let response = self
            .client
            .search(SearchParts::Index(&[self.index_name.as_str()]))
            .body(body)
            .send()
            .await
            .map_err(transport_error)?;

        let response_body = read_json(response, &self.index_name, None).await?;
        let sources = Self::extract_sources(&response_body);
        debug!(hits = sources.len(), "Search completed");
        Ok(sources)
    }

    /// Index entities with a single bulk request and `refresh=true`.
    ///
    /// Each entity is written under its `entity_id`. Item-level failures are
    /// reported in the summary rather than as an error.
    #[instrument(skip(self, entities), fields(index = %self.index_name, count = entities.len()))]
    async fn bulk_index_documents(
        &self,
        entities: &[Entity],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        let body: Vec<JsonBody<Value>> = build_bulk_body(&self.index_name, entities)?
            .into_iter()
            .map(Into::into)
            .collect();

        let response = self
            .client
            .bulk(BulkParts::Index(&self.index_name))
            .body(body)
            .refresh(Refresh::True)
            .send()
            .await
            .map_err(transport_error)?;

        let response_body = read_json(response, &self.index_name, None).await?;
        let summary = parse_bulk_response(&response_body)?;

        if summary.failed > 0 {
            error!(
                failed = summary.failed,
                total = summary.total,
                "Bulk request reported item failures"
            );
        } else {
            debug!(total = summary.total, "Bulk request completed");
        }

        Ok(summary)
    }

    async fn count(&self) -> Result<u64, SearchIndexError> {
        let response = self
            .client
            .count(CountParts::Index(&[self.index_name.as_str()]))
            .send()
            .await
            .map_err(transport_error)?;

        let body = read_json(response, &self.index_name, None).await?;
        body.get("count")
            .and_then(Value::as_u64)
            .ok_or_else(|| SearchIndexError::serialization("Count response has no count field"))
    }

    async fn health_check(&self) -> Result<bool, SearchIndexError> {
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await
            .map_err(transport_error)?;

        let body = read_json(response, "_cluster/health", None).await?;
        let status = body
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("unknown");

        debug!(status = %status, "Cluster health");
        Ok(status == "green" || status == "yellow")
    }
}
