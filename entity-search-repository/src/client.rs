//! Search index client implementation.
//!
//! This module provides the main client for interacting with the search index.
//! Application code uses this to manage the index and to query, create, update,
//! and delete entity documents.

use serde_json::Value;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::config::SearchIndexConfig;
use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::opensearch::index_config::get_index_settings;
use crate::opensearch::queries::{build_list_query, build_search_query, LIST_LIMIT};
use crate::types::{BatchOperationSummary, CreateEntityRequest, UpdateEntityRequest};
use entity_search_shared::{Entity, SearchQuery, MAX_SEARCH_RESULTS};

/// The main client for interacting with the search index.
///
/// Validates requests, builds engine bodies, and delegates to a
/// `SearchIndexProvider`.
pub struct SearchIndexClient {
    provider: Box<dyn SearchIndexProvider>,
    config: SearchIndexConfig,
}

impl SearchIndexClient {
    /// Create a new SearchIndexClient with default configuration.
    pub fn new(provider: Box<dyn SearchIndexProvider>) -> Self {
        Self {
            provider,
            config: SearchIndexConfig::default(),
        }
    }

    /// Create a new SearchIndexClient with custom configuration.
    pub fn with_config(provider: Box<dyn SearchIndexProvider>, config: SearchIndexConfig) -> Self {
        Self { provider, config }
    }

    /// Name of the index every operation targets.
    pub fn index_name(&self) -> &str {
        self.provider.index_name()
    }

    /// Check if batch size exceeds the configured limit.
    pub fn validate_batch_size(&self, size: usize) -> Result<(), SearchIndexError> {
        if let Some(max) = self.config.max_batch_size {
            if size > max {
                return Err(SearchIndexError::batch_size_exceeded(size, max));
            }
        }
        Ok(())
    }

    /// Create the index with the entity mapping.
    ///
    /// An index that already exists is not an error: the engine's reply is
    /// returned as if the creation had succeeded.
    #[instrument(skip(self), fields(index = %self.index_name()))]
    pub async fn create_index(&self) -> Result<Value, SearchIndexError> {
        match self.provider.create_index(&get_index_settings()).await {
            Ok(body) => Ok(body),
            Err(SearchIndexError::IndexAlreadyExists { body, .. }) => {
                info!("Index already exists");
                Ok(body)
            }
            Err(e) => Err(e),
        }
    }

    /// Drop the index and every document in it.
    pub async fn delete_index(&self) -> Result<Value, SearchIndexError> {
        self.provider.delete_index().await
    }

    /// Fetch one document by entity id. Returns the engine's reply.
    pub async fn get(&self, entity_id: &Uuid) -> Result<Value, SearchIndexError> {
        self.provider.get_document(&entity_id.to_string()).await
    }

    /// List up to ten documents in engine order.
    pub async fn list(&self) -> Result<Vec<Value>, SearchIndexError> {
        let mut documents = self.provider.search(&build_list_query(LIST_LIMIT)).await?;
        documents.truncate(LIST_LIMIT);
        Ok(documents)
    }

    /// Index a caller-supplied entity.
    /// Input: CreateEntityRequest (name required; all else optional)
    /// Output: Result<Value, SearchIndexError> (engine reply)
    #[instrument(skip(self, request))]
    pub async fn create(&self, request: CreateEntityRequest) -> Result<Value, SearchIndexError> {
        request.validate()?;

        let entity: Entity = request.into();
        debug!(entity_id = %entity.entity_id, "Creating entity");

        self.provider.index_document(&entity).await
    }

    /// Merge the fields set in `request` into an existing document.
    pub async fn update(
        &self,
        entity_id: &Uuid,
        request: UpdateEntityRequest,
    ) -> Result<Value, SearchIndexError> {
        request.validate()?;

        let partial = request.into_partial_document(*entity_id)?;
        self.provider
            .update_document(&entity_id.to_string(), &partial)
            .await
    }

    /// Delete one document by entity id.
    pub async fn delete(&self, entity_id: &Uuid) -> Result<Value, SearchIndexError> {
        self.provider.delete_document(&entity_id.to_string()).await
    }

    /// Query the search index.
    /// Input: SearchQuery (non-blank text, limit of at most 1000)
    /// Output: Result<Vec<Value>, SearchIndexError> (whole entities, ordered by relevance)
    #[instrument(skip(self), fields(q = %query.query))]
    pub async fn query(&self, query: &SearchQuery) -> Result<Vec<Value>, SearchIndexError> {
        if query.is_blank() {
            return Err(SearchIndexError::validation("query must not be empty"));
        }

        let limit = query.limit.min(MAX_SEARCH_RESULTS);
        let mut hits = self.provider.search(&build_search_query(query)).await?;
        hits.truncate(limit);

        debug!(hits = hits.len(), "Search finished");
        Ok(hits)
    }

    /// Index a batch of entities with one bulk request.
    /// Input: &[Entity] (at most max_batch_size)
    /// Output: Result<BatchOperationSummary, SearchIndexError>
    ///
    /// Any item the engine rejects fails the whole call. Items that were
    /// accepted stay indexed.
    pub async fn batch_create(
        &self,
        entities: &[Entity],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        if entities.is_empty() {
            return Ok(BatchOperationSummary::empty());
        }

        self.validate_batch_size(entities.len())?;

        let summary = self.provider.bulk_index_documents(entities).await?;
        if let Some(failure) = summary.first_failure() {
            return Err(SearchIndexError::bulk_operation(format!(
                "{} of {} documents failed, first {}: {}",
                summary.failed,
                summary.total,
                failure.document_id,
                failure.error.as_deref().unwrap_or("unknown error")
            )));
        }

        Ok(summary)
    }

    /// Number of documents in the index.
    pub async fn count(&self) -> Result<u64, SearchIndexError> {
        self.provider.count().await
    }

    /// Whether the engine reports itself usable.
    pub async fn health_check(&self) -> Result<bool, SearchIndexError> {
        self.provider.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryProvider;
    use crate::types::BatchOperationResult;
    use async_trait::async_trait;
    use chrono::Utc;
    use entity_search_shared::{Event, JobPost};
    use serde_json::json;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    /// Provider whose bulk replies report the configured item failures.
    struct PartialFailureProvider {
        rejected: Vec<String>,
        bulk_calls: Arc<Mutex<usize>>,
    }

    #[async_trait]
    impl SearchIndexProvider for PartialFailureProvider {
        fn index_name(&self) -> &str {
            "entity"
        }

        async fn create_index(&self, _settings: &Value) -> Result<Value, SearchIndexError> {
            Err(SearchIndexError::engine(500, "unexpected"))
        }

        async fn delete_index(&self) -> Result<Value, SearchIndexError> {
            unimplemented!()
        }

        async fn get_document(&self, _document_id: &str) -> Result<Value, SearchIndexError> {
            unimplemented!()
        }

        async fn index_document(&self, _entity: &Entity) -> Result<Value, SearchIndexError> {
            unimplemented!()
        }

        async fn update_document(
            &self,
            _document_id: &str,
            _partial: &Value,
        ) -> Result<Value, SearchIndexError> {
            unimplemented!()
        }

        async fn delete_document(&self, _document_id: &str) -> Result<Value, SearchIndexError> {
            unimplemented!()
        }

        async fn search(&self, _body: &Value) -> Result<Vec<Value>, SearchIndexError> {
            unimplemented!()
        }

        async fn bulk_index_documents(
            &self,
            entities: &[Entity],
        ) -> Result<BatchOperationSummary, SearchIndexError> {
            *self.bulk_calls.lock().await += 1;
            let results = entities
                .iter()
                .map(|entity| {
                    let document_id = entity.document_id();
                    let rejected = self.rejected.contains(&document_id);
                    BatchOperationResult {
                        document_id,
                        success: !rejected,
                        error: rejected.then(|| "mapper_parsing_exception".to_string()),
                    }
                })
                .collect();
            Ok(BatchOperationSummary::from_results(results))
        }

        async fn count(&self) -> Result<u64, SearchIndexError> {
            Ok(0)
        }

        async fn health_check(&self) -> Result<bool, SearchIndexError> {
            Ok(true)
        }
    }

    fn create_test_entity(name: &str) -> Entity {
        let entity_id = Uuid::new_v4();
        Entity {
            entity_id,
            name: name.to_string(),
            description: "Makes widgets".to_string(),
            tags: vec!["manufacturing".to_string()],
            events: vec![Event {
                event_id: Uuid::new_v4(),
                name: "Quarterly review".to_string(),
                description: "Numbers went up".to_string(),
                timestamp: Utc::now(),
            }],
            job_posts: vec![JobPost {
                id: Uuid::new_v4(),
                entity_id,
                title: "Welder".to_string(),
                description: "Joins metal".to_string(),
                salary: 52000,
                tags: vec!["trade".to_string()],
            }],
        }
    }

    fn create_client() -> (SearchIndexClient, InMemoryProvider) {
        let provider = InMemoryProvider::new("entity");
        let client = SearchIndexClient::new(Box::new(provider.clone()));
        (client, provider)
    }

    #[tokio::test]
    async fn test_create_index_twice_succeeds() {
        let (client, _) = create_client();

        let first = client.create_index().await.unwrap();
        assert_eq!(first["acknowledged"], true);

        let second = client.create_index().await.unwrap();
        assert_eq!(second["error"]["type"], "resource_already_exists_exception");
    }

    #[tokio::test]
    async fn test_create_index_propagates_other_errors() {
        let client = SearchIndexClient::new(Box::new(PartialFailureProvider {
            rejected: vec![],
            bulk_calls: Arc::new(Mutex::new(0)),
        }));

        let result = client.create_index().await;
        assert!(matches!(
            result,
            Err(SearchIndexError::EngineError { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_missing_index_is_not_found() {
        let (client, _) = create_client();

        let result = client.delete_index().await;
        assert!(matches!(result, Err(SearchIndexError::IndexNotFound(_))));
    }

    #[tokio::test]
    async fn test_indexed_entity_round_trips() {
        let (client, _) = create_client();
        client.create_index().await.unwrap();

        let entity = create_test_entity("Acme");
        client.batch_create(&[entity.clone()]).await.unwrap();

        let fetched = client.get(&entity.entity_id).await.unwrap();
        let source: Entity = serde_json::from_value(fetched["_source"].clone()).unwrap();
        assert_eq!(source, entity);
    }

    #[tokio::test]
    async fn test_missing_document_operations_are_not_found() {
        let (client, _) = create_client();
        client.create_index().await.unwrap();
        let missing = Uuid::new_v4();

        assert!(client.get(&missing).await.unwrap_err().is_not_found());
        assert!(client.delete(&missing).await.unwrap_err().is_not_found());

        let update = UpdateEntityRequest::default().with_name("Nobody");
        assert!(client.update(&missing, update).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_create_then_update_merges_fields() {
        let (client, provider) = create_client();
        client.create_index().await.unwrap();

        let request: CreateEntityRequest = serde_json::from_value(json!({
            "name": "Initech",
            "description": "Software",
            "tags": ["tps"]
        }))
        .unwrap();
        let created = client.create(request).await.unwrap();
        let entity_id: Uuid = created["_id"].as_str().unwrap().parse().unwrap();

        let update = UpdateEntityRequest::default().with_description("Reports");
        client.update(&entity_id, update).await.unwrap();

        let source = provider.source(&entity_id.to_string()).await.unwrap();
        assert_eq!(source["name"], "Initech");
        assert_eq!(source["description"], "Reports");
        assert_eq!(source["tags"], json!(["tps"]));
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let (client, provider) = create_client();

        let request: CreateEntityRequest =
            serde_json::from_value(json!({ "name": "" })).unwrap();
        let result = client.create(request).await;

        assert!(matches!(result, Err(SearchIndexError::ValidationError(_))));
        assert_eq!(provider.document_count().await, 0);
    }

    #[tokio::test]
    async fn test_update_without_fields_is_rejected() {
        let (client, _) = create_client();

        let result = client
            .update(&Uuid::new_v4(), UpdateEntityRequest::default())
            .await;
        assert!(matches!(result, Err(SearchIndexError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_search_by_nested_job_title_returns_whole_entity() {
        let (client, _) = create_client();
        client.create_index().await.unwrap();

        let mut target = create_test_entity("Vandelay Industries");
        target.job_posts[0].title = "Latex Salesman".to_string();
        let others = vec![create_test_entity("Kramerica"), create_test_entity("Pendant")];
        client.batch_create(&others).await.unwrap();
        client.batch_create(&[target.clone()]).await.unwrap();

        let hits = client.query(&SearchQuery::new("salesman")).await.unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["entity_id"], json!(target.entity_id));
        assert_eq!(hits[0]["name"], "Vandelay Industries");
        assert!(hits[0]["events"].is_array());
    }

    #[tokio::test]
    async fn test_search_rejects_blank_query() {
        let (client, _) = create_client();

        let result = client.query(&SearchQuery::new("   ")).await;
        assert!(matches!(result, Err(SearchIndexError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_search_results_are_capped() {
        let provider = InMemoryProvider::new("entity").ignoring_size();
        let client = SearchIndexClient::with_config(
            Box::new(provider.clone()),
            SearchIndexConfig::unlimited(),
        );
        client.create_index().await.unwrap();

        let entities: Vec<Entity> = (0..MAX_SEARCH_RESULTS + 5)
            .map(|i| create_test_entity(&format!("Widget {i}")))
            .collect();
        client.batch_create(&entities).await.unwrap();

        let hits = client.query(&SearchQuery::new("widget")).await.unwrap();
        assert_eq!(hits.len(), MAX_SEARCH_RESULTS);

        let hits = client
            .query(&SearchQuery {
                limit: 3,
                ..SearchQuery::new("widget")
            })
            .await
            .unwrap();
        assert_eq!(hits.len(), 3);
    }

    #[tokio::test]
    async fn test_list_returns_at_most_ten() {
        let provider = InMemoryProvider::new("entity").ignoring_size();
        let client = SearchIndexClient::new(Box::new(provider));
        client.create_index().await.unwrap();

        let entities: Vec<Entity> = (0..25)
            .map(|i| create_test_entity(&format!("Company {i}")))
            .collect();
        client.batch_create(&entities).await.unwrap();

        let listed = client.list().await.unwrap();
        assert_eq!(listed.len(), LIST_LIMIT);
        assert_eq!(listed[0]["name"], "Company 0");
    }

    #[tokio::test]
    async fn test_batch_create_empty() {
        let (client, provider) = create_client();

        let summary = client.batch_create(&[]).await.unwrap();

        assert_eq!(summary.total, 0);
        assert!(provider.bulk_batch_sizes().await.is_empty());
    }

    #[tokio::test]
    async fn test_batch_create_exceeds_limit() {
        let provider = InMemoryProvider::new("entity");
        let client = SearchIndexClient::with_config(
            Box::new(provider.clone()),
            SearchIndexConfig::with_max_batch_size(2),
        );

        let entities: Vec<Entity> = (0..3).map(|_| create_test_entity("Acme")).collect();
        let result = client.batch_create(&entities).await;

        assert!(matches!(
            result,
            Err(SearchIndexError::BatchSizeExceeded {
                provided: 3,
                max: 2
            })
        ));
        assert!(provider.bulk_batch_sizes().await.is_empty());
    }

    #[tokio::test]
    async fn test_batch_create_item_failure_is_an_error() {
        let entities = vec![create_test_entity("Good"), create_test_entity("Bad")];
        let bulk_calls = Arc::new(Mutex::new(0));
        let client = SearchIndexClient::new(Box::new(PartialFailureProvider {
            rejected: vec![entities[1].document_id()],
            bulk_calls: bulk_calls.clone(),
        }));

        let err = client.batch_create(&entities).await.unwrap_err();

        assert!(matches!(err, SearchIndexError::BulkOperationError(_)));
        assert!(err.to_string().contains(&entities[1].document_id()));
        assert_eq!(*bulk_calls.lock().await, 1);
    }

    #[tokio::test]
    async fn test_count_and_health() {
        let (client, _) = create_client();
        client.create_index().await.unwrap();
        client
            .batch_create(&[create_test_entity("A"), create_test_entity("B")])
            .await
            .unwrap();

        assert_eq!(client.count().await.unwrap(), 2);
        assert!(client.health_check().await.unwrap());

        let unhealthy = SearchIndexClient::new(Box::new(InMemoryProvider::new("entity").unhealthy()));
        assert!(!unhealthy.health_check().await.unwrap());
    }
}
