//! In-memory search index provider.
//!
//! Mimics the engine behaviour the service depends on (not-found and
//! already-exists replies, partial merges, size-limited term search) so the
//! client, loader and HTTP layers can be exercised without a cluster.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::types::{BatchOperationResult, BatchOperationSummary};
use entity_search_shared::Entity;

#[derive(Debug, Default)]
struct State {
    index_exists: bool,
    /// Documents in insertion order.
    documents: Vec<(String, Value)>,
    /// Size of every bulk request received, including failed ones.
    bulk_batches: Vec<usize>,
}

/// Provider that keeps documents in process memory. Clones share state.
#[derive(Debug, Clone)]
pub struct InMemoryProvider {
    index_name: String,
    state: Arc<Mutex<State>>,
    /// Number of bulk requests that succeed before every further one fails.
    fail_bulk_after: Option<usize>,
    /// Time each bulk request takes before it is applied.
    bulk_delay: Option<Duration>,
    /// Searches return every match and ignore the requested `size`.
    ignore_size: bool,
    healthy: bool,
}

impl InMemoryProvider {
    /// Create a provider for `index_name` with no index created yet.
    pub fn new(index_name: impl Into<String>) -> Self {
        Self {
            index_name: index_name.into(),
            state: Arc::new(Mutex::new(State::default())),
            fail_bulk_after: None,
            bulk_delay: None,
            ignore_size: false,
            healthy: true,
        }
    }

    /// Fail every bulk request after the first `successes`.
    pub fn with_bulk_failure_after(mut self, successes: usize) -> Self {
        self.fail_bulk_after = Some(successes);
        self
    }

    /// Make every bulk request take `delay` before it is recorded and applied.
    pub fn with_bulk_delay(mut self, delay: Duration) -> Self {
        self.bulk_delay = Some(delay);
        self
    }

    /// Return every matching document regardless of the requested `size`.
    pub fn ignoring_size(mut self) -> Self {
        self.ignore_size = true;
        self
    }

    /// Report the cluster as unhealthy.
    pub fn unhealthy(mut self) -> Self {
        self.healthy = false;
        self
    }

    /// Sizes of the bulk requests received so far.
    pub async fn bulk_batch_sizes(&self) -> Vec<usize> {
        self.state.lock().await.bulk_batches.clone()
    }

    /// Number of stored documents.
    pub async fn document_count(&self) -> usize {
        self.state.lock().await.documents.len()
    }

    /// Stored `_source` of a document.
    pub async fn source(&self, document_id: &str) -> Option<Value> {
        let state = self.state.lock().await;
        state
            .documents
            .iter()
            .find(|(id, _)| id == document_id)
            .map(|(_, doc)| doc.clone())
    }

    fn upsert(state: &mut State, document_id: String, source: Value) -> &'static str {
        state.index_exists = true;
        match state.documents.iter_mut().find(|(id, _)| *id == document_id) {
            Some((_, existing)) => {
                *existing = source;
                "updated"
            }
            None => {
                state.documents.push((document_id, source));
                "created"
            }
        }
    }

    fn require_index(&self, state: &State) -> Result<(), SearchIndexError> {
        if state.index_exists {
            Ok(())
        } else {
            Err(SearchIndexError::index_not_found(&self.index_name))
        }
    }
}

/// Lowercased alphanumeric tokens of every string inside `value`.
fn tokens(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.extend(
            s.split(|c: char| !c.is_alphanumeric())
                .filter(|t| !t.is_empty())
                .map(str::to_lowercase),
        ),
        Value::Array(items) => items.iter().for_each(|item| tokens(item, out)),
        Value::Object(fields) => fields.values().for_each(|field| tokens(field, out)),
        _ => {}
    }
}

fn matches_query(source: &Value, query_text: &str) -> bool {
    let mut doc_tokens = Vec::new();
    tokens(source, &mut doc_tokens);

    let mut query_tokens = Vec::new();
    tokens(&Value::String(query_text.to_string()), &mut query_tokens);

    query_tokens.iter().any(|t| doc_tokens.contains(t))
}

#[async_trait]
impl SearchIndexProvider for InMemoryProvider {
    fn index_name(&self) -> &str {
        &self.index_name
    }

    async fn create_index(&self, _settings: &Value) -> Result<Value, SearchIndexError> {
        let mut state = self.state.lock().await;
        if state.index_exists {
            return Err(SearchIndexError::IndexAlreadyExists {
                index: self.index_name.clone(),
                body: json!({
                    "error": {
                        "type": "resource_already_exists_exception",
                        "reason": format!("index [{}] already exists", self.index_name)
                    },
                    "status": 400
                }),
            });
        }
        state.index_exists = true;
        Ok(json!({
            "acknowledged": true,
            "shards_acknowledged": true,
            "index": self.index_name
        }))
    }

    async fn delete_index(&self) -> Result<Value, SearchIndexError> {
        let mut state = self.state.lock().await;
        self.require_index(&state)?;
        state.index_exists = false;
        state.documents.clear();
        Ok(json!({ "acknowledged": true }))
    }

    async fn get_document(&self, document_id: &str) -> Result<Value, SearchIndexError> {
        let state = self.state.lock().await;
        self.require_index(&state)?;
        state
            .documents
            .iter()
            .find(|(id, _)| id == document_id)
            .map(|(id, source)| {
                json!({
                    "_index": self.index_name,
                    "_id": id,
                    "found": true,
                    "_source": source
                })
            })
            .ok_or_else(|| SearchIndexError::document_not_found(document_id))
    }

    async fn index_document(&self, entity: &Entity) -> Result<Value, SearchIndexError> {
        let source = serde_json::to_value(entity)?;
        let document_id = entity.document_id();
        let mut state = self.state.lock().await;
        let result = Self::upsert(&mut state, document_id.clone(), source);
        Ok(json!({ "_index": self.index_name, "_id": document_id, "result": result }))
    }

    async fn update_document(
        &self,
        document_id: &str,
        partial: &Value,
    ) -> Result<Value, SearchIndexError> {
        let mut state = self.state.lock().await;
        self.require_index(&state)?;
        let (_, source) = state
            .documents
            .iter_mut()
            .find(|(id, _)| id == document_id)
            .ok_or_else(|| SearchIndexError::document_not_found(document_id))?;

        if let (Some(target), Some(fields)) = (source.as_object_mut(), partial.as_object()) {
            for (key, value) in fields {
                target.insert(key.clone(), value.clone());
            }
        }
        Ok(json!({ "_index": self.index_name, "_id": document_id, "result": "updated" }))
    }

    async fn delete_document(&self, document_id: &str) -> Result<Value, SearchIndexError> {
        let mut state = self.state.lock().await;
        self.require_index(&state)?;
        let position = state
            .documents
            .iter()
            .position(|(id, _)| id == document_id)
            .ok_or_else(|| SearchIndexError::document_not_found(document_id))?;
        state.documents.remove(position);
        Ok(json!({ "_index": self.index_name, "_id": document_id, "result": "deleted" }))
    }

    async fn search(&self, body: &Value) -> Result<Vec<Value>, SearchIndexError> {
        let state = self.state.lock().await;
        self.require_index(&state)?;

        let size = body.get("size").and_then(Value::as_u64).unwrap_or(10) as usize;
        let query_text = body
            .pointer("/query/bool/should/0/multi_match/query")
            .and_then(Value::as_str);

        let hits = state
            .documents
            .iter()
            .map(|(_, source)| source)
            .filter(|source| query_text.map_or(true, |text| matches_query(source, text)))
            .cloned();

        Ok(if self.ignore_size {
            hits.collect()
        } else {
            hits.take(size).collect()
        })
    }

    async fn bulk_index_documents(
        &self,
        entities: &[Entity],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        if let Some(delay) = self.bulk_delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock().await;
        let completed = state.bulk_batches.len();
        state.bulk_batches.push(entities.len());

        if self.fail_bulk_after.is_some_and(|limit| completed >= limit) {
            return Err(SearchIndexError::bulk_operation("simulated bulk failure"));
        }

        let mut results = Vec::with_capacity(entities.len());
        for entity in entities {
            let document_id = entity.document_id();
            Self::upsert(&mut state, document_id.clone(), serde_json::to_value(entity)?);
            results.push(BatchOperationResult {
                document_id,
                success: true,
                error: None,
            });
        }
        Ok(BatchOperationSummary::from_results(results))
    }

    async fn count(&self) -> Result<u64, SearchIndexError> {
        let state = self.state.lock().await;
        self.require_index(&state)?;
        Ok(state.documents.len() as u64)
    }

    async fn health_check(&self) -> Result<bool, SearchIndexError> {
        Ok(self.healthy)
    }
}
