//! Route handlers.
//!
//! Each handler extracts its inputs, delegates to the search client or the
//! bulk loader, and returns the engine's JSON or an [`ApiError`].

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, instrument, warn, Instrument};
use uuid::Uuid;

use super::error::ApiError;
use super::AppState;
use entity_search_ingest::{GenerationPlan, IngestError};
use entity_search_repository::{CreateEntityRequest, UpdateEntityRequest};
use entity_search_shared::SearchQuery;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateParams {
    pub total: Option<u64>,
    pub batch_size: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub message: String,
}

/// `POST /index`
pub async fn create_index(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.client.create_index().await?))
}

/// `DELETE /index`
pub async fn delete_index(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.client.delete_index().await?))
}

/// `GET /entities`
pub async fn list_entities(State(state): State<AppState>) -> Result<Json<Vec<Value>>, ApiError> {
    Ok(Json(state.client.list().await?))
}

/// `POST /entities`
pub async fn create_entity(
    State(state): State<AppState>,
    payload: Result<Json<CreateEntityRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload?;
    Ok(Json(state.client.create(request).await?))
}

/// `GET /entities/:id`
pub async fn get_entity(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id?;
    Ok(Json(state.client.get(&id).await?))
}

/// `PUT /entities/:id`
pub async fn update_entity(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateEntityRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id?;
    let Json(request) = payload?;
    Ok(Json(state.client.update(&id, request).await?))
}

/// `DELETE /entities/:id`
pub async fn delete_entity(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id?;
    Ok(Json(state.client.delete(&id).await?))
}

/// `GET /search?q=...`
pub async fn search(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let Query(params) = params?;
    let q = params
        .q
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("query parameter q is required"))?;

    Ok(Json(state.client.query(&SearchQuery::new(q)).await?))
}

/// `POST /generate-fake-data`
///
/// Responds once the run ends. `total` and `batch_size` override the
/// configured run for this request only. The run is a detached task: a client
/// disconnect does not stop it, only shutdown or the deadline do.
#[instrument(skip(state, params))]
pub async fn generate_fake_data(
    State(state): State<AppState>,
    params: Result<Query<GenerateParams>, QueryRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Query(params) = params?;
    let config = state.loader.config();

    let batch_size = params.batch_size.unwrap_or(config.batch_size);
    state.client.validate_batch_size(batch_size)?;
    let plan = GenerationPlan::new(params.total.unwrap_or(config.total_documents), batch_size)?;

    let loader = state.loader.clone();
    let mut shutdown = state.shutdown.subscribe();
    let job = tokio::spawn(
        async move { loader.run(plan, &mut shutdown).await }.in_current_span(),
    );
    let report = job.await.map_err(IngestError::from)??;

    info!(documents = report.documents, "Fake data generation complete");
    Ok(Json(GenerateResponse {
        message: format!("Successfully inserted {} documents", report.documents),
    }))
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.client.health_check().await {
        Ok(true) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Ok(false) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unhealthy" })),
        ),
        Err(e) => {
            warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
        }
    }
}
