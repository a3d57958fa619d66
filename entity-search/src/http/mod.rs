//! HTTP surface: shared state, routes, and error mapping.

mod error;
mod handlers;

pub use error::ApiError;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::sync::broadcast;

use entity_search_ingest::BulkLoader;
use entity_search_repository::SearchIndexClient;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<SearchIndexClient>,
    pub loader: Arc<BulkLoader>,
    /// Fires once when the process begins shutting down.
    pub shutdown: broadcast::Sender<()>,
}

impl AppState {
    pub fn new(
        client: Arc<SearchIndexClient>,
        loader: Arc<BulkLoader>,
        shutdown: broadcast::Sender<()>,
    ) -> Self {
        Self {
            client,
            loader,
            shutdown,
        }
    }
}

/// Build the service router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/index",
            post(handlers::create_index).delete(handlers::delete_index),
        )
        .route(
            "/entities",
            get(handlers::list_entities).post(handlers::create_entity),
        )
        .route(
            "/entities/:id",
            get(handlers::get_entity)
                .put(handlers::update_entity)
                .delete(handlers::delete_entity),
        )
        .route("/search", get(handlers::search))
        .route("/generate-fake-data", post(handlers::generate_fake_data))
        .route("/health", get(handlers::health))
        .with_state(state)
}
