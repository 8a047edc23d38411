use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::sync::{Mutex, RwLock};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    error::AppResult,
    middleware::request_id::make_span_with_request_id,
    models::{EngineStatus, ItemCatalog},
    services::{
        self, recommendations::RecommendationLimits, recommender::RecommenderService,
        sources::OrderDataSource,
    },
};

pub mod admin;
pub mod items;
pub mod recommendations;

/// Shared application state
pub struct AppState {
    pub recommender: Arc<RecommenderService>,
    /// Item names for presentation, replaced on every reload
    pub catalog: RwLock<Arc<ItemCatalog>>,
    pub source: Arc<dyn OrderDataSource>,
    pub neighbors: usize,
    pub limits: RecommendationLimits,
    /// Serializes reloads from the first fetch through the catalog swap
    reload_lock: Mutex<()>,
}

impl AppState {
    /// Creates state with an empty recommender; call [`AppState::reload`] to train it
    pub fn new(
        source: Arc<dyn OrderDataSource>,
        neighbors: usize,
        limits: RecommendationLimits,
    ) -> Self {
        Self {
            recommender: Arc::new(RecommenderService::new()),
            catalog: RwLock::new(Arc::new(ItemCatalog::new())),
            source,
            neighbors,
            limits,
            reload_lock: Mutex::new(()),
        }
    }

    /// Rebuilds the recommender and catalog from the data source
    pub async fn reload(&self) -> AppResult<EngineStatus> {
        let _guard = self.reload_lock.lock().await;

        let (status, catalog) = services::recommendations::reload(
            Arc::clone(&self.source),
            Arc::clone(&self.recommender),
            self.neighbors,
        )
        .await?;

        *self.catalog.write().await = Arc::new(catalog);

        Ok(status)
    }

    /// The catalog currently in use
    pub async fn catalog(&self) -> Arc<ItemCatalog> {
        Arc::clone(&*self.catalog.read().await)
    }
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CorsLayer::permissive()),
        )
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/recommendations", post(recommendations::recommend))
        .route("/items", get(items::list))
        .route("/items/:item_id", get(items::get))
        .route("/status", get(admin::status))
        .route("/reload", post(admin::reload))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
