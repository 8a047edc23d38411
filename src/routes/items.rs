use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{CatalogEntry, ItemId},
    routes::AppState,
};

/// Handler listing every named item
pub async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<CatalogEntry>> {
    Json(state.catalog().await.entries())
}

/// Handler for a single item
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<ItemId>,
) -> AppResult<Json<CatalogEntry>> {
    state
        .catalog()
        .await
        .entry(item_id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Item {} not in the menu", item_id)))
}
