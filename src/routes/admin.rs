use axum::{extract::State, Json};
use std::sync::Arc;

use crate::{
    error::AppResult, middleware::request_id::RequestId, models::EngineStatus, routes::AppState,
};

/// Handler reporting what the recommender currently serves
pub async fn status(State(state): State<Arc<AppState>>) -> Json<EngineStatus> {
    Json(state.recommender.status())
}

/// Handler rebuilding the recommender from the data source
pub async fn reload(
    State(state): State<Arc<AppState>>,
    request_id: RequestId,
) -> AppResult<Json<EngineStatus>> {
    tracing::info!(request_id = %request_id, "Reload requested");

    let status = state.reload().await?;

    Ok(Json(status))
}
