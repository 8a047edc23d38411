use axum::{extract::State, Json};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{RecommendationRequest, RecommendationResponse},
    routes::AppState,
    services::recommendations,
};

/// Handler for recommendations endpoint
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    request_id: RequestId,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    tracing::info!(
        request_id = %request_id,
        user_id = request.user_id,
        num_recommendations = ?request.num_recommendations,
        "Processing recommendation request"
    );

    let catalog = state.catalog().await;
    let response =
        recommendations::get_recommendations(&state.recommender, &catalog, request, state.limits)?;

    tracing::info!(
        request_id = %request_id,
        returned = response.recommended_items.len(),
        "Recommendations served"
    );

    Ok(Json(response))
}
