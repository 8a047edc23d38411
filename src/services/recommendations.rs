use std::sync::Arc;
use std::time::Instant;

use crate::{
    error::{AppError, AppResult},
    models::{
        EngineStatus, ItemCatalog, RecommendationRequest, RecommendationResponse, RecommendedItem,
    },
    services::{recommender::RecommenderService, sources::OrderDataSource},
};

/// Bounds applied to caller-supplied recommendation counts
#[derive(Debug, Clone, Copy)]
pub struct RecommendationLimits {
    pub default_count: usize,
    pub max_count: usize,
}

/// Generates personalized menu recommendations
///
/// Ranks the items the user has never ordered by how much similar customers
/// ordered them, and names each item from the catalog.
pub fn get_recommendations(
    recommender: &RecommenderService,
    catalog: &ItemCatalog,
    request: RecommendationRequest,
    limits: RecommendationLimits,
) -> AppResult<RecommendationResponse> {
    let count = request.num_recommendations.unwrap_or(limits.default_count);
    if count > limits.max_count {
        return Err(AppError::InvalidInput(format!(
            "num_recommendations must be at most {}",
            limits.max_count
        )));
    }

    let recommended_items = recommender
        .recommend(request.user_id, count)?
        .into_iter()
        .map(|scored| RecommendedItem {
            item_id: scored.item_id,
            item_name: catalog.name_of(scored.item_id).to_string(),
            score: scored.score,
        })
        .collect();

    Ok(RecommendationResponse {
        user_id: request.user_id,
        recommended_items,
    })
}

/// Re-reads orders and menu from the source and retrains the engine
///
/// The matrices and neighbor model are rebuilt on the blocking pool and
/// published in one swap; on any failure the previous snapshot stays live.
pub async fn reload(
    source: Arc<dyn OrderDataSource>,
    recommender: Arc<RecommenderService>,
    neighbors: usize,
) -> AppResult<(EngineStatus, ItemCatalog)> {
    let start = Instant::now();

    tracing::info!(source = source.name(), neighbors, "Reloading recommender");

    let orders = source.fetch_orders().await?;
    let catalog = source.fetch_catalog().await?;

    let engine = Arc::clone(&recommender);
    tokio::task::spawn_blocking(move || engine.refresh(&orders, neighbors))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let status = recommender.status();

    tracing::info!(
        users = status.users,
        items = status.items,
        named_items = catalog.len(),
        processing_time_ms = start.elapsed().as_millis(),
        "Recommender reloaded"
    );

    Ok((status, catalog))
}
