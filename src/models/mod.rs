use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod catalog;
pub mod order;

pub use catalog::{CatalogEntry, ItemCatalog, UNKNOWN_ITEM_NAME};
pub use order::{parse_item_list, OrderRecord};

/// Identifier of a customer in the order history
pub type UserId = i64;

/// Identifier of a menu item
pub type ItemId = i64;

/// An item with its aggregated neighbor score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredItem {
    pub item_id: ItemId,
    pub score: f64,
}

// ============================================================================
// API Types
// ============================================================================

/// Request for personalized recommendations
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationRequest {
    pub user_id: UserId,
    /// Falls back to the configured default when omitted
    #[serde(default)]
    pub num_recommendations: Option<usize>,
}

/// A recommended item, named for presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedItem {
    pub item_id: ItemId,
    pub item_name: String,
    pub score: f64,
}

/// Response with items ranked from most to least recommended
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub user_id: UserId,
    pub recommended_items: Vec<RecommendedItem>,
}

/// Lifecycle stage of the recommender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    Empty,
    Loaded,
    Trained,
}

/// Summary of the currently published data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineStatus {
    pub state: EngineState,
    pub users: usize,
    pub items: usize,
    /// Items with zero variance, which do not influence similarity
    pub degenerate_items: usize,
    /// Neighbor count of the trained model
    pub neighbors: Option<usize>,
    pub loaded_at: Option<DateTime<Utc>>,
    pub trained_at: Option<DateTime<Utc>>,
}

impl EngineStatus {
    pub fn empty() -> Self {
        Self {
            state: EngineState::Empty,
            users: 0,
            items: 0,
            degenerate_items: 0,
            neighbors: None,
            loaded_at: None,
            trained_at: None,
        }
    }
}
