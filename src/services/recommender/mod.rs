//! User-based collaborative filtering over purchase counts.
//!
//! Orders are folded into a user x item count matrix, columns are
//! standardized, and users are compared by cosine distance between their
//! scaled rows. A user's recommendations are the items their nearest
//! neighbors bought, weighted by similarity, minus what the user already has.

pub mod aggregator;
pub mod engine;
pub mod error;
pub mod matrix;
pub mod neighbors;
pub mod scaler;

pub use aggregator::RecommendationAggregator;
pub use engine::{LoadedData, RecommenderService, Snapshot};
pub use error::{RecommenderError, RecommenderResult};
pub use matrix::{InteractionMatrix, InteractionMatrixBuilder};
pub use neighbors::{Neighbor, NeighborIndex, NeighborModel};
pub use scaler::{ColumnStats, FeatureScaler, FitStatistics, ScaledMatrix};
