use thiserror::Error;

use crate::models::UserId;

/// Error types for the recommendation engine
///
/// None of these are retried: they describe data or call-order preconditions
/// and are surfaced to the caller as-is.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RecommenderError {
    #[error("Failed to load order data: {0}")]
    DataLoad(String),

    #[error("No interaction data loaded; call load before train")]
    NotLoaded,

    #[error("Neighbor model not trained since the last load")]
    NotTrained,

    #[error("User {0} not found in the training data")]
    UnknownUser(UserId),

    #[error("Interaction matrix is empty: {users} users x {items} items")]
    EmptySchema { users: usize, items: usize },

    #[error("Vector has {actual} item columns, model was fitted on {expected}")]
    SchemaMismatch { expected: usize, actual: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type RecommenderResult<T> = Result<T, RecommenderError>;
