use std::cmp::Ordering;
use std::sync::Arc;

use super::error::{RecommenderError, RecommenderResult};
use super::scaler::ScaledMatrix;
use crate::models::UserId;

/// A training row close to a query vector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Row index in the training matrix
    pub row: usize,
    /// Cosine distance, in `[0, 2]`
    pub distance: f64,
}

impl Neighbor {
    /// Weight of this neighbor's purchases, in `[-1, 1]`
    pub fn similarity(&self) -> f64 {
        1.0 - self.distance
    }
}

/// Immutable cosine-distance index over the rows of a [`ScaledMatrix`]
///
/// Exhaustive search: every query scores all rows.
#[derive(Debug, Clone)]
pub struct NeighborModel {
    scaled: Arc<ScaledMatrix>,
    users: Arc<[UserId]>,
    norms: Vec<f64>,
    k: usize,
}

/// Builds [`NeighborModel`]s
pub struct NeighborIndex;

impl NeighborIndex {
    /// Indexes `scaled`, whose rows belong to `users` in the same order.
    pub fn build(
        scaled: Arc<ScaledMatrix>,
        users: Arc<[UserId]>,
        k: usize,
    ) -> RecommenderResult<NeighborModel> {
        if k == 0 {
            return Err(RecommenderError::InvalidParameter(
                "neighbor count must be at least 1".to_string(),
            ));
        }

        if scaled.n_rows() == 0 || scaled.n_cols() == 0 {
            return Err(RecommenderError::EmptySchema {
                users: scaled.n_rows(),
                items: scaled.n_cols(),
            });
        }

        if users.len() != scaled.n_rows() {
            return Err(RecommenderError::InvalidParameter(format!(
                "{} user keys for {} matrix rows",
                users.len(),
                scaled.n_rows()
            )));
        }

        let norms = scaled.rows().map(norm).collect();

        Ok(NeighborModel {
            scaled,
            users,
            norms,
            k,
        })
    }
}

impl NeighborModel {
    /// Number of neighbors returned per user, not counting the user itself
    pub fn k(&self) -> usize {
        self.k
    }

    pub fn n_rows(&self) -> usize {
        self.scaled.n_rows()
    }

    /// Row index of a training user
    pub fn user_row(&self, user_id: UserId) -> RecommenderResult<usize> {
        self.users
            .binary_search(&user_id)
            .map_err(|_| RecommenderError::UnknownUser(user_id))
    }

    /// Nearest rows to a training user.
    ///
    /// Asks for `k + 1` rows so the user's own row (distance 0) can be
    /// removed by the caller and `k` real neighbors remain.
    pub fn query(&self, user_id: UserId) -> RecommenderResult<Vec<Neighbor>> {
        let row = self.user_row(user_id)?;
        self.nearest(self.scaled.row(row), self.k + 1)
    }

    /// The `n` rows closest to `vector`, which must already be scaled.
    ///
    /// Sorted by ascending distance, ties by lower row index.
    pub fn nearest(&self, vector: &[f64], n: usize) -> RecommenderResult<Vec<Neighbor>> {
        if vector.len() != self.scaled.n_cols() {
            return Err(RecommenderError::SchemaMismatch {
                expected: self.scaled.n_cols(),
                actual: vector.len(),
            });
        }

        let vector_norm = norm(vector);
        let mut neighbors: Vec<Neighbor> = self
            .scaled
            .rows()
            .zip(&self.norms)
            .enumerate()
            .map(|(row, (values, row_norm))| Neighbor {
                row,
                distance: cosine_distance(vector, vector_norm, values, *row_norm),
            })
            .collect();

        neighbors.sort_by(compare_neighbors);
        neighbors.truncate(n);

        Ok(neighbors)
    }
}

fn compare_neighbors(a: &Neighbor, b: &Neighbor) -> Ordering {
    a.distance
        .total_cmp(&b.distance)
        .then_with(|| a.row.cmp(&b.row))
}

fn norm(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum::<f64>().sqrt()
}

/// `1 - cos(a, b)`; a zero vector is orthogonal to everything.
fn cosine_distance(a: &[f64], a_norm: f64, b: &[f64], b_norm: f64) -> f64 {
    if a_norm == 0.0 || b_norm == 0.0 {
        return 1.0;
    }

    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    (1.0 - dot / (a_norm * b_norm)).clamp(0.0, 2.0)
}
