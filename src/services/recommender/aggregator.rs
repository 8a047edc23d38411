use std::collections::HashSet;

use super::matrix::InteractionMatrix;
use super::neighbors::Neighbor;
use crate::models::{ItemId, ScoredItem};

/// Turns a user's neighbors into ranked item scores
pub struct RecommendationAggregator;

impl RecommendationAggregator {
    /// Scores every item by the neighbors' purchase counts weighted by similarity.
    ///
    /// `score[item] = Σ raw_count[neighbor, item] × (1 - distance[neighbor])`
    ///
    /// Raw counts are used here; the scaled space only decides who the neighbors
    /// are. Items in `already_owned` are dropped, the rest are sorted by
    /// descending score (ties by ascending item id) and cut to `top_n`.
    pub fn aggregate(
        target_row: usize,
        neighbors: &[Neighbor],
        raw: &InteractionMatrix,
        already_owned: &HashSet<ItemId>,
        top_n: usize,
    ) -> Vec<ScoredItem> {
        let mut scores = vec![0.0; raw.n_items()];

        for neighbor in neighbors.iter().filter(|n| n.row != target_row) {
            let weight = neighbor.similarity();
            for (score, count) in scores.iter_mut().zip(raw.row(neighbor.row)) {
                *score += count * weight;
            }
        }

        let mut ranked: Vec<ScoredItem> = raw
            .items()
            .iter()
            .zip(scores)
            .filter(|(item_id, _)| !already_owned.contains(*item_id))
            .map(|(item_id, score)| ScoredItem {
                item_id: *item_id,
                score,
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.item_id.cmp(&b.item_id))
        });
        ranked.truncate(top_n);

        ranked
    }
}
