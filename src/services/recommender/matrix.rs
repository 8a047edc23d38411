use std::collections::{BTreeSet, HashMap, HashSet};

use super::error::{RecommenderError, RecommenderResult};
use crate::models::{ItemId, OrderRecord, UserId};

/// Dense user x item purchase-count matrix
///
/// Rows are the sorted distinct user ids, columns the sorted distinct item ids,
/// both derived from the ingested orders. Stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionMatrix {
    users: Vec<UserId>,
    items: Vec<ItemId>,
    counts: Vec<f64>,
}

impl InteractionMatrix {
    pub fn n_users(&self) -> usize {
        self.users.len()
    }

    pub fn n_items(&self) -> usize {
        self.items.len()
    }

    pub fn users(&self) -> &[UserId] {
        &self.users
    }

    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    /// Row index of a user, if the user placed any order
    pub fn user_row(&self, user_id: UserId) -> Option<usize> {
        self.users.binary_search(&user_id).ok()
    }

    /// Purchase counts of one user, one entry per item column
    pub fn row(&self, row: usize) -> &[f64] {
        let width = self.n_items();
        &self.counts[row * width..(row + 1) * width]
    }

    pub fn get(&self, row: usize, column: usize) -> f64 {
        self.counts[row * self.n_items() + column]
    }

    /// Items the user in `row` bought at least once
    pub fn owned_items(&self, row: usize) -> HashSet<ItemId> {
        self.row(row)
            .iter()
            .zip(&self.items)
            .filter(|(count, _)| **count > 0.0)
            .map(|(_, item_id)| *item_id)
            .collect()
    }
}

/// Turns raw order records into an [`InteractionMatrix`]
pub struct InteractionMatrixBuilder;

impl InteractionMatrixBuilder {
    /// Builds the count matrix from a complete set of orders.
    ///
    /// Each order contributes one (user, item) interaction per listed item.
    /// The result does not depend on the order of `orders`.
    pub fn build(orders: &[OrderRecord]) -> RecommenderResult<InteractionMatrix> {
        if orders.is_empty() {
            return Err(RecommenderError::DataLoad(
                "no order records to build interactions from".to_string(),
            ));
        }

        let mut users = BTreeSet::new();
        let mut items = BTreeSet::new();
        let mut pairs: HashMap<(UserId, ItemId), u32> = HashMap::new();

        for (position, order) in orders.iter().enumerate() {
            order.validate().map_err(|reason| {
                RecommenderError::DataLoad(format!("order record {}: {}", position, reason))
            })?;

            users.insert(order.user_id);
            for item_id in &order.item_ids {
                items.insert(*item_id);
                *pairs.entry((order.user_id, *item_id)).or_insert(0) += 1;
            }
        }

        let users: Vec<UserId> = users.into_iter().collect();
        let items: Vec<ItemId> = items.into_iter().collect();

        if users.is_empty() || items.is_empty() {
            return Err(RecommenderError::EmptySchema {
                users: users.len(),
                items: items.len(),
            });
        }

        let mut counts = vec![0.0; users.len() * items.len()];
        for ((user_id, item_id), count) in pairs {
            // Both keys were inserted above, so the searches always succeed.
            if let (Ok(row), Ok(column)) =
                (users.binary_search(&user_id), items.binary_search(&item_id))
            {
                counts[row * items.len() + column] = f64::from(count);
            }
        }

        Ok(InteractionMatrix {
            users,
            items,
            counts,
        })
    }
}
