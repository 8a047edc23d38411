use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{ItemId, UserId};

/// One purchase event: a user and the items bought in that order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub user_id: UserId,
    pub item_ids: Vec<ItemId>,
}

impl OrderRecord {
    pub fn new(user_id: UserId, item_ids: Vec<ItemId>) -> Self {
        Self { user_id, item_ids }
    }

    /// Checks the record against the ingestion schema.
    ///
    /// An order must list at least one item and may not list the same item twice.
    pub fn validate(&self) -> Result<(), String> {
        if self.item_ids.is_empty() {
            return Err(format!("order for user {} has no items", self.user_id));
        }

        let mut seen = HashSet::with_capacity(self.item_ids.len());
        for item_id in &self.item_ids {
            if !seen.insert(item_id) {
                return Err(format!(
                    "order for user {} lists item {} more than once",
                    self.user_id, item_id
                ));
            }
        }

        Ok(())
    }
}

/// Parses an order's item-list field, e.g. `"[3, 14, 7]"`.
///
/// Only a bracketed list of integers is accepted; anything else is rejected
/// rather than interpreted.
pub fn parse_item_list(raw: &str) -> Result<Vec<ItemId>, String> {
    let trimmed = raw.trim();
    if !(trimmed.starts_with('[') && trimmed.ends_with(']')) {
        return Err(format!("item list {:?} is not a bracketed list", raw));
    }

    serde_json::from_str::<Vec<ItemId>>(trimmed)
        .map_err(|e| format!("item list {:?} is not a list of integers: {}", raw, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_item_list() {
        assert_eq!(parse_item_list("[3, 14, 7]").unwrap(), vec![3, 14, 7]);
        assert_eq!(parse_item_list("  [1]  ").unwrap(), vec![1]);
        assert_eq!(parse_item_list("[]").unwrap(), Vec::<ItemId>::new());
    }

    #[test]
    fn test_parse_item_list_rejects_non_lists() {
        assert!(parse_item_list("3, 14").is_err());
        assert!(parse_item_list("").is_err());
        assert!(parse_item_list("__import__('os')").is_err());
    }

    #[test]
    fn test_parse_item_list_rejects_non_integers() {
        assert!(parse_item_list("[1, 'two']").is_err());
        assert!(parse_item_list("[1.5, 2]").is_err());
        assert!(parse_item_list("[\"1\"]").is_err());
    }

    #[test]
    fn test_validate_rejects_empty_order() {
        let order = OrderRecord::new(1, vec![]);
        assert!(order.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_repeated_item() {
        let order = OrderRecord::new(1, vec![4, 2, 4]);
        let err = order.validate().unwrap_err();
        assert!(err.contains("item 4"));
    }

    #[test]
    fn test_validate_accepts_distinct_items() {
        assert!(OrderRecord::new(1, vec![4, 2, 9]).validate().is_ok());
    }
}
