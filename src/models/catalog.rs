use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::ItemId;

/// Name shown for items missing from the catalog
pub const UNKNOWN_ITEM_NAME: &str = "Unknown item";

/// A named menu item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub item_id: ItemId,
    pub name: String,
}

/// Registry of human-readable item names
///
/// Presentation only: the recommendation engine never consults it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemCatalog {
    names: HashMap<ItemId, String>,
}

impl ItemCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or renames an item
    pub fn insert(&mut self, item_id: ItemId, name: impl Into<String>) {
        self.names.insert(item_id, name.into());
    }

    /// Looks up an item's name, falling back to [`UNKNOWN_ITEM_NAME`]
    pub fn name_of(&self, item_id: ItemId) -> &str {
        self.names
            .get(&item_id)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_ITEM_NAME)
    }

    pub fn entry(&self, item_id: ItemId) -> Option<CatalogEntry> {
        self.names.get(&item_id).map(|name| CatalogEntry {
            item_id,
            name: name.clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// All entries, ordered by item id
    pub fn entries(&self) -> Vec<CatalogEntry> {
        let mut entries: Vec<CatalogEntry> = self
            .names
            .iter()
            .map(|(item_id, name)| CatalogEntry {
                item_id: *item_id,
                name: name.clone(),
            })
            .collect();
        entries.sort_by_key(|entry| entry.item_id);
        entries
    }
}

impl FromIterator<(ItemId, String)> for ItemCatalog {
    fn from_iter<I: IntoIterator<Item = (ItemId, String)>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}
