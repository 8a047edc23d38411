use std::sync::{PoisonError, RwLock};

use crate::{
    error::AppResult,
    models::{ItemCatalog, OrderRecord},
    services::sources::OrderDataSource,
};

/// Source serving fixed, in-process data
#[derive(Debug, Default)]
pub struct InMemorySource {
    orders: RwLock<Vec<OrderRecord>>,
    catalog: RwLock<ItemCatalog>,
}

impl InMemorySource {
    pub fn new(orders: Vec<OrderRecord>, catalog: ItemCatalog) -> Self {
        Self {
            orders: RwLock::new(orders),
            catalog: RwLock::new(catalog),
        }
    }

    /// Replaces the orders served by later fetches
    pub fn replace_orders(&self, orders: Vec<OrderRecord>) {
        *self.orders.write().unwrap_or_else(PoisonError::into_inner) = orders;
    }

    /// Replaces the catalog served by later fetches
    pub fn replace_catalog(&self, catalog: ItemCatalog) {
        *self.catalog.write().unwrap_or_else(PoisonError::into_inner) = catalog;
    }
}

#[async_trait::async_trait]
impl OrderDataSource for InMemorySource {
    async fn fetch_orders(&self) -> AppResult<Vec<OrderRecord>> {
        Ok(self
            .orders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    async fn fetch_catalog(&self) -> AppResult<ItemCatalog> {
        Ok(self
            .catalog
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn name(&self) -> &'static str {
        "in-memory"
    }
}
