//! Order data sources
//!
//! The engine consumes a complete set of order records plus an item-name
//! registry. Where they come from (CSV exports, fixtures) is the source's
//! concern; each source returns fully validated records or fails the whole
//! fetch.

use crate::{
    error::AppResult,
    models::{ItemCatalog, OrderRecord},
};

pub mod csv_directory;
pub mod memory;

pub use csv_directory::CsvDirectorySource;
pub use memory::InMemorySource;

/// Trait for order data sources
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait OrderDataSource: Send + Sync {
    /// Fetch every order record
    ///
    /// A single malformed record fails the fetch with a data-load error;
    /// rows are never silently dropped.
    async fn fetch_orders(&self) -> AppResult<Vec<OrderRecord>>;

    /// Fetch the item-name registry used for presentation
    async fn fetch_catalog(&self) -> AppResult<ItemCatalog>;

    /// Source name for logging and debugging
    fn name(&self) -> &'static str;
}
