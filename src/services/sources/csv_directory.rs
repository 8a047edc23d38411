//! CSV export source
//!
//! Reads one order CSV per outlet from a data directory, plus the menu file
//! that names the items. Order files need `User_ID` and `Order_List` columns;
//! any other columns (timestamps, amounts) are ignored.

use std::fs::{self, File};
use std::io::Read;
use std::path::PathBuf;

use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::{parse_item_list, ItemCatalog, ItemId, OrderRecord},
    services::{recommender::RecommenderError, sources::OrderDataSource},
};

#[derive(Debug, Deserialize)]
struct OrderRow {
    #[serde(rename = "User_ID")]
    user_id: String,
    #[serde(rename = "Order_List")]
    order_list: String,
}

#[derive(Debug, Deserialize)]
struct MenuRow {
    #[serde(rename = "Menu ID")]
    item_id: ItemId,
    #[serde(rename = "Menu Name")]
    name: String,
}

#[derive(Debug, Clone)]
pub struct CsvDirectorySource {
    data_dir: PathBuf,
    menu_file: String,
}

impl CsvDirectorySource {
    pub fn new(data_dir: impl Into<PathBuf>, menu_file: impl Into<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            menu_file: menu_file.into(),
        }
    }

    /// Order files in the data directory, sorted by name
    fn order_files(&self) -> AppResult<Vec<PathBuf>> {
        let entries = fs::read_dir(&self.data_dir).map_err(|e| {
            data_load(format!(
                "cannot read data directory {}: {}",
                self.data_dir.display(),
                e
            ))
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| {
                    data_load(format!("cannot list {}: {}", self.data_dir.display(), e))
                })?
                .path();

            let is_csv = path.extension().is_some_and(|ext| ext == "csv");
            let is_menu = path
                .file_name()
                .is_some_and(|name| name == self.menu_file.as_str());

            if path.is_file() && is_csv && !is_menu {
                files.push(path);
            }
        }
        files.sort();

        if files.is_empty() {
            return Err(data_load(format!(
                "no order files in {}",
                self.data_dir.display()
            )));
        }

        Ok(files)
    }

    fn read_orders(&self) -> AppResult<Vec<OrderRecord>> {
        let mut orders = Vec::new();

        for path in self.order_files()? {
            let file = File::open(&path)
                .map_err(|e| data_load(format!("cannot open {}: {}", path.display(), e)))?;
            let file_orders = parse_orders(file, &path.display().to_string())?;

            tracing::debug!(
                file = %path.display(),
                orders = file_orders.len(),
                "Order file read"
            );
            orders.extend(file_orders);
        }

        Ok(orders)
    }

    fn read_catalog(&self) -> ItemCatalog {
        let path = self.data_dir.join(&self.menu_file);

        match File::open(&path).map_err(csv::Error::from).and_then(parse_catalog) {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Menu file unavailable, item names will be unknown"
                );
                ItemCatalog::new()
            }
        }
    }
}

#[async_trait::async_trait]
impl OrderDataSource for CsvDirectorySource {
    async fn fetch_orders(&self) -> AppResult<Vec<OrderRecord>> {
        let source = self.clone();
        let orders = tokio::task::spawn_blocking(move || source.read_orders())
            .await
            .map_err(|e| AppError::Internal(e.to_string()))??;

        tracing::info!(
            data_dir = %self.data_dir.display(),
            orders = orders.len(),
            "Orders fetched"
        );

        Ok(orders)
    }

    async fn fetch_catalog(&self) -> AppResult<ItemCatalog> {
        let source = self.clone();
        let catalog = tokio::task::spawn_blocking(move || source.read_catalog())
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;

        tracing::info!(items = catalog.len(), "Menu catalog fetched");

        Ok(catalog)
    }

    fn name(&self) -> &'static str {
        "csv-directory"
    }
}

/// Parses one order CSV. `origin` names the input in error messages.
pub fn parse_orders<R: Read>(reader: R, origin: &str) -> AppResult<Vec<OrderRecord>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut orders = Vec::new();

    for (index, row) in reader.deserialize::<OrderRow>().enumerate() {
        let row_number = index + 1;
        let row = row.map_err(|e| data_load(format!("{} row {}: {}", origin, row_number, e)))?;

        let user_id = row.user_id.trim().parse().map_err(|_| {
            data_load(format!(
                "{} row {}: user id {:?} is not an integer",
                origin, row_number, row.user_id
            ))
        })?;
        let item_ids = parse_item_list(&row.order_list)
            .map_err(|reason| data_load(format!("{} row {}: {}", origin, row_number, reason)))?;

        let order = OrderRecord::new(user_id, item_ids);
        order
            .validate()
            .map_err(|reason| data_load(format!("{} row {}: {}", origin, row_number, reason)))?;

        orders.push(order);
    }

    Ok(orders)
}

/// Parses the menu CSV (`Menu ID`, `Menu Name`)
pub fn parse_catalog<R: Read>(reader: R) -> Result<ItemCatalog, csv::Error> {
    let mut reader = csv::Reader::from_reader(reader);
    reader
        .deserialize::<MenuRow>()
        .map(|row| row.map(|row| (row.item_id, row.name)))
        .collect()
}

fn data_load(message: String) -> AppError {
    AppError::Recommender(RecommenderError::DataLoad(message))
}
