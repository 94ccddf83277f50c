//! # Menu Catalog Adapter
//!
//! Reads the menu from a JSON file maintained outside the till:
//!
//! ```json
//! [
//!   { "id": "somtam", "name": "Som tam Thai", "price": 6000,
//!     "category": "salad", "defaultSpiceLevel": "medium" }
//! ]
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use somtam_core::{MenuCatalog, MenuItem};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Cannot read menu file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Menu file {path} is not a valid item list: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Menu items keyed by id.
#[derive(Debug, Clone, Default)]
pub struct JsonMenuCatalog {
    items: HashMap<String, MenuItem>,
}

impl JsonMenuCatalog {
    pub fn empty() -> Self {
        JsonMenuCatalog::default()
    }

    /// Later items with a repeated id replace earlier ones.
    pub fn from_items(items: impl IntoIterator<Item = MenuItem>) -> Self {
        JsonMenuCatalog {
            items: items
                .into_iter()
                .map(|item| (item.id.clone(), item))
                .collect(),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let items: Vec<MenuItem> =
            serde_json::from_str(&text).map_err(|source| CatalogError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let catalog = Self::from_items(items);
        info!(path = %path.display(), items = catalog.len(), "Menu loaded");
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl MenuCatalog for JsonMenuCatalog {
    fn get_menu_item(&self, id: &str) -> Option<MenuItem> {
        self.items.get(id).cloned()
    }
}
