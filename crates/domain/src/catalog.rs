//! Catalog collaborator boundary.
//!
//! The core reads menu items at add-to-cart and checkout time and never
//! writes back; menu CRUD lives outside this system.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{MenuItemId, VendorId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::order::Money;

/// A menu item as read from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: MenuItemId,
    pub vendor_id: VendorId,
    pub name: String,
    pub price: Money,
    /// Reference to the item picture held by the file-storage collaborator.
    pub picture: Option<String>,
    pub is_available: bool,
}

/// Errors from the catalog collaborator.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog could not be reached.
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Read access to menu items.
///
/// Returns `Ok(None)` for items the catalog does not know, and an error
/// only when the collaborator itself fails.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Looks up a single menu item.
    async fn item(&self, id: MenuItemId) -> Result<Option<MenuItem>, CatalogError>;
}

#[derive(Debug, Default)]
struct InMemoryCatalogState {
    items: HashMap<MenuItemId, MenuItem>,
    fail_lookups: bool,
}

/// In-memory catalog for tests and local runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    state: Arc<RwLock<InMemoryCatalogState>>,
}

impl InMemoryCatalog {
    /// Creates a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a menu item.
    pub fn insert(&self, item: MenuItem) {
        self.state.write().unwrap().items.insert(item.id, item);
    }

    /// Removes a menu item.
    pub fn remove(&self, id: MenuItemId) {
        self.state.write().unwrap().items.remove(&id);
    }

    /// Configures every lookup to fail, simulating an unreachable catalog.
    pub fn set_fail_lookups(&self, fail: bool) {
        self.state.write().unwrap().fail_lookups = fail;
    }

    /// Returns the number of items in the catalog.
    pub fn item_count(&self) -> usize {
        self.state.read().unwrap().items.len()
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn item(&self, id: MenuItemId) -> Result<Option<MenuItem>, CatalogError> {
        let state = self.state.read().unwrap();
        if state.fail_lookups {
            return Err(CatalogError::Unavailable("catalog offline".to_string()));
        }
        Ok(state.items.get(&id).cloned())
    }
}
