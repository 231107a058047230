//! Per-user cart persistence.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::UserId;
use domain::Cart;
use tokio::sync::RwLock;

use crate::Result;

/// Persistence for per-user carts.
///
/// Carts are single-owner, so the only write race is a same-user
/// double-submit; `save` resolves those last-writer-wins.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Loads a user's cart, returning an empty cart on first access.
    async fn load(&self, user_id: UserId) -> Result<Cart>;

    /// Stores a user's cart, replacing any previous contents.
    async fn save(&self, cart: Cart) -> Result<()>;
}

/// In-memory cart store.
///
/// Carts are session-scoped working state; unlike orders they are not
/// retained as history, so the in-memory store is also the production one.
#[derive(Clone, Default)]
pub struct InMemoryCartStore {
    carts: Arc<RwLock<HashMap<UserId, Cart>>>,
}

impl InMemoryCartStore {
    /// Creates a new empty cart store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn load(&self, user_id: UserId) -> Result<Cart> {
        let carts = self.carts.read().await;
        Ok(carts
            .get(&user_id)
            .cloned()
            .unwrap_or_else(|| Cart::empty(user_id)))
    }

    async fn save(&self, cart: Cart) -> Result<()> {
        let mut carts = self.carts.write().await;
        carts.insert(cart.user_id(), cart);
        Ok(())
    }
}
