use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use common::{OrderId, UserId, VendorId};
use domain::{NewOrder, Order, PickupToken};
use tokio::sync::RwLock;

use crate::{
    ListOptions, Result, SortBy, StoreError,
    repository::OrderRepository,
};

/// In-memory order repository.
///
/// Backs tests and local runs with the same interface and concurrency
/// semantics as the PostgreSQL implementation.
#[derive(Clone, Default)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
    next_order_number: Arc<AtomicI64>,
}

impl InMemoryOrderRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }
}

fn sort_and_filter(mut orders: Vec<Order>, options: ListOptions) -> Vec<Order> {
    if let Some(state) = options.state {
        orders.retain(|o| o.state() == state);
    }
    match options.sort_by {
        SortBy::Newest => {
            orders.sort_by(|a, b| b.order_number().cmp(&a.order_number()));
        }
        SortBy::Oldest => {
            orders.sort_by(|a, b| a.order_number().cmp(&b.order_number()));
        }
        SortBy::PriceHigh => {
            orders.sort_by(|a, b| b.total().cmp(&a.total()));
        }
        SortBy::PriceLow => {
            orders.sort_by(|a, b| a.total().cmp(&b.total()));
        }
    }
    orders
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, new: NewOrder) -> Result<Order> {
        let order_number = self.next_order_number.fetch_add(1, Ordering::SeqCst) + 1;
        let order = Order::create(OrderId::new(), order_number, new);

        let mut orders = self.orders.write().await;
        orders.insert(order.id(), order.clone());
        Ok(order)
    }

    async fn find(&self, id: OrderId) -> Result<Order> {
        let orders = self.orders.read().await;
        orders.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    async fn find_by_token(&self, token: &PickupToken) -> Result<Order> {
        let orders = self.orders.read().await;
        orders
            .values()
            .find(|o| o.qr_token() == Some(token))
            .cloned()
            .ok_or(StoreError::TokenNotFound)
    }

    async fn list_for_user(&self, user_id: UserId, options: ListOptions) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let matching: Vec<Order> = orders
            .values()
            .filter(|o| o.user_id() == user_id)
            .cloned()
            .collect();
        Ok(sort_and_filter(matching, options))
    }

    async fn list_for_vendor(
        &self,
        vendor_id: VendorId,
        options: ListOptions,
    ) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let matching: Vec<Order> = orders
            .values()
            .filter(|o| o.vendor_id() == vendor_id)
            .cloned()
            .collect();
        Ok(sort_and_filter(matching, options))
    }

    async fn update(&self, mut order: Order) -> Result<Order> {
        let mut orders = self.orders.write().await;
        let stored = orders
            .get(&order.id())
            .ok_or(StoreError::NotFound(order.id()))?;

        if stored.version() != order.version() {
            return Err(StoreError::ConcurrentModification {
                order_id: order.id(),
                expected: order.version(),
                actual: stored.version(),
            });
        }

        order.set_version(order.version().next());
        orders.insert(order.id(), order.clone());
        Ok(order)
    }
}
