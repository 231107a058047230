//! Order repository trait.

use async_trait::async_trait;
use common::{OrderId, UserId, VendorId};
use domain::{NewOrder, Order, PickupToken};

use crate::{ListOptions, Result};

/// Core trait for order persistence.
///
/// All implementations must be thread-safe (Send + Sync). Orders are
/// never physically deleted; terminal orders remain as history.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persists a validated new order.
    ///
    /// Assigns the order id, a monotonically increasing order number, and
    /// version 1, and returns the stored record.
    async fn create(&self, new: NewOrder) -> Result<Order>;

    /// Loads an order by id.
    async fn find(&self, id: OrderId) -> Result<Order>;

    /// Loads the order currently holding the given pickup token.
    ///
    /// Fails with [`StoreError::TokenNotFound`](crate::StoreError::TokenNotFound)
    /// when no order holds it — including after the token was cleared by a
    /// completed pickup.
    async fn find_by_token(&self, token: &PickupToken) -> Result<Order>;

    /// Lists a user's orders.
    async fn list_for_user(&self, user_id: UserId, options: ListOptions) -> Result<Vec<Order>>;

    /// Lists a vendor's order queue.
    async fn list_for_vendor(&self, vendor_id: VendorId, options: ListOptions)
    -> Result<Vec<Order>>;

    /// Persists an updated order with an optimistic version check.
    ///
    /// The write succeeds only when the stored version still equals the
    /// version the caller read (`order.version()`); the stored record then
    /// moves to the next version, which is reflected in the returned order.
    /// A losing writer gets
    /// [`StoreError::ConcurrentModification`](crate::StoreError::ConcurrentModification).
    async fn update(&self, order: Order) -> Result<Order>;
}
