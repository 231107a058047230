use common::{MenuItemId, OrderId};
use domain::{CartError, CatalogError, OrderError};
use order_store::StoreError;
use thiserror::Error;

/// Errors surfaced by cart and fulfillment operations.
#[derive(Debug, Error)]
pub enum FulfillmentError {
    /// State-machine or order-creation rule violation.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Cart rule violation.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Persistence failure, including optimistic-concurrency conflicts.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Catalog collaborator failure.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Checkout was attempted with nothing in the cart.
    #[error("cart is empty; nothing to check out")]
    EmptyCart,

    /// The referenced menu item does not exist in the catalog.
    #[error("menu item not found: {0}")]
    MenuItemNotFound(MenuItemId),

    /// The caller does not own the order.
    #[error("order {0} does not belong to the caller")]
    Forbidden(OrderId),

    /// The presented pickup token is unknown or no longer live.
    #[error("pickup token is stale or invalid")]
    StaleOrInvalidToken,
}
