//! Shared application state.

use std::time::Duration;

use fanout::EventHub;
use fulfillment::{CartService, FulfillmentService};
use order_store::OrderRepository;

/// Shared application state accessible from all handlers.
pub struct AppState<R: OrderRepository> {
    pub carts: CartService,
    pub fulfillment: FulfillmentService<R>,
    pub orders: R,
    pub hub: EventHub,
    /// Reconciliation tick for the event streams.
    pub reconcile_interval: Duration,
}
