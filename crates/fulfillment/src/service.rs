//! Order fulfillment orchestration.

use std::sync::Arc;

use common::{OrderId, UserId, VendorId};
use domain::{Catalog, NewOrder, Order, OrderError, OrderState, PickupToken};
use fanout::{EventHub, OrderEvent};
use order_store::{CartStore, OrderRepository, StoreError};

use crate::error::FulfillmentError;

/// Orchestrates checkout and order state transitions.
///
/// Every accepted transition is persisted through the repository's
/// optimistic update and then published to the fan-out hub. A publish
/// failure never fails the transition: subscribers reconcile on their
/// periodic pull.
#[derive(Clone)]
pub struct FulfillmentService<R: OrderRepository> {
    orders: R,
    carts: Arc<dyn CartStore>,
    catalog: Arc<dyn Catalog>,
    hub: EventHub,
}

impl<R: OrderRepository> FulfillmentService<R> {
    /// Creates a new fulfillment service.
    pub fn new(
        orders: R,
        carts: Arc<dyn CartStore>,
        catalog: Arc<dyn Catalog>,
        hub: EventHub,
    ) -> Self {
        Self {
            orders,
            carts,
            catalog,
            hub,
        }
    }

    /// Converts the user's cart into a pending order and empties the cart.
    ///
    /// Item name, price, and picture are snapshotted from the catalog at
    /// this instant. The cart is cleared only after the order is persisted,
    /// so a failed checkout leaves the cart intact.
    #[tracing::instrument(skip(self))]
    pub async fn checkout(&self, user_id: UserId) -> Result<Order, FulfillmentError> {
        let checkout_start = std::time::Instant::now();
        let mut cart = self.carts.load(user_id).await?;
        if cart.is_empty() {
            return Err(FulfillmentError::EmptyCart);
        }

        let mut selection = Vec::with_capacity(cart.lines().len());
        for line in cart.lines() {
            let item = self
                .catalog
                .item(line.menu_item_id)
                .await?
                .ok_or(FulfillmentError::MenuItemNotFound(line.menu_item_id))?;
            if !item.is_available {
                return Err(domain::CartError::ItemUnavailable {
                    menu_item_id: item.id,
                }
                .into());
            }
            selection.push((item, line.quantity));
        }

        let new = NewOrder::from_selection(user_id, selection)?;
        let order = self.orders.create(new).await?;

        cart.clear();
        self.carts.save(cart).await?;

        self.hub.publish(OrderEvent::created(&order));
        metrics::counter!("orders_placed_total").increment(1);
        metrics::histogram!("checkout_duration_seconds")
            .record(checkout_start.elapsed().as_secs_f64());
        tracing::info!(order_id = %order.id(), order_number = order.order_number(), "order placed");

        Ok(order)
    }

    /// Attaches the user's payment-proof reference to a pending order.
    #[tracing::instrument(skip(self))]
    pub async fn attach_payment_proof(
        &self,
        order_id: OrderId,
        user_id: UserId,
        proof_ref: &str,
    ) -> Result<Order, FulfillmentError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut order = self.orders.find(order_id).await?;
            if order.user_id() != user_id {
                return Err(FulfillmentError::Forbidden(order_id));
            }
            order.attach_payment_proof(proof_ref)?;

            match self.orders.update(order).await {
                Ok(saved) => {
                    self.publish_change(&saved);
                    return Ok(saved);
                }
                Err(StoreError::ConcurrentModification { .. }) if attempt == 1 => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Vendor accepts a pending order; issues the pickup token.
    #[tracing::instrument(skip(self))]
    pub async fn accept(
        &self,
        order_id: OrderId,
        vendor_id: VendorId,
    ) -> Result<Order, FulfillmentError> {
        self.vendor_transition(order_id, vendor_id, Order::accept)
            .await
    }

    /// Vendor rejects a pending order.
    #[tracing::instrument(skip(self))]
    pub async fn reject(
        &self,
        order_id: OrderId,
        vendor_id: VendorId,
    ) -> Result<Order, FulfillmentError> {
        self.vendor_transition(order_id, vendor_id, Order::reject)
            .await
    }

    /// Vendor marks a preparing order ready for pickup.
    #[tracing::instrument(skip(self))]
    pub async fn mark_ready(
        &self,
        order_id: OrderId,
        vendor_id: VendorId,
    ) -> Result<Order, FulfillmentError> {
        self.vendor_transition(order_id, vendor_id, Order::mark_ready)
            .await
    }

    /// Vendor completes a ready order without a token scan (counter pickup).
    #[tracing::instrument(skip(self))]
    pub async fn complete(
        &self,
        order_id: OrderId,
        vendor_id: VendorId,
    ) -> Result<Order, FulfillmentError> {
        self.vendor_transition(order_id, vendor_id, Order::complete)
            .await
    }

    /// Verifies a scanned pickup token, completing the order it belongs to.
    ///
    /// The token resolves only while it is live; a second presentation
    /// fails because completing the order cleared it.
    #[tracing::instrument(skip(self, token))]
    pub async fn verify_pickup(&self, token: &PickupToken) -> Result<Order, FulfillmentError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut order = self.orders.find_by_token(token).await.map_err(|e| match e {
                StoreError::TokenNotFound => FulfillmentError::StaleOrInvalidToken,
                other => other.into(),
            })?;
            order.complete()?;

            match self.orders.update(order).await {
                Ok(saved) => {
                    self.record_transition(&saved);
                    return Ok(saved);
                }
                Err(StoreError::ConcurrentModification { .. }) if attempt == 1 => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Loads an order for its user or vendor; anyone else gets `Forbidden`.
    #[tracing::instrument(skip(self))]
    pub async fn order_for_user(
        &self,
        order_id: OrderId,
        user_id: UserId,
    ) -> Result<Order, FulfillmentError> {
        let order = self.orders.find(order_id).await?;
        if order.user_id() != user_id {
            return Err(FulfillmentError::Forbidden(order_id));
        }
        Ok(order)
    }

    /// Runs one read-validate-write cycle for a vendor-driven transition,
    /// retrying once when a concurrent writer won the version check.
    async fn vendor_transition<F>(
        &self,
        order_id: OrderId,
        vendor_id: VendorId,
        apply: F,
    ) -> Result<Order, FulfillmentError>
    where
        F: Fn(&mut Order) -> Result<(), OrderError>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let mut order = self.orders.find(order_id).await?;
            if order.vendor_id() != vendor_id {
                return Err(FulfillmentError::Forbidden(order_id));
            }
            apply(&mut order)?;

            match self.orders.update(order).await {
                Ok(saved) => {
                    self.record_transition(&saved);
                    return Ok(saved);
                }
                Err(StoreError::ConcurrentModification { .. }) if attempt == 1 => {
                    tracing::debug!(%order_id, "optimistic update conflicted; retrying once");
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn record_transition(&self, order: &Order) {
        metrics::counter!("order_transitions_total", "state" => order.state().as_str())
            .increment(1);
        tracing::info!(
            order_id = %order.id(),
            state = %order.state(),
            "order transitioned"
        );
        self.publish_change(order);
    }

    fn publish_change(&self, order: &Order) {
        self.hub.publish(OrderEvent::updated(order));
        if let Some(message) = notification_message(order) {
            self.hub.publish(OrderEvent::notification(order, message));
        }
    }
}

fn notification_message(order: &Order) -> Option<String> {
    let n = order.order_number();
    match order.state() {
        OrderState::Preparing => Some(format!("Order #{n} is being prepared")),
        OrderState::Ready => Some(format!("Order #{n} is ready for pickup")),
        OrderState::Completed => Some(format!("Order #{n} has been picked up")),
        OrderState::Rejected => Some(format!("Order #{n} was rejected by the vendor")),
        OrderState::Pending => None,
    }
}
