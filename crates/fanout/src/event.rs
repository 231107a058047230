//! Fan-out event wire type.

use chrono::{DateTime, Utc};
use common::{OrderId, UserId, VendorId};
use domain::{Order, OrderState};
use serde::{Deserialize, Serialize};

/// Kind of fan-out event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderEventKind {
    /// A new order was placed.
    OrderCreated,
    /// An order changed state (or had its payment proof attached).
    OrderUpdated,
    /// A user-facing status message.
    Notification,
}

/// An ephemeral event delivered to the order's vendor and user.
///
/// Events are not persisted or replayed; a client that misses one picks
/// the change up on its next reconciliation pull. Receivers treat every
/// event as a cue to re-fetch authoritative state, so out-of-order
/// delivery is harmless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderEvent {
    #[serde(rename = "type")]
    pub kind: OrderEventKind,
    pub order_id: OrderId,
    pub vendor_id: VendorId,
    pub user_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<OrderState>,
    pub payload: serde_json::Value,
    pub occurred_at: DateTime<Utc>,
}

impl OrderEvent {
    /// Event for a freshly placed order.
    pub fn created(order: &Order) -> Self {
        Self::for_order(OrderEventKind::OrderCreated, order)
    }

    /// Event for an order state change.
    pub fn updated(order: &Order) -> Self {
        Self::for_order(OrderEventKind::OrderUpdated, order)
    }

    /// User-facing status message for an order.
    pub fn notification(order: &Order, message: impl Into<String>) -> Self {
        Self {
            kind: OrderEventKind::Notification,
            order_id: order.id(),
            vendor_id: order.vendor_id(),
            user_id: order.user_id(),
            state: Some(order.state()),
            payload: serde_json::json!({ "message": message.into() }),
            occurred_at: Utc::now(),
        }
    }

    fn for_order(kind: OrderEventKind, order: &Order) -> Self {
        Self {
            kind,
            order_id: order.id(),
            vendor_id: order.vendor_id(),
            user_id: order.user_id(),
            state: Some(order.state()),
            payload: serde_json::json!({
                "order_number": order.order_number(),
                "total_cents": order.total().cents(),
            }),
            occurred_at: Utc::now(),
        }
    }
}
