//! Order state machine.

use serde::{Deserialize, Serialize};

/// The state of an order in its fulfillment lifecycle.
///
/// State transitions:
/// ```text
/// Pending ──► Preparing ──► Ready ──► Completed
///    │
///    └──► Rejected
/// ```
///
/// `Completed` and `Rejected` are terminal; no state is ever revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderState {
    /// Order has been placed and awaits the vendor's decision.
    #[default]
    Pending,

    /// Vendor accepted the order and is preparing it.
    Preparing,

    /// Order is ready for pickup.
    Ready,

    /// Order was picked up (terminal state).
    Completed,

    /// Vendor rejected the order (terminal state).
    Rejected,
}

impl OrderState {
    /// Returns true if the vendor can accept the order in this state.
    pub fn can_accept(&self) -> bool {
        matches!(self, OrderState::Pending)
    }

    /// Returns true if the vendor can reject the order in this state.
    pub fn can_reject(&self) -> bool {
        matches!(self, OrderState::Pending)
    }

    /// Returns true if the order can be marked ready in this state.
    pub fn can_mark_ready(&self) -> bool {
        matches!(self, OrderState::Preparing)
    }

    /// Returns true if the order can be completed in this state.
    pub fn can_complete(&self) -> bool {
        matches!(self, OrderState::Ready)
    }

    /// Returns true if a pickup token is live in this state.
    pub fn has_live_token(&self) -> bool {
        matches!(self, OrderState::Preparing | OrderState::Ready)
    }

    /// Returns true if this is a terminal state (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderState::Completed | OrderState::Rejected)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::Pending => "pending",
            OrderState::Preparing => "preparing",
            OrderState::Ready => "ready",
            OrderState::Completed => "completed",
            OrderState::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderState {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderState::Pending),
            "preparing" => Ok(OrderState::Preparing),
            "ready" => Ok(OrderState::Ready),
            "completed" => Ok(OrderState::Completed),
            "rejected" => Ok(OrderState::Rejected),
            other => Err(UnknownState(other.to_string())),
        }
    }
}

/// Error returned when parsing an unrecognized state name.
#[derive(Debug, thiserror::Error)]
#[error("unknown order state: {0}")]
pub struct UnknownState(pub String);
