//! Order aggregate and related types.

mod aggregate;
mod state;
mod token;
mod value_objects;

pub use aggregate::{NewOrder, Order};
pub use state::{OrderState, UnknownState};
pub use token::PickupToken;
pub use value_objects::{Money, OrderLine};

use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Order would have no items.
    #[error("order has no items")]
    NoItems,

    /// Order items belong to more than one vendor.
    #[error("order items span multiple vendors")]
    MixedVendors,

    /// Invalid quantity.
    #[error("invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },

    /// Order is not in the expected state for the requested action.
    #[error("invalid state transition: cannot {action} from {current_state} state")]
    InvalidTransition {
        current_state: OrderState,
        action: &'static str,
    },

    /// Payment proof may only be attached once.
    #[error("payment proof already attached")]
    PaymentProofAlreadySet,
}
