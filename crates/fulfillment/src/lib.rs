//! Cart operations and order fulfillment orchestration.
//!
//! [`CartService`] handles the user's cart (backed by the cart store and
//! joined with live catalog data); [`FulfillmentService`] turns carts into
//! orders at checkout and drives the vendor/pickup state transitions,
//! publishing a fan-out event for every accepted change.

pub mod cart_service;
pub mod error;
pub mod service;

pub use cart_service::{CartLineView, CartService, CartView};
pub use error::FulfillmentError;
pub use service::FulfillmentService;
