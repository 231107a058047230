//! Domain layer for the hawkr food-ordering marketplace.
//!
//! This crate provides the core domain model:
//! - Order aggregate with its fulfillment state machine and pickup token
//! - Cart with the single-vendor consistency rule
//! - Catalog collaborator boundary (menu items are read, never written)

pub mod cart;
pub mod catalog;
pub mod order;

pub use cart::{Cart, CartError, CartLine};
pub use catalog::{Catalog, CatalogError, InMemoryCatalog, MenuItem};
pub use order::{Money, NewOrder, Order, OrderError, OrderLine, OrderState, PickupToken};
