//! Shared types for the hawkr marketplace.

mod types;

pub use types::{MenuItemId, OrderId, UserId, VendorId, Version};
