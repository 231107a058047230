use common::{OrderId, Version};
use thiserror::Error;

/// Errors that can occur when interacting with the order store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The order was not found.
    #[error("order not found: {0}")]
    NotFound(OrderId),

    /// No order holds the presented pickup token.
    #[error("no order holds the presented pickup token")]
    TokenNotFound,

    /// The stored version did not match the version the caller read.
    /// A losing writer must re-read and retry or surface the conflict.
    #[error(
        "concurrent modification of order {order_id}: expected version {expected}, found {actual}"
    )]
    ConcurrentModification {
        order_id: OrderId,
        expected: Version,
        actual: Version,
    },

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
