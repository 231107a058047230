//! Pickup token capability.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque, single-use capability string proving pickup eligibility.
///
/// The token is random (128 bits) rather than derived from the order id,
/// so holding an order id never grants pickup rights. It is issued when
/// the vendor accepts an order and cleared when the pickup is verified.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PickupToken(String);

impl PickupToken {
    /// Generates a fresh random token.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Wraps a raw token string, e.g. one presented by a QR scanner.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PickupToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
