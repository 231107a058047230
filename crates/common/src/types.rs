use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Defines a UUID-backed identifier newtype.
///
/// Wrapping the raw UUID gives type safety and prevents mixing up, say,
/// a user ID with a vendor ID at a call site.
macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

uuid_id! {
    /// Unique identifier for a user account.
    UserId
}

uuid_id! {
    /// Unique identifier for a vendor (stall/restaurant).
    VendorId
}

uuid_id! {
    /// Unique identifier for a menu item in the catalog.
    MenuItemId
}

uuid_id! {
    /// Unique identifier for an order.
    OrderId
}

/// Version number for an order record, used for optimistic concurrency control.
///
/// Versions start at 1 when the order is created and increment by 1 on
/// every successful update.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(i64);

impl Version {
    /// Creates a version from a raw value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the first version (1) assigned at creation.
    pub fn first() -> Self {
        Self(1)
    }

    /// Returns the next version.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw version value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Version {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Version> for i64 {
    fn from(version: Version) -> Self {
        version.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        assert_ne!(UserId::new(), UserId::new());
        assert_ne!(OrderId::new(), OrderId::new());
    }

    #[test]
    fn id_from_uuid_preserves_value() {
        let uuid = Uuid::new_v4();
        let id = VendorId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), uuid);
    }

    #[test]
    fn id_serialization_roundtrip() {
        let id = MenuItemId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: MenuItemId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn version_increments() {
        let v = Version::first();
        assert_eq!(v.as_i64(), 1);
        assert_eq!(v.next().as_i64(), 2);
    }

    #[test]
    fn version_ordering() {
        assert!(Version::new(2) > Version::first());
    }
}
