//! Cart model with the single-vendor consistency rule.

use common::{MenuItemId, UserId, VendorId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::MenuItem;

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Invalid quantity.
    #[error("invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },

    /// Cart already holds items from a different vendor.
    #[error("cart already contains items from another vendor")]
    CrossVendorConflict {
        cart_vendor: VendorId,
        item_vendor: VendorId,
    },

    /// The referenced line is not in the cart.
    #[error("item {menu_item_id} is not in the cart")]
    LineNotFound { menu_item_id: MenuItemId },

    /// The menu item is currently not orderable.
    #[error("item {menu_item_id} is currently unavailable")]
    ItemUnavailable { menu_item_id: MenuItemId },
}

/// One cart line: a menu item reference and a quantity.
///
/// Carts store only the reference; price and name are joined from the
/// live catalog on read and snapshotted at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub menu_item_id: MenuItemId,
    pub quantity: u32,
}

/// A user's cart.
///
/// Invariant: all lines reference items of `vendor_id`, and `vendor_id`
/// is `None` exactly when the cart is empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    user_id: UserId,
    vendor_id: Option<VendorId>,
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates an empty cart for a user.
    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            vendor_id: None,
            lines: Vec::new(),
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn vendor_id(&self) -> Option<VendorId> {
        self.vendor_id
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns the stored quantity for an item, if present.
    pub fn quantity_of(&self, menu_item_id: MenuItemId) -> Option<u32> {
        self.lines
            .iter()
            .find(|l| l.menu_item_id == menu_item_id)
            .map(|l| l.quantity)
    }

    /// Adds an item, accumulating quantity onto an existing line.
    ///
    /// This is the add-to-cart path from an item details page: adding the
    /// same item twice increments rather than replaces.
    pub fn add_item(&mut self, item: &MenuItem, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity { quantity });
        }
        self.check_vendor(item)?;

        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.menu_item_id == item.id)
        {
            line.quantity += quantity;
        } else {
            self.lines.push(CartLine {
                menu_item_id: item.id,
                quantity,
            });
        }
        self.vendor_id = Some(item.vendor_id);
        Ok(())
    }

    /// Sets an item's quantity, replacing any existing value.
    ///
    /// This is the edit-quantity path from the cart view. A quantity of 0
    /// removes the line; an absent line is upserted.
    pub fn set_item_quantity(&mut self, item: &MenuItem, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            // Tolerate setting an absent line to zero; the end state is the same.
            if self.quantity_of(item.id).is_some() {
                self.remove_item(item.id)?;
            }
            return Ok(());
        }
        self.check_vendor(item)?;

        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.menu_item_id == item.id)
        {
            line.quantity = quantity;
        } else {
            self.lines.push(CartLine {
                menu_item_id: item.id,
                quantity,
            });
        }
        self.vendor_id = Some(item.vendor_id);
        Ok(())
    }

    /// Removes a line; clears the vendor binding when the last line goes.
    pub fn remove_item(&mut self, menu_item_id: MenuItemId) -> Result<(), CartError> {
        let before = self.lines.len();
        self.lines.retain(|l| l.menu_item_id != menu_item_id);
        if self.lines.len() == before {
            return Err(CartError::LineNotFound { menu_item_id });
        }
        if self.lines.is_empty() {
            self.vendor_id = None;
        }
        Ok(())
    }

    /// Empties the cart and clears the vendor binding.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.vendor_id = None;
    }

    fn check_vendor(&self, item: &MenuItem) -> Result<(), CartError> {
        if !item.is_available {
            return Err(CartError::ItemUnavailable {
                menu_item_id: item.id,
            });
        }
        if let Some(cart_vendor) = self.vendor_id
            && cart_vendor != item.vendor_id
        {
            return Err(CartError::CrossVendorConflict {
                cart_vendor,
                item_vendor: item.vendor_id,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::Money;

    fn item(vendor_id: VendorId) -> MenuItem {
        MenuItem {
            id: MenuItemId::new(),
            vendor_id,
            name: "Satay".to_string(),
            price: Money::from_cents(120),
            picture: None,
            is_available: true,
        }
    }

    #[test]
    fn empty_cart_has_no_vendor() {
        let cart = Cart::empty(UserId::new());
        assert!(cart.is_empty());
        assert!(cart.vendor_id().is_none());
    }

    #[test]
    fn first_add_binds_vendor() {
        let mut cart = Cart::empty(UserId::new());
        let vendor_id = VendorId::new();
        cart.add_item(&item(vendor_id), 2).unwrap();
        assert_eq!(cart.vendor_id(), Some(vendor_id));
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn add_accumulates_quantity() {
        let mut cart = Cart::empty(UserId::new());
        let it = item(VendorId::new());
        cart.add_item(&it, 2).unwrap();
        cart.add_item(&it, 3).unwrap();
        assert_eq!(cart.quantity_of(it.id), Some(5));
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn set_replaces_quantity() {
        let mut cart = Cart::empty(UserId::new());
        let it = item(VendorId::new());
        cart.add_item(&it, 2).unwrap();
        cart.set_item_quantity(&it, 7).unwrap();
        assert_eq!(cart.quantity_of(it.id), Some(7));
    }

    #[test]
    fn set_zero_removes_line() {
        let mut cart = Cart::empty(UserId::new());
        let it = item(VendorId::new());
        cart.add_item(&it, 2).unwrap();
        cart.set_item_quantity(&it, 0).unwrap();
        assert!(cart.is_empty());
        assert!(cart.vendor_id().is_none());
    }

    #[test]
    fn set_upserts_missing_line() {
        let mut cart = Cart::empty(UserId::new());
        let it = item(VendorId::new());
        cart.set_item_quantity(&it, 4).unwrap();
        assert_eq!(cart.quantity_of(it.id), Some(4));
    }

    #[test]
    fn add_zero_quantity_fails() {
        let mut cart = Cart::empty(UserId::new());
        let result = cart.add_item(&item(VendorId::new()), 0);
        assert!(matches!(
            result,
            Err(CartError::InvalidQuantity { quantity: 0 })
        ));
    }

    #[test]
    fn cross_vendor_add_fails_and_leaves_cart_unchanged() {
        let mut cart = Cart::empty(UserId::new());
        let vendor_one = VendorId::new();
        let first = item(vendor_one);
        cart.add_item(&first, 1).unwrap();

        let result = cart.add_item(&item(VendorId::new()), 1);
        assert!(matches!(result, Err(CartError::CrossVendorConflict { .. })));
        assert_eq!(cart.vendor_id(), Some(vendor_one));
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.quantity_of(first.id), Some(1));
    }

    #[test]
    fn same_vendor_second_item_is_allowed() {
        let mut cart = Cart::empty(UserId::new());
        let vendor_id = VendorId::new();
        cart.add_item(&item(vendor_id), 1).unwrap();
        cart.add_item(&item(vendor_id), 2).unwrap();
        assert_eq!(cart.lines().len(), 2);
    }

    #[test]
    fn unavailable_item_is_rejected() {
        let mut cart = Cart::empty(UserId::new());
        let mut it = item(VendorId::new());
        it.is_available = false;
        let result = cart.add_item(&it, 1);
        assert!(matches!(result, Err(CartError::ItemUnavailable { .. })));
        assert!(cart.is_empty());
    }

    #[test]
    fn removing_last_line_clears_vendor() {
        let mut cart = Cart::empty(UserId::new());
        let it = item(VendorId::new());
        cart.add_item(&it, 1).unwrap();
        cart.remove_item(it.id).unwrap();
        assert!(cart.is_empty());
        assert!(cart.vendor_id().is_none());
    }

    #[test]
    fn removing_unknown_line_fails() {
        let mut cart = Cart::empty(UserId::new());
        let result = cart.remove_item(MenuItemId::new());
        assert!(matches!(result, Err(CartError::LineNotFound { .. })));
    }

    #[test]
    fn clear_empties_cart() {
        let mut cart = Cart::empty(UserId::new());
        cart.add_item(&item(VendorId::new()), 3).unwrap();
        cart.clear();
        assert!(cart.is_empty());
        assert!(cart.vendor_id().is_none());
    }

    #[test]
    fn vendor_can_be_rebound_after_clear() {
        let mut cart = Cart::empty(UserId::new());
        cart.add_item(&item(VendorId::new()), 1).unwrap();
        cart.clear();

        let other_vendor = VendorId::new();
        cart.add_item(&item(other_vendor), 1).unwrap();
        assert_eq!(cart.vendor_id(), Some(other_vendor));
    }
}
