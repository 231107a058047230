//! Order aggregate implementation.

use chrono::{DateTime, Utc};
use common::{OrderId, UserId, VendorId, Version};
use serde::{Deserialize, Serialize};

use crate::catalog::MenuItem;

use super::{Money, OrderError, OrderLine, OrderState, PickupToken};

/// A validated order request: a non-empty, single-vendor item selection.
///
/// This is what checkout produces before the repository assigns an id and
/// order number. Item name, price, and picture are snapshotted here.
#[derive(Debug, Clone)]
pub struct NewOrder {
    user_id: UserId,
    vendor_id: VendorId,
    items: Vec<OrderLine>,
}

impl NewOrder {
    /// Builds a new order from a menu-item selection.
    ///
    /// Fails if the selection is empty, contains a zero quantity, or spans
    /// more than one vendor.
    pub fn from_selection(
        user_id: UserId,
        selection: Vec<(MenuItem, u32)>,
    ) -> Result<Self, OrderError> {
        let Some((first, _)) = selection.first() else {
            return Err(OrderError::NoItems);
        };
        let vendor_id = first.vendor_id;

        let mut items = Vec::with_capacity(selection.len());
        for (item, quantity) in selection {
            if quantity == 0 {
                return Err(OrderError::InvalidQuantity { quantity });
            }
            if item.vendor_id != vendor_id {
                return Err(OrderError::MixedVendors);
            }
            items.push(OrderLine {
                menu_item_id: item.id,
                name: item.name,
                unit_price: item.price,
                quantity,
                picture: item.picture,
            });
        }

        Ok(Self {
            user_id,
            vendor_id,
            items,
        })
    }

    /// Returns the ordering user.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the vendor all items belong to.
    pub fn vendor_id(&self) -> VendorId {
        self.vendor_id
    }

    /// Returns the snapshotted lines.
    pub fn items(&self) -> &[OrderLine] {
        &self.items
    }

    /// Returns the order total (sum of line totals).
    pub fn total(&self) -> Money {
        self.items.iter().map(OrderLine::total).sum()
    }
}

/// Order aggregate root.
///
/// An order is created from a cart snapshot at checkout and then only ever
/// moves forward through the state machine in [`OrderState`]. Items are
/// immutable after creation; orders are retained as history, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    order_number: i64,
    user_id: UserId,
    vendor_id: VendorId,
    items: Vec<OrderLine>,
    state: OrderState,
    payment_proof: Option<String>,
    qr_token: Option<PickupToken>,
    version: Version,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Order {
    /// Creates a fresh pending order from a validated request.
    ///
    /// Called by repositories once an id and order number are assigned.
    pub fn create(id: OrderId, order_number: i64, new: NewOrder) -> Self {
        let now = Utc::now();
        Self {
            id,
            order_number,
            user_id: new.user_id,
            vendor_id: new.vendor_id,
            items: new.items,
            state: OrderState::Pending,
            payment_proof: None,
            qr_token: None,
            version: Version::first(),
            created_at: now,
            updated_at: now,
        }
    }
}

// Query methods
impl Order {
    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn order_number(&self) -> i64 {
        self.order_number
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn vendor_id(&self) -> VendorId {
        self.vendor_id
    }

    pub fn items(&self) -> &[OrderLine] {
        &self.items
    }

    pub fn state(&self) -> OrderState {
        self.state
    }

    pub fn payment_proof(&self) -> Option<&str> {
        self.payment_proof.as_deref()
    }

    pub fn qr_token(&self) -> Option<&PickupToken> {
        self.qr_token.as_ref()
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the order total (sum of line totals).
    pub fn total(&self) -> Money {
        self.items.iter().map(OrderLine::total).sum()
    }

    /// Returns true if the order is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}

// Transition methods
impl Order {
    /// Vendor accepts a pending order; issues the pickup token.
    pub fn accept(&mut self) -> Result<(), OrderError> {
        if !self.state.can_accept() {
            return Err(OrderError::InvalidTransition {
                current_state: self.state,
                action: "accept",
            });
        }
        self.state = OrderState::Preparing;
        self.qr_token = Some(PickupToken::generate());
        self.touch();
        Ok(())
    }

    /// Vendor rejects a pending order.
    pub fn reject(&mut self) -> Result<(), OrderError> {
        if !self.state.can_reject() {
            return Err(OrderError::InvalidTransition {
                current_state: self.state,
                action: "reject",
            });
        }
        self.state = OrderState::Rejected;
        self.touch();
        Ok(())
    }

    /// Vendor marks a preparing order ready for pickup; the token stays live.
    pub fn mark_ready(&mut self) -> Result<(), OrderError> {
        if !self.state.can_mark_ready() {
            return Err(OrderError::InvalidTransition {
                current_state: self.state,
                action: "mark ready",
            });
        }
        self.state = OrderState::Ready;
        self.touch();
        Ok(())
    }

    /// Completes a ready order; clears the single-use pickup token.
    pub fn complete(&mut self) -> Result<(), OrderError> {
        if !self.state.can_complete() {
            return Err(OrderError::InvalidTransition {
                current_state: self.state,
                action: "complete",
            });
        }
        self.state = OrderState::Completed;
        self.qr_token = None;
        self.touch();
        Ok(())
    }

    /// Attaches the payment-proof reference uploaded by the user.
    ///
    /// Allowed at most once, and only while the order is still pending.
    pub fn attach_payment_proof(
        &mut self,
        proof_ref: impl Into<String>,
    ) -> Result<(), OrderError> {
        if self.state != OrderState::Pending {
            return Err(OrderError::InvalidTransition {
                current_state: self.state,
                action: "attach payment proof",
            });
        }
        if self.payment_proof.is_some() {
            return Err(OrderError::PaymentProofAlreadySet);
        }
        self.payment_proof = Some(proof_ref.into());
        self.touch();
        Ok(())
    }

    /// Sets the record version after a successful repository write.
    pub fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::MenuItemId;

    fn menu_item(vendor_id: VendorId, price_cents: i64) -> MenuItem {
        MenuItem {
            id: MenuItemId::new(),
            vendor_id,
            name: "Chicken Rice".to_string(),
            price: Money::from_cents(price_cents),
            picture: Some("menu/chicken-rice.jpg".to_string()),
            is_available: true,
        }
    }

    fn pending_order() -> Order {
        let vendor_id = VendorId::new();
        let new = NewOrder::from_selection(
            UserId::new(),
            vec![(menu_item(vendor_id, 450), 2), (menu_item(vendor_id, 600), 1)],
        )
        .unwrap();
        Order::create(OrderId::new(), 1, new)
    }

    #[test]
    fn empty_selection_fails() {
        let result = NewOrder::from_selection(UserId::new(), vec![]);
        assert!(matches!(result, Err(OrderError::NoItems)));
    }

    #[test]
    fn mixed_vendor_selection_fails() {
        let result = NewOrder::from_selection(
            UserId::new(),
            vec![
                (menu_item(VendorId::new(), 450), 1),
                (menu_item(VendorId::new(), 600), 1),
            ],
        );
        assert!(matches!(result, Err(OrderError::MixedVendors)));
    }

    #[test]
    fn zero_quantity_fails() {
        let vendor_id = VendorId::new();
        let result =
            NewOrder::from_selection(UserId::new(), vec![(menu_item(vendor_id, 450), 0)]);
        assert!(matches!(
            result,
            Err(OrderError::InvalidQuantity { quantity: 0 })
        ));
    }

    #[test]
    fn selection_snapshots_item_fields() {
        let vendor_id = VendorId::new();
        let item = menu_item(vendor_id, 450);
        let item_id = item.id;
        let new = NewOrder::from_selection(UserId::new(), vec![(item, 2)]).unwrap();

        assert_eq!(new.vendor_id(), vendor_id);
        assert_eq!(new.items().len(), 1);
        let line = &new.items()[0];
        assert_eq!(line.menu_item_id, item_id);
        assert_eq!(line.name, "Chicken Rice");
        assert_eq!(line.unit_price.cents(), 450);
        assert_eq!(line.picture.as_deref(), Some("menu/chicken-rice.jpg"));
        assert_eq!(new.total().cents(), 900);
    }

    #[test]
    fn created_order_is_pending_without_token() {
        let order = pending_order();
        assert_eq!(order.state(), OrderState::Pending);
        assert!(order.qr_token().is_none());
        assert!(order.payment_proof().is_none());
        assert_eq!(order.version(), Version::first());
        assert_eq!(order.total().cents(), 1500);
    }

    #[test]
    fn accept_issues_token() {
        let mut order = pending_order();
        order.accept().unwrap();
        assert_eq!(order.state(), OrderState::Preparing);
        assert!(order.qr_token().is_some());
    }

    #[test]
    fn tokens_differ_between_orders() {
        let mut a = pending_order();
        let mut b = pending_order();
        a.accept().unwrap();
        b.accept().unwrap();
        assert_ne!(a.qr_token(), b.qr_token());
    }

    #[test]
    fn reject_is_terminal() {
        let mut order = pending_order();
        order.reject().unwrap();
        assert_eq!(order.state(), OrderState::Rejected);
        assert!(order.is_terminal());
    }

    #[test]
    fn mark_ready_keeps_token() {
        let mut order = pending_order();
        order.accept().unwrap();
        let token = order.qr_token().cloned();
        order.mark_ready().unwrap();
        assert_eq!(order.state(), OrderState::Ready);
        assert_eq!(order.qr_token().cloned(), token);
    }

    #[test]
    fn complete_clears_token() {
        let mut order = pending_order();
        order.accept().unwrap();
        order.mark_ready().unwrap();
        order.complete().unwrap();
        assert_eq!(order.state(), OrderState::Completed);
        assert!(order.qr_token().is_none());
    }

    #[test]
    fn cannot_skip_from_pending_to_ready() {
        let mut order = pending_order();
        let result = order.mark_ready();
        assert!(matches!(
            result,
            Err(OrderError::InvalidTransition {
                current_state: OrderState::Pending,
                ..
            })
        ));
        assert_eq!(order.state(), OrderState::Pending);
    }

    #[test]
    fn cannot_reject_once_preparing() {
        let mut order = pending_order();
        order.accept().unwrap();
        let result = order.reject();
        assert!(matches!(result, Err(OrderError::InvalidTransition { .. })));
        assert_eq!(order.state(), OrderState::Preparing);
    }

    #[test]
    fn terminal_states_admit_no_transitions() {
        let mut order = pending_order();
        order.reject().unwrap();
        assert!(order.accept().is_err());
        assert!(order.mark_ready().is_err());
        assert!(order.complete().is_err());
        assert_eq!(order.state(), OrderState::Rejected);
    }

    #[test]
    fn payment_proof_attaches_once_while_pending() {
        let mut order = pending_order();
        order.attach_payment_proof("proofs/transfer-001.jpg").unwrap();
        assert_eq!(order.payment_proof(), Some("proofs/transfer-001.jpg"));

        let again = order.attach_payment_proof("proofs/transfer-002.jpg");
        assert!(matches!(again, Err(OrderError::PaymentProofAlreadySet)));
        assert_eq!(order.payment_proof(), Some("proofs/transfer-001.jpg"));
    }

    #[test]
    fn payment_proof_rejected_after_accept() {
        let mut order = pending_order();
        order.accept().unwrap();
        let result = order.attach_payment_proof("proofs/late.jpg");
        assert!(matches!(result, Err(OrderError::InvalidTransition { .. })));
    }

    #[test]
    fn serialization_roundtrip() {
        let mut order = pending_order();
        order.accept().unwrap();
        let json = serde_json::to_string(&order).unwrap();
        let restored: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.id(), order.id());
        assert_eq!(restored.state(), OrderState::Preparing);
        assert_eq!(restored.qr_token(), order.qr_token());
        assert_eq!(restored.total(), order.total());
    }
}
