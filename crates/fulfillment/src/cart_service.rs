//! Cart operations joined with live catalog data.

use std::sync::Arc;

use common::{MenuItemId, UserId, VendorId};
use domain::{Catalog, MenuItem, Money};
use order_store::CartStore;
use serde::Serialize;

use crate::error::FulfillmentError;

/// A cart line joined with current catalog data for display.
///
/// Price and availability are live; stored quantities are never mutated
/// by a price change — prices are only snapshotted at checkout.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    pub menu_item_id: MenuItemId,
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
    pub picture: Option<String>,
    pub is_available: bool,
    pub line_total: Money,
}

/// A user's cart as presented to the client.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub user_id: UserId,
    pub vendor_id: Option<VendorId>,
    pub lines: Vec<CartLineView>,
    pub total: Money,
}

/// Service for the user's cart.
#[derive(Clone)]
pub struct CartService {
    carts: Arc<dyn CartStore>,
    catalog: Arc<dyn Catalog>,
}

impl CartService {
    /// Creates a new cart service.
    pub fn new(carts: Arc<dyn CartStore>, catalog: Arc<dyn Catalog>) -> Self {
        Self { carts, catalog }
    }

    /// Adds an item to the cart, accumulating quantity onto an existing line.
    #[tracing::instrument(skip(self))]
    pub async fn add_item(
        &self,
        user_id: UserId,
        menu_item_id: MenuItemId,
        quantity: u32,
    ) -> Result<CartView, FulfillmentError> {
        let item = self.lookup(menu_item_id).await?;
        let mut cart = self.carts.load(user_id).await?;
        cart.add_item(&item, quantity)?;
        self.carts.save(cart).await?;
        self.read(user_id).await
    }

    /// Sets an item's quantity, replacing any existing value; 0 removes the line.
    #[tracing::instrument(skip(self))]
    pub async fn set_item_quantity(
        &self,
        user_id: UserId,
        menu_item_id: MenuItemId,
        quantity: u32,
    ) -> Result<CartView, FulfillmentError> {
        let mut cart = self.carts.load(user_id).await?;

        if quantity == 0 {
            // Removal needs no catalog lookup, and an absent line is fine.
            if cart.quantity_of(menu_item_id).is_some() {
                cart.remove_item(menu_item_id)?;
            }
        } else {
            let item = self.lookup(menu_item_id).await?;
            cart.set_item_quantity(&item, quantity)?;
        }

        self.carts.save(cart).await?;
        self.read(user_id).await
    }

    /// Removes a line from the cart.
    #[tracing::instrument(skip(self))]
    pub async fn remove_item(
        &self,
        user_id: UserId,
        menu_item_id: MenuItemId,
    ) -> Result<CartView, FulfillmentError> {
        let mut cart = self.carts.load(user_id).await?;
        cart.remove_item(menu_item_id)?;
        self.carts.save(cart).await?;
        self.read(user_id).await
    }

    /// Empties the cart.
    ///
    /// Must succeed even when racing an add; the store resolves those
    /// last-writer-wins.
    #[tracing::instrument(skip(self))]
    pub async fn clear(&self, user_id: UserId) -> Result<(), FulfillmentError> {
        let mut cart = self.carts.load(user_id).await?;
        cart.clear();
        self.carts.save(cart).await?;
        Ok(())
    }

    /// Reads the cart joined with live catalog data.
    ///
    /// Lines whose item no longer resolves in the catalog are omitted from
    /// the view; checkout rejects them outright.
    #[tracing::instrument(skip(self))]
    pub async fn read(&self, user_id: UserId) -> Result<CartView, FulfillmentError> {
        let cart = self.carts.load(user_id).await?;

        let mut lines = Vec::with_capacity(cart.lines().len());
        let mut total = Money::zero();
        for line in cart.lines() {
            let Some(item) = self.catalog.item(line.menu_item_id).await? else {
                tracing::warn!(
                    menu_item_id = %line.menu_item_id,
                    "cart line references an unknown menu item; omitting from view"
                );
                continue;
            };
            let line_total = item.price.multiply(line.quantity);
            total += line_total;
            lines.push(CartLineView {
                menu_item_id: item.id,
                name: item.name,
                unit_price: item.price,
                quantity: line.quantity,
                picture: item.picture,
                is_available: item.is_available,
                line_total,
            });
        }

        Ok(CartView {
            user_id,
            vendor_id: cart.vendor_id(),
            lines,
            total,
        })
    }

    async fn lookup(&self, menu_item_id: MenuItemId) -> Result<MenuItem, FulfillmentError> {
        self.catalog
            .item(menu_item_id)
            .await?
            .ok_or(FulfillmentError::MenuItemNotFound(menu_item_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{CartError, InMemoryCatalog};
    use order_store::InMemoryCartStore;

    fn menu_item(vendor_id: VendorId, price_cents: i64) -> MenuItem {
        MenuItem {
            id: MenuItemId::new(),
            vendor_id,
            name: "Wonton Noodles".to_string(),
            price: Money::from_cents(price_cents),
            picture: None,
            is_available: true,
        }
    }

    fn service() -> (CartService, InMemoryCatalog) {
        let catalog = InMemoryCatalog::new();
        let service = CartService::new(
            Arc::new(InMemoryCartStore::new()),
            Arc::new(catalog.clone()),
        );
        (service, catalog)
    }

    #[tokio::test]
    async fn add_then_read_shows_live_prices() {
        let (service, catalog) = service();
        let user_id = UserId::new();
        let item = menu_item(VendorId::new(), 500);
        catalog.insert(item.clone());

        let view = service.add_item(user_id, item.id, 2).await.unwrap();
        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.total.cents(), 1000);

        // A later price change shows up on read without touching quantities.
        catalog.insert(MenuItem {
            price: Money::from_cents(600),
            ..item.clone()
        });
        let view = service.read(user_id).await.unwrap();
        assert_eq!(view.lines[0].quantity, 2);
        assert_eq!(view.lines[0].unit_price.cents(), 600);
        assert_eq!(view.total.cents(), 1200);
    }

    #[tokio::test]
    async fn unknown_item_cannot_be_added() {
        let (service, _catalog) = service();
        let result = service
            .add_item(UserId::new(), MenuItemId::new(), 1)
            .await;
        assert!(matches!(
            result,
            Err(FulfillmentError::MenuItemNotFound(_))
        ));
    }

    #[tokio::test]
    async fn cross_vendor_add_is_rejected() {
        let (service, catalog) = service();
        let user_id = UserId::new();
        let first = menu_item(VendorId::new(), 500);
        let second = menu_item(VendorId::new(), 700);
        catalog.insert(first.clone());
        catalog.insert(second.clone());

        service.add_item(user_id, first.id, 1).await.unwrap();
        let result = service.add_item(user_id, second.id, 1).await;
        assert!(matches!(
            result,
            Err(FulfillmentError::Cart(CartError::CrossVendorConflict { .. }))
        ));

        let view = service.read(user_id).await.unwrap();
        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.vendor_id, Some(first.vendor_id));
    }

    #[tokio::test]
    async fn set_zero_removes_line() {
        let (service, catalog) = service();
        let user_id = UserId::new();
        let item = menu_item(VendorId::new(), 500);
        catalog.insert(item.clone());

        service.add_item(user_id, item.id, 2).await.unwrap();
        let view = service
            .set_item_quantity(user_id, item.id, 0)
            .await
            .unwrap();
        assert!(view.lines.is_empty());
        assert!(view.vendor_id.is_none());
    }

    #[tokio::test]
    async fn set_replaces_quantity() {
        let (service, catalog) = service();
        let user_id = UserId::new();
        let item = menu_item(VendorId::new(), 500);
        catalog.insert(item.clone());

        service.add_item(user_id, item.id, 2).await.unwrap();
        let view = service
            .set_item_quantity(user_id, item.id, 5)
            .await
            .unwrap();
        assert_eq!(view.lines[0].quantity, 5);
    }

    #[tokio::test]
    async fn clear_empties_cart() {
        let (service, catalog) = service();
        let user_id = UserId::new();
        let item = menu_item(VendorId::new(), 500);
        catalog.insert(item.clone());

        service.add_item(user_id, item.id, 2).await.unwrap();
        service.clear(user_id).await.unwrap();

        let view = service.read(user_id).await.unwrap();
        assert!(view.lines.is_empty());
        assert!(view.vendor_id.is_none());
    }

    #[tokio::test]
    async fn dangling_lines_are_omitted_from_view() {
        let (service, catalog) = service();
        let user_id = UserId::new();
        let item = menu_item(VendorId::new(), 500);
        catalog.insert(item.clone());

        service.add_item(user_id, item.id, 1).await.unwrap();
        catalog.remove(item.id);

        let view = service.read(user_id).await.unwrap();
        assert!(view.lines.is_empty());
        assert_eq!(view.total.cents(), 0);
    }

    #[tokio::test]
    async fn catalog_outage_surfaces_as_upstream_failure() {
        let (service, catalog) = service();
        let user_id = UserId::new();
        let item = menu_item(VendorId::new(), 500);
        catalog.insert(item.clone());
        service.add_item(user_id, item.id, 1).await.unwrap();

        catalog.set_fail_lookups(true);
        let result = service.read(user_id).await;
        assert!(matches!(result, Err(FulfillmentError::Catalog(_))));
    }
}
