//! HTTP API server for the hawkr food-ordering marketplace.
//!
//! Exposes the cart, checkout, vendor-queue, and pickup-verification
//! endpoints plus the JSON-lines event streams, with structured logging
//! (tracing) and Prometheus metrics.

pub mod auth;
pub mod config;
pub mod error;
pub mod response;
pub mod routes;
pub mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{delete, get, post, put};
use domain::{Catalog, InMemoryCatalog};
use fanout::EventHub;
use fulfillment::{CartService, FulfillmentService};
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::{CartStore, InMemoryCartStore, OrderRepository};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<R: OrderRepository + Clone + 'static>(
    state: Arc<AppState<R>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/cart", get(routes::cart::read::<R>))
        .route("/cart", delete(routes::cart::clear::<R>))
        .route("/cart/items", post(routes::cart::add_item::<R>))
        .route("/cart/items/{id}", put(routes::cart::set_quantity::<R>))
        .route("/cart/items/{id}", delete(routes::cart::remove_item::<R>))
        .route("/orders", post(routes::orders::checkout::<R>))
        .route("/orders", get(routes::orders::list::<R>))
        .route("/orders/{id}", get(routes::orders::get::<R>))
        .route(
            "/orders/{id}/payment-proof",
            post(routes::orders::attach_payment_proof::<R>),
        )
        .route("/users/orders/events", get(routes::events::user_events::<R>))
        .route("/vendor/orders", get(routes::vendor::list::<R>))
        .route("/vendor/orders/{id}/accept", post(routes::vendor::accept::<R>))
        .route("/vendor/orders/{id}/reject", post(routes::vendor::reject::<R>))
        .route("/vendor/orders/{id}/ready", post(routes::vendor::ready::<R>))
        .route(
            "/vendor/orders/{id}/complete",
            post(routes::vendor::complete::<R>),
        )
        .route("/vendor/pickup", post(routes::vendor::verify_pickup::<R>))
        .route(
            "/vendor/orders/events",
            get(routes::events::vendor_events::<R>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the default application state around the given order repository.
///
/// Carts are always in-memory (session-scoped working state); the catalog
/// handle is returned so callers can seed menu items.
pub fn create_default_state<R: OrderRepository + Clone + 'static>(
    orders: R,
    reconcile_interval: Duration,
) -> (Arc<AppState<R>>, InMemoryCatalog) {
    let catalog = InMemoryCatalog::new();
    let catalog_handle: Arc<dyn Catalog> = Arc::new(catalog.clone());
    let cart_store: Arc<dyn CartStore> = Arc::new(InMemoryCartStore::new());
    let hub = EventHub::new();

    let state = Arc::new(AppState {
        carts: CartService::new(cart_store.clone(), catalog_handle.clone()),
        fulfillment: FulfillmentService::new(
            orders.clone(),
            cart_store,
            catalog_handle,
            hub.clone(),
        ),
        orders,
        hub,
        reconcile_interval,
    });

    (state, catalog)
}
