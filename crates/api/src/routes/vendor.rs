//! Vendor queue endpoints: listing, transitions, pickup verification.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use common::OrderId;
use domain::PickupToken;
use order_store::OrderRepository;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthVendor;
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::routes::orders::{ListQuery, OrderResponse};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct VerifyPickupRequest {
    /// Raw token from the scanned QR code.
    pub token: String,
}

/// GET /vendor/orders — the vendor's order queue.
#[tracing::instrument(skip(state))]
pub async fn list<R: OrderRepository + Clone + 'static>(
    State(state): State<Arc<AppState<R>>>,
    AuthVendor(vendor_id): AuthVendor,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<OrderResponse>>>, ApiError> {
    let orders = state.orders.list_for_vendor(vendor_id, query.into()).await?;
    Ok(ApiResponse::ok(
        orders.iter().map(OrderResponse::from).collect(),
    ))
}

/// POST /vendor/orders/:id/accept — accept a pending order.
#[tracing::instrument(skip(state))]
pub async fn accept<R: OrderRepository + Clone + 'static>(
    State(state): State<Arc<AppState<R>>>,
    AuthVendor(vendor_id): AuthVendor,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderResponse>>, ApiError> {
    let order = state
        .fulfillment
        .accept(OrderId::from_uuid(id), vendor_id)
        .await?;
    Ok(ApiResponse::ok((&order).into()))
}

/// POST /vendor/orders/:id/reject — reject a pending order.
#[tracing::instrument(skip(state))]
pub async fn reject<R: OrderRepository + Clone + 'static>(
    State(state): State<Arc<AppState<R>>>,
    AuthVendor(vendor_id): AuthVendor,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderResponse>>, ApiError> {
    let order = state
        .fulfillment
        .reject(OrderId::from_uuid(id), vendor_id)
        .await?;
    Ok(ApiResponse::ok((&order).into()))
}

/// POST /vendor/orders/:id/ready — mark a preparing order ready.
#[tracing::instrument(skip(state))]
pub async fn ready<R: OrderRepository + Clone + 'static>(
    State(state): State<Arc<AppState<R>>>,
    AuthVendor(vendor_id): AuthVendor,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderResponse>>, ApiError> {
    let order = state
        .fulfillment
        .mark_ready(OrderId::from_uuid(id), vendor_id)
        .await?;
    Ok(ApiResponse::ok((&order).into()))
}

/// POST /vendor/orders/:id/complete — complete a ready order at the counter.
#[tracing::instrument(skip(state))]
pub async fn complete<R: OrderRepository + Clone + 'static>(
    State(state): State<Arc<AppState<R>>>,
    AuthVendor(vendor_id): AuthVendor,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderResponse>>, ApiError> {
    let order = state
        .fulfillment
        .complete(OrderId::from_uuid(id), vendor_id)
        .await?;
    Ok(ApiResponse::ok((&order).into()))
}

/// POST /vendor/pickup — verify a scanned pickup token.
///
/// The token itself is the capability; holding a live token is what
/// proves pickup eligibility, so no ownership check happens here.
#[tracing::instrument(skip(state, req))]
pub async fn verify_pickup<R: OrderRepository + Clone + 'static>(
    State(state): State<Arc<AppState<R>>>,
    AuthVendor(_vendor_id): AuthVendor,
    Json(req): Json<VerifyPickupRequest>,
) -> Result<Json<ApiResponse<OrderResponse>>, ApiError> {
    let token = PickupToken::from_raw(req.token);
    let order = state.fulfillment.verify_pickup(&token).await?;
    Ok(ApiResponse::ok((&order).into()))
}
