//! Cart endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::MenuItemId;
use fulfillment::CartView;
use order_store::OrderRepository;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub menu_item_id: MenuItemId,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: u32,
}

/// POST /cart/items — add an item, accumulating onto an existing line.
#[tracing::instrument(skip(state, req))]
pub async fn add_item<R: OrderRepository + Clone + 'static>(
    State(state): State<Arc<AppState<R>>>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CartView>>), ApiError> {
    let view = state
        .carts
        .add_item(user_id, req.menu_item_id, req.quantity)
        .await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(view)))
}

/// PUT /cart/items/:id — set a line's quantity (0 removes it).
#[tracing::instrument(skip(state, req))]
pub async fn set_quantity<R: OrderRepository + Clone + 'static>(
    State(state): State<Arc<AppState<R>>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<SetQuantityRequest>,
) -> Result<Json<ApiResponse<CartView>>, ApiError> {
    let view = state
        .carts
        .set_item_quantity(user_id, MenuItemId::from_uuid(id), req.quantity)
        .await?;
    Ok(ApiResponse::ok(view))
}

/// DELETE /cart/items/:id — remove a line.
#[tracing::instrument(skip(state))]
pub async fn remove_item<R: OrderRepository + Clone + 'static>(
    State(state): State<Arc<AppState<R>>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CartView>>, ApiError> {
    let view = state
        .carts
        .remove_item(user_id, MenuItemId::from_uuid(id))
        .await?;
    Ok(ApiResponse::ok(view))
}

/// DELETE /cart — empty the cart.
#[tracing::instrument(skip(state))]
pub async fn clear<R: OrderRepository + Clone + 'static>(
    State(state): State<Arc<AppState<R>>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.carts.clear(user_id).await?;
    Ok(ApiResponse::message("cart cleared"))
}

/// GET /cart — the cart joined with live catalog data.
#[tracing::instrument(skip(state))]
pub async fn read<R: OrderRepository + Clone + 'static>(
    State(state): State<Arc<AppState<R>>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ApiResponse<CartView>>, ApiError> {
    let view = state.carts.read(user_id).await?;
    Ok(ApiResponse::ok(view))
}
