//! User order endpoints: checkout, listing, payment proof.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::OrderId;
use domain::{Order, OrderState};
use order_store::{ListOptions, OrderRepository, SortBy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;

// -- Request types --

#[derive(Deserialize)]
pub struct PaymentProofRequest {
    /// Reference to the uploaded proof image, as returned by the upload layer.
    pub proof_ref: String,
}

/// Query parameters shared by the user and vendor listing endpoints.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub sort_by: Option<SortBy>,
    pub state: Option<OrderState>,
}

impl From<ListQuery> for ListOptions {
    fn from(query: ListQuery) -> Self {
        ListOptions {
            sort_by: query.sort_by.unwrap_or_default(),
            state: query.state,
        }
    }
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderLineResponse {
    pub menu_item_id: String,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: u32,
    pub picture: Option<String>,
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub order_number: i64,
    pub user_id: String,
    pub vendor_id: String,
    pub state: OrderState,
    pub items: Vec<OrderLineResponse>,
    pub total_cents: i64,
    pub payment_proof: Option<String>,
    pub qr_token: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id().to_string(),
            order_number: order.order_number(),
            user_id: order.user_id().to_string(),
            vendor_id: order.vendor_id().to_string(),
            state: order.state(),
            items: order
                .items()
                .iter()
                .map(|line| OrderLineResponse {
                    menu_item_id: line.menu_item_id.to_string(),
                    name: line.name.clone(),
                    unit_price_cents: line.unit_price.cents(),
                    quantity: line.quantity,
                    picture: line.picture.clone(),
                })
                .collect(),
            total_cents: order.total().cents(),
            payment_proof: order.payment_proof().map(String::from),
            qr_token: order.qr_token().map(|t| t.as_str().to_string()),
            created_at: order.created_at().to_rfc3339(),
            updated_at: order.updated_at().to_rfc3339(),
        }
    }
}

// -- Handlers --

/// POST /orders — checkout: convert the cart into a pending order.
#[tracing::instrument(skip(state))]
pub async fn checkout<R: OrderRepository + Clone + 'static>(
    State(state): State<Arc<AppState<R>>>,
    AuthUser(user_id): AuthUser,
) -> Result<(StatusCode, Json<ApiResponse<OrderResponse>>), ApiError> {
    let order = state.fulfillment.checkout(user_id).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok((&order).into())))
}

/// GET /orders — list the user's orders with sorting and state filter.
#[tracing::instrument(skip(state))]
pub async fn list<R: OrderRepository + Clone + 'static>(
    State(state): State<Arc<AppState<R>>>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<OrderResponse>>>, ApiError> {
    let orders = state.orders.list_for_user(user_id, query.into()).await?;
    Ok(ApiResponse::ok(
        orders.iter().map(OrderResponse::from).collect(),
    ))
}

/// GET /orders/:id — load one of the user's orders.
#[tracing::instrument(skip(state))]
pub async fn get<R: OrderRepository + Clone + 'static>(
    State(state): State<Arc<AppState<R>>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<OrderResponse>>, ApiError> {
    let order = state
        .fulfillment
        .order_for_user(OrderId::from_uuid(id), user_id)
        .await?;
    Ok(ApiResponse::ok((&order).into()))
}

/// POST /orders/:id/payment-proof — attach the uploaded proof reference.
#[tracing::instrument(skip(state, req))]
pub async fn attach_payment_proof<R: OrderRepository + Clone + 'static>(
    State(state): State<Arc<AppState<R>>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<PaymentProofRequest>,
) -> Result<Json<ApiResponse<OrderResponse>>, ApiError> {
    let order = state
        .fulfillment
        .attach_payment_proof(OrderId::from_uuid(id), user_id, &req.proof_ref)
        .await?;
    Ok(ApiResponse::ok((&order).into()))
}
