//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{CartError, OrderError};
use fulfillment::FulfillmentError;
use order_store::StoreError;

/// API-level error type that maps to HTTP responses.
///
/// Every failure renders as a non-2xx `{ "success": false, "message": … }`
/// envelope with `message` naming the error condition.
#[derive(Debug)]
pub enum ApiError {
    /// No trusted identity header was supplied.
    Unauthorized(String),
    /// Bad request from the client.
    BadRequest(String),
    /// The caller does not own the resource.
    Forbidden(String),
    /// Resource not found.
    NotFound(String),
    /// State-machine, cross-vendor, or concurrent-write conflict.
    Conflict(String),
    /// The presented pickup token is stale or invalid.
    Gone(String),
    /// A collaborator (catalog) is unreachable.
    UpstreamUnavailable(String),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Gone(msg) => (StatusCode::GONE, msg),
            ApiError::UpstreamUnavailable(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "success": false, "message": message });
        (status, axum::Json(body)).into_response()
    }
}

impl From<FulfillmentError> for ApiError {
    fn from(err: FulfillmentError) -> Self {
        let message = err.to_string();
        match err {
            FulfillmentError::Order(order_err) => match order_err {
                OrderError::InvalidTransition { .. } | OrderError::PaymentProofAlreadySet => {
                    ApiError::Conflict(message)
                }
                OrderError::NoItems
                | OrderError::MixedVendors
                | OrderError::InvalidQuantity { .. } => ApiError::BadRequest(message),
            },
            FulfillmentError::Cart(cart_err) => match cart_err {
                CartError::CrossVendorConflict { .. } => ApiError::Conflict(message),
                CartError::LineNotFound { .. } => ApiError::NotFound(message),
                CartError::InvalidQuantity { .. } | CartError::ItemUnavailable { .. } => {
                    ApiError::BadRequest(message)
                }
            },
            FulfillmentError::Store(store_err) => store_error_to_response(store_err),
            FulfillmentError::Catalog(_) => ApiError::UpstreamUnavailable(message),
            FulfillmentError::EmptyCart => ApiError::BadRequest(message),
            FulfillmentError::MenuItemNotFound(_) => ApiError::NotFound(message),
            FulfillmentError::Forbidden(_) => ApiError::Forbidden(message),
            FulfillmentError::StaleOrInvalidToken => ApiError::Gone(message),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        store_error_to_response(err)
    }
}

fn store_error_to_response(err: StoreError) -> ApiError {
    let message = err.to_string();
    match err {
        StoreError::NotFound(_) | StoreError::TokenNotFound => ApiError::NotFound(message),
        StoreError::ConcurrentModification { .. } => ApiError::Conflict(message),
        StoreError::Database(_) | StoreError::Migration(_) | StoreError::Serialization(_) => {
            ApiError::Internal(message)
        }
    }
}
