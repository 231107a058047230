//! Response envelope convention.

use axum::Json;
use serde::Serialize;

/// The `{ success, data?, message? }` envelope wrapping every JSON response.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wraps a successful payload.
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            message: None,
        })
    }
}

impl ApiResponse<()> {
    /// A successful response carrying only a message.
    pub fn message(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            data: None,
            message: Some(message.into()),
        })
    }
}
