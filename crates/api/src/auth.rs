//! Identity extraction.
//!
//! Authentication itself lives in an upstream gateway; the core trusts
//! the identity headers it forwards and does not re-validate credentials.

use axum::http::request::Parts;
use axum::extract::FromRequestParts;
use common::{UserId, VendorId};
use uuid::Uuid;

use crate::error::ApiError;

/// Header carrying the authenticated user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the authenticated vendor id.
pub const VENDOR_ID_HEADER: &str = "x-vendor-id";

/// The authenticated user, extracted from [`USER_ID_HEADER`].
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub UserId);

/// The authenticated vendor, extracted from [`VENDOR_ID_HEADER`].
#[derive(Debug, Clone, Copy)]
pub struct AuthVendor(pub VendorId);

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parse_identity(parts, USER_ID_HEADER).map(|uuid| AuthUser(UserId::from_uuid(uuid)))
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AuthVendor {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parse_identity(parts, VENDOR_ID_HEADER).map(|uuid| AuthVendor(VendorId::from_uuid(uuid)))
    }
}

fn parse_identity(parts: &Parts, header: &str) -> Result<Uuid, ApiError> {
    let value = parts
        .headers
        .get(header)
        .ok_or_else(|| ApiError::Unauthorized(format!("missing {header} header")))?;
    let raw = value
        .to_str()
        .map_err(|_| ApiError::Unauthorized(format!("unreadable {header} header")))?;
    Uuid::parse_str(raw).map_err(|e| ApiError::Unauthorized(format!("invalid {header}: {e}")))
}
