//! Authenticated principal extraction.
//!
//! An upstream authentication layer verifies credentials and attaches the
//! principal to the request via trusted headers. Handlers trust these values
//! without re-verification; the gateway strips them from external traffic.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::ApiError;

/// Header carrying the verified user id (UUID).
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the verified user email.
pub const USER_EMAIL_HEADER: &str = "x-user-email";
/// Header carrying the verified user role.
pub const USER_ROLE_HEADER: &str = "x-user-role";

const ADMIN_ROLE: &str = "admin";

/// A verified identity attached by the upstream authentication layer.
#[derive(Debug, Clone)]
pub struct Principal {
    /// Stable user identifier.
    pub id: Uuid,
    /// Account email.
    pub email: String,
    /// Role, e.g. `customer`, `business_owner`, `admin`.
    pub role: String,
}

impl Principal {
    fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let header = |name: &str| headers.get(name)?.to_str().ok();
        let id: Uuid = header(USER_ID_HEADER)?.parse().ok()?;
        let email = header(USER_EMAIL_HEADER)?.to_owned();
        let role = header(USER_ROLE_HEADER)?.to_owned();
        Some(Self { id, email, role })
    }
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_headers(&parts.headers).ok_or(ApiError::Unauthorized)
    }
}

/// A [`Principal`] that has been role-gated to `admin`.
#[derive(Debug, Clone)]
pub struct AdminPrincipal(pub Principal);

impl<S> FromRequestParts<S> for AdminPrincipal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let principal = Principal::from_request_parts(parts, state).await?;
        if principal.role == ADMIN_ROLE {
            Ok(Self(principal))
        } else {
            Err(ApiError::Forbidden)
        }
    }
}
