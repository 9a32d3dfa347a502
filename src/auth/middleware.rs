use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::app::AppState;
use crate::domain::Vendor;
use crate::error::ErrorResponse;

/// Extractor that requires an authenticated, non-blacklisted vendor.
///
/// Verifies the bearer token, loads the vendor record, and hands the full
/// record to the handler - so downstream code never re-fetches the caller
/// and never sees a blacklisted account.
///
/// Example:
/// ```ignore
/// async fn protected_route(auth: RequireVendor) -> impl IntoResponse {
///     format!("Hello, {}", auth.company_name)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireVendor(pub Vendor);

impl std::ops::Deref for RequireVendor {
    type Target = Vendor;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidFormat,
    InvalidToken,
    /// Token verified but the vendor no longer exists.
    UnknownVendor,
    /// Vendor is blacklisted.
    Suspended,
    /// The vendor store could not be reached.
    Unavailable,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AuthError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Missing authorization token",
            ),
            AuthError::InvalidFormat => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Invalid authorization format",
            ),
            AuthError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Invalid or expired token",
            ),
            AuthError::UnknownVendor => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Token no longer matches a registered vendor",
            ),
            AuthError::Suspended => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Account suspended. Please contact support",
            ),
            AuthError::Unavailable => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred",
            ),
        };

        let body = ErrorResponse {
            code: code.to_string(),
            message: message.to_string(),
            details: None,
            retryable: None,
            request_id: None,
        };

        (status, Json(body)).into_response()
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RequireVendor {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        // Extract Authorization header
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingToken)?
            .to_str()
            .map_err(|_| AuthError::InvalidFormat)?;

        // Parse Bearer token
        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidFormat)?;

        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        // Verify signature and expiry
        let claims = state.tokens.verify(token).map_err(|e| {
            tracing::warn!(error = %e, "Token verification failed");
            AuthError::InvalidToken
        })?;

        let vendor_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;

        // The token is only as good as the vendor behind it: the record may
        // have been removed or blacklisted since issuance.
        let vendor = state
            .vendors
            .find_by_id(vendor_id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Vendor lookup failed during auth");
                AuthError::Unavailable
            })?
            .ok_or(AuthError::UnknownVendor)?;

        if vendor.blacklisted {
            return Err(AuthError::Suspended);
        }

        Ok(RequireVendor(vendor))
    }
}
