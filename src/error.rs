//! Unified API error handling
//!
//! One error surface for every endpoint, mapping the domain taxonomy
//! (validation, invalid state, conflict, not found, upstream commit
//! failure) to status codes and a stable JSON envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::services::ledger::LedgerError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed input. Carries one message per problem.
    #[error("Validation failed")]
    Validation(Vec<String>),

    /// The resource exists but its lifecycle state forbids the operation.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The operation would duplicate something that must be unique.
    /// Surfaced as 400, matching the rest of the client-error taxonomy.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The external commit ledger failed or timed out.
    #[error("External commit failed")]
    Upstream(#[from] LedgerError),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("Storage error")]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(anyhow::anyhow!(msg.into()))
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    /// Per-field problems for validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
    /// Set for upstream failures: whether resubmitting later could succeed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) | Self::InvalidState(_) | Self::Conflict(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            // A unique violation that slipped past a pre-check is still a
            // client-visible conflict, not a server fault.
            Self::Store(StoreError::UniqueViolation(_)) => StatusCode::BAD_REQUEST,
            Self::Internal(_) | Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidState(_) => "INVALID_STATE",
            Self::Conflict(_) | Self::Store(StoreError::UniqueViolation(_)) => "CONFLICT",
            Self::Upstream(_) => "UPSTREAM_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Store(_) => "STORAGE_ERROR",
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::NotFound(msg)
            | Self::InvalidState(msg)
            | Self::Conflict(msg) => msg.clone(),
            Self::Validation(_) => "Validation failed".to_string(),
            Self::Upstream(e) => format!("External commit failed: {e}"),
            Self::Store(StoreError::UniqueViolation(_)) => {
                "A conflicting record already exists".to_string()
            }
            // Don't leak internal error details
            Self::Internal(_) | Self::Store(_) => "An internal error occurred".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Log internal errors
        match &self {
            Self::Internal(e) => {
                tracing::error!(error = ?e, "Internal server error");
            }
            Self::Store(StoreError::UniqueViolation(_)) => {
                tracing::warn!(error = %self, "Conflicting write rejected by constraint");
            }
            Self::Store(e) => {
                tracing::error!(error = ?e, "Storage error");
            }
            Self::Upstream(e) => {
                tracing::error!(error = %e, retryable = e.is_retryable(), "Ledger commit failed");
            }
            _ => {
                tracing::warn!(error = %self, "API error");
            }
        }

        let status = self.status_code();
        let details = match &self {
            Self::Validation(problems) => Some(problems.clone()),
            _ => None,
        };
        let retryable = match &self {
            Self::Upstream(e) => Some(e.is_retryable()),
            _ => None,
        };
        let body = ErrorResponse {
            code: self.error_code().to_string(),
            message: self.public_message(),
            details,
            retryable,
            request_id: None, // populated by middleware when available
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn client_taxonomy_maps_to_400() {
        assert_eq!(
            ApiError::Validation(vec!["x".into()]).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::invalid_state("closed").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::conflict("dup").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Store(StoreError::UniqueViolation("bids_tender_vendor_key".into()))
                .status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn upstream_maps_to_502_and_flags_retryability() {
        let err = ApiError::Upstream(LedgerError::Timeout(Duration::from_secs(5)));
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.error_code(), "UPSTREAM_ERROR");

        let fatal = ApiError::Upstream(LedgerError::Rejected("no".into()));
        assert_eq!(fatal.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn internal_errors_do_not_leak() {
        let err = ApiError::internal("pool exhausted on shard 7");
        assert_eq!(err.public_message(), "An internal error occurred");
    }
}
