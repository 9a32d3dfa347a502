//! Authentication routes
//!
//! Vendor registration, login, and session introspection. Tokens are
//! stateless HS256 JWTs; logout exists so clients have a uniform endpoint
//! to call, but all it does is acknowledge.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

use crate::api::{DataResponse, MessageResponse};
use crate::app::AppState;
use crate::auth::{password, RequireVendor};
use crate::domain::{
    AuthResponse, LoginRequest, NewVendor, RegisterRequest, VendorResponse,
};
use crate::error::ApiError;
use crate::store::{constraints, StoreError};

/// POST /auth/register
///
/// Register a new vendor and issue a session token.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let valid = req.validate().map_err(ApiError::Validation)?;

    tracing::info!(
        email = %valid.email,
        company_name = %valid.company_name,
        category = ?valid.category,
        "Registering vendor"
    );

    // Pre-check for friendly per-field messages; the unique constraints on
    // the store still decide under concurrency.
    if let Some(existing) = state
        .vendors
        .find_by_email_or_pin(&valid.email, &valid.kra_pin)
        .await?
    {
        let mut taken = Vec::new();
        if existing.email == valid.email {
            taken.push("email is already registered".to_string());
        }
        if existing.kra_pin == valid.kra_pin {
            taken.push("kra_pin is already registered".to_string());
        }
        return Err(ApiError::Conflict(taken.join("; ")));
    }

    // Argon2 is CPU-bound; keep it off the async workers.
    let password = valid.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || password::hash(&password))
        .await
        .map_err(|e| ApiError::internal(format!("Hashing task failed: {e}")))?
        .map_err(|e| ApiError::internal(format!("Password hashing failed: {e}")))?;

    let vendor = state
        .vendors
        .insert(NewVendor {
            email: valid.email,
            password_hash,
            kra_pin: valid.kra_pin,
            company_name: valid.company_name,
            phone_number: valid.phone_number,
            category: valid.category,
        })
        .await
        .map_err(|e| {
            // a registration racing this one still loses at the constraint
            if let StoreError::UniqueViolation(c) = &e {
                if c == constraints::VENDOR_EMAIL {
                    return ApiError::conflict("email is already registered");
                }
                if c == constraints::VENDOR_KRA_PIN {
                    return ApiError::conflict("kra_pin is already registered");
                }
            }
            ApiError::from(e)
        })?;

    let token = state
        .tokens
        .sign(vendor.id)
        .map_err(|e| ApiError::internal(format!("Token signing failed: {e}")))?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(AuthResponse {
            token,
            vendor: vendor.into(),
        })),
    ))
}

/// POST /auth/login
///
/// Exchange email and password for a session token.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = req.email.trim().to_lowercase();

    // Unknown email and wrong password take the same path so responses
    // don't reveal which addresses are registered.
    let vendor = state.vendors.find_by_email(&email).await?;

    let (stored_hash, known) = match &vendor {
        Some(v) => (v.password_hash.clone(), true),
        None => (String::new(), false),
    };
    let password = req.password.clone();
    let verified = tokio::task::spawn_blocking(move || {
        known && password::verify(&password, &stored_hash)
    })
    .await
    .map_err(|e| ApiError::internal(format!("Verification task failed: {e}")))?;

    let Some(vendor) = vendor.filter(|_| verified) else {
        return Err(ApiError::unauthorized("Invalid email or password"));
    };

    if vendor.blacklisted {
        return Err(ApiError::forbidden("Account suspended. Please contact support"));
    }

    let token = state
        .tokens
        .sign(vendor.id)
        .map_err(|e| ApiError::internal(format!("Token signing failed: {e}")))?;

    tracing::info!(vendor_id = %vendor.id, "Vendor logged in");

    Ok(Json(DataResponse::new(AuthResponse {
        token,
        vendor: vendor.into(),
    })))
}

/// POST /auth/logout
///
/// Stateless logout: the client discards its token.
pub async fn logout() -> Json<MessageResponse> {
    Json(MessageResponse::new("Logged out successfully"))
}

/// GET /auth/me
///
/// Current authenticated vendor.
pub async fn me(auth: RequireVendor) -> Json<DataResponse<VendorResponse>> {
    Json(DataResponse::new(auth.0.into()))
}
