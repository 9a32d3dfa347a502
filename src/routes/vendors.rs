//! Vendor directory and profile routes

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::api::{DataResponse, Paginated, PaginationParams};
use crate::app::AppState;
use crate::auth::RequireVendor;
use crate::domain::{UpdateProfileRequest, VendorResponse};
use crate::error::ApiError;

/// GET /vendors
///
/// Public directory of non-blacklisted vendors.
pub async fn list_vendors(
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ApiError> {
    let (vendors, total) = state
        .vendors
        .list_active(pagination.limit(), pagination.offset())
        .await?;

    let data: Vec<VendorResponse> = vendors.into_iter().map(Into::into).collect();
    Ok(Json(Paginated::new(data, &pagination, total)))
}

/// GET /vendors/me
///
/// Profile of the authenticated vendor.
pub async fn get_profile(auth: RequireVendor) -> Json<DataResponse<VendorResponse>> {
    Json(DataResponse::new(auth.0.into()))
}

/// PUT /vendors/me
///
/// Update the mutable profile fields (company name, phone number).
pub async fn update_profile(
    auth: RequireVendor,
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate().map_err(ApiError::Validation)?;

    tracing::info!(vendor_id = %auth.id, "Updating vendor profile");

    let vendor = state
        .vendors
        .update_profile(auth.id, req)
        .await?
        .ok_or_else(|| ApiError::not_found("Vendor not found"))?;

    Ok(Json(DataResponse::new(VendorResponse::from(vendor))))
}
