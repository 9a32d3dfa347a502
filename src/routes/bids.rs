//! Bid routes
//!
//! Submission runs through [`crate::services::BidSubmission`]; the listing
//! and detail endpoints are scoped to the authenticated vendor - a vendor
//! can never see another vendor's bids.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::{DataResponse, Paginated, PaginationParams};
use crate::app::AppState;
use crate::auth::RequireVendor;
use crate::domain::{BidResponse, SubmitBidRequest};
use crate::error::ApiError;

/// POST /bids
///
/// Submit a bid for an open tender.
pub async fn submit_bid(
    auth: RequireVendor,
    State(state): State<Arc<AppState>>,
    Json(req): Json<SubmitBidRequest>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::info!(
        vendor_id = %auth.id,
        tender_id = %req.tender_id,
        amount = %req.amount,
        "Submitting bid"
    );

    let bid = state.submission.submit(auth.id, req).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(BidResponse::from(bid))),
    ))
}

/// GET /bids
///
/// The authenticated vendor's bids, newest first, with tender summaries.
pub async fn list_bids(
    auth: RequireVendor,
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ApiError> {
    let (bids, total) = state
        .bids
        .list_for_vendor(auth.id, pagination.limit(), pagination.offset())
        .await?;

    let data: Vec<BidResponse> = bids.into_iter().map(Into::into).collect();
    Ok(Json(Paginated::new(data, &pagination, total)))
}

/// GET /bids/:id
///
/// Bid detail, only for the owning vendor. Someone else's bid id is
/// indistinguishable from a missing one.
pub async fn get_bid(
    auth: RequireVendor,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let bid = state
        .bids
        .find_by_id_for_vendor(id, auth.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Bid not found"))?;

    Ok(Json(DataResponse::new(BidResponse::from(bid))))
}
