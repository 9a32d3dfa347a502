//! Tender routes
//!
//! Tenders are created `open` and stay listed until an out-of-band process
//! closes or awards them; browsing is public, creation requires auth.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::{DataResponse, Paginated, PaginationParams};
use crate::app::AppState;
use crate::auth::RequireVendor;
use crate::domain::{CreateTenderRequest, NewTender, TenderResponse};
use crate::error::ApiError;

/// POST /tenders
///
/// Publish a new tender.
pub async fn create_tender(
    auth: RequireVendor,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTenderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let category = req.validate(Utc::now()).map_err(ApiError::Validation)?;

    tracing::info!(
        vendor_id = %auth.id,
        title = %req.title,
        category = ?category,
        "Creating tender"
    );

    let tender = state
        .tenders
        .insert(NewTender {
            title: req.title.trim().to_string(),
            description: req.description.trim().to_string(),
            category,
            budget: req.budget,
            deadline: req.deadline,
            created_by: auth.id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(TenderResponse::from(tender))),
    ))
}

/// GET /tenders
///
/// Open tenders, newest first. Public.
pub async fn list_tenders(
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<PaginationParams>,
) -> Result<impl IntoResponse, ApiError> {
    let (tenders, total) = state
        .tenders
        .list_open(pagination.limit(), pagination.offset())
        .await?;

    let data: Vec<TenderResponse> = tenders.into_iter().map(Into::into).collect();
    Ok(Json(Paginated::new(data, &pagination, total)))
}

/// GET /tenders/:id
///
/// Tender detail. Public, and not limited to open tenders so vendors can
/// still see tenders they bid on after closing.
pub async fn get_tender(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let tender = state
        .tenders
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Tender not found"))?;

    Ok(Json(DataResponse::new(TenderResponse::from(tender))))
}
