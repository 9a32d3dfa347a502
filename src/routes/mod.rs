pub mod auth;
pub mod bids;
pub mod health;
pub mod tenders;
pub mod vendors;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::app::AppState;

/// Build the API router with all routes
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Public routes
        .route("/health", get(health::health_check))
        // Auth
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        // Vendors
        .route("/vendors", get(vendors::list_vendors))
        .route("/vendors/me", get(vendors::get_profile))
        .route("/vendors/me", put(vendors::update_profile))
        // Tenders
        .route("/tenders", post(tenders::create_tender))
        .route("/tenders", get(tenders::list_tenders))
        .route("/tenders/:id", get(tenders::get_tender))
        // Bids
        .route("/bids", post(bids::submit_bid))
        .route("/bids", get(bids::list_bids))
        .route("/bids/:id", get(bids::get_bid))
}
