use axum::{extract::DefaultBodyLimit, http::HeaderValue, Router};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::auth::TokenSigner;
use crate::config::Settings;
use crate::middleware::request_id_layer;
use crate::routes;
use crate::services::{BidSubmission, CommitLedger};
use crate::store::{BidStore, TenderStore, VendorStore};

/// Uploaded documents ride inline as references, so requests stay small.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared application state
pub struct AppState {
    pub settings: Settings,
    pub vendors: Arc<dyn VendorStore>,
    pub tenders: Arc<dyn TenderStore>,
    pub bids: Arc<dyn BidStore>,
    pub submission: BidSubmission,
    pub tokens: TokenSigner,
    /// Present when running against PostgreSQL; used by the health check.
    pub db: Option<PgPool>,
}

impl AppState {
    pub fn new(
        settings: Settings,
        vendors: Arc<dyn VendorStore>,
        tenders: Arc<dyn TenderStore>,
        bids: Arc<dyn BidStore>,
        ledger: Arc<dyn CommitLedger>,
        tokens: TokenSigner,
        db: Option<PgPool>,
    ) -> Arc<Self> {
        let submission = BidSubmission::new(
            tenders.clone(),
            bids.clone(),
            ledger,
            settings.ledger_timeout,
        );
        Arc::new(Self {
            settings,
            vendors,
            tenders,
            bids,
            submission,
            tokens,
            db,
        })
    }
}

/// Build the complete application with all middleware
pub fn create_app(state: Arc<AppState>) -> Router {
    // Build CORS layer
    let cors = build_cors_layer(&state.settings);

    // Build trace layer (use DEBUG for spans to reduce overhead at INFO level)
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::DEBUG));

    // Request ID layers
    let (set_request_id, propagate_request_id) = request_id_layer();

    // Build router (routes at root level, no /api prefix)
    Router::new()
        .merge(routes::api_router())
        // Middleware stack (applied bottom-up)
        .layer(propagate_request_id)
        .layer(trace_layer)
        .layer(set_request_id)
        .layer(cors)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

fn build_cors_layer(settings: &Settings) -> CorsLayer {
    let origins: Vec<HeaderValue> = settings
        .cors_allow_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    // Longer preflight cache in dev to cut down on OPTIONS requests
    let max_age = if settings.env.is_dev() {
        std::time::Duration::from_secs(86400)
    } else {
        std::time::Duration::from_secs(3600)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::list([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
            axum::http::HeaderName::from_static("x-request-id"),
        ]))
        .allow_credentials(true)
        .max_age(max_age)
}
