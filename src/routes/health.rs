use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::app::AppState;
use crate::db;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: ServiceHealth,
}

#[derive(Serialize)]
pub struct ServiceHealth {
    pub database: String,
    pub ledger: String,
}

/// Health check endpoint - public
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<HealthResponse>) {
    let database = match &state.db {
        Some(pool) => {
            if db::health_check(pool).await {
                "ok"
            } else {
                "error"
            }
        }
        // In-memory store (tests, demos): nothing to ping.
        None => "disabled",
    };

    // The database is the only critical dependency; the ledger is reported
    // by mode since the mock has nothing meaningful to probe.
    let (status_code, status) = if database == "error" {
        (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
    } else {
        (StatusCode::OK, "healthy")
    };

    (
        status_code,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            services: ServiceHealth {
                database: database.to_string(),
                ledger: state.settings.ledger_mode.as_str().to_string(),
            },
        }),
    )
}
