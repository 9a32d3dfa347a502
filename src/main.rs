use anyhow::Result;
use std::sync::Arc;

use tenderhub_backend::auth::TokenSigner;
use tenderhub_backend::config::{LedgerMode, Settings};
use tenderhub_backend::services::{CommitLedger, FabricClient, MockLedger};
use tenderhub_backend::store::postgres::PgStore;
use tenderhub_backend::{app, db, logging};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = Settings::from_env()?;

    // Initialize logging
    logging::init_logging(&settings.env);

    tracing::info!(
        env = ?settings.env,
        server_addr = %settings.server_addr,
        ledger_mode = settings.ledger_mode.as_str(),
        "Starting tenderhub backend"
    );

    // Create database pool and bring the schema up to date
    let pool = db::create_pool(&settings).await?;
    db::run_migrations(&pool).await?;

    let store = Arc::new(PgStore::new(pool.clone()));

    // Pick the ledger implementation
    let ledger: Arc<dyn CommitLedger> = match settings.ledger_mode {
        LedgerMode::Mock => {
            tracing::warn!("Ledger in mock mode - commit ids are simulated and carry no durability");
            Arc::new(MockLedger::new(settings.ledger_mock_delay))
        }
        LedgerMode::Fabric => Arc::new(FabricClient::new(
            &settings.ledger_endpoint,
            settings.ledger_timeout,
        )?),
    };

    let tokens = TokenSigner::new(&settings.jwt_secret, settings.jwt_ttl_hours);

    // Create application state
    let state = app::AppState::new(
        settings.clone(),
        store.clone(),
        store.clone(),
        store,
        ledger,
        tokens,
        Some(pool),
    );

    // Build application
    let app = app::create_app(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&settings.server_addr).await?;
    tracing::info!("Listening on {}", settings.server_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
