use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }

    pub fn is_prod(&self) -> bool {
        matches!(self, Self::Prod)
    }
}

/// Which implementation backs the external commit ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerMode {
    /// In-process stub with an artificial delay. The default outside prod.
    Mock,
    /// HTTP gateway in front of the chaincode network.
    Fabric,
}

impl LedgerMode {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "fabric" => Self::Fabric,
            _ => Self::Mock,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mock => "mock",
            Self::Fabric => "fabric",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,
    pub server_addr: String,

    // Database
    pub database_url: String,
    pub database_max_connections: u32,

    // CORS
    pub cors_allow_origins: Vec<String>,

    // Auth
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,

    // External commit ledger
    pub ledger_mode: LedgerMode,
    pub ledger_endpoint: String,
    /// Hard cap the submission workflow imposes on a single commit call.
    pub ledger_timeout: Duration,
    /// Artificial latency of the mock ledger.
    pub ledger_mock_delay: Duration,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let env = Environment::from_str(&env::var("ENV").unwrap_or_else(|_| "dev".to_string()));
        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        // Database
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        // CORS
        let cors_allow_origins = env::var("CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        // Auth
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        let jwt_ttl_hours = env::var("JWT_TTL_HOURS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(24);

        // External commit ledger
        let ledger_mode =
            LedgerMode::from_str(&env::var("LEDGER_MODE").unwrap_or_else(|_| "mock".to_string()));
        let ledger_endpoint =
            env::var("LEDGER_ENDPOINT").unwrap_or_else(|_| "http://localhost:7052".to_string());
        let ledger_timeout = Duration::from_secs(
            env::var("LEDGER_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        );
        let ledger_mock_delay = Duration::from_millis(
            env::var("LEDGER_MOCK_DELAY_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1000),
        );

        Ok(Settings {
            env,
            server_addr,
            database_url,
            database_max_connections,
            cors_allow_origins,
            jwt_secret,
            jwt_ttl_hours,
            ledger_mode,
            ledger_endpoint,
            ledger_timeout,
            ledger_mock_delay,
        })
    }
}
