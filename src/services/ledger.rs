//! External commit ledger.
//!
//! The ledger is an opaque collaborator: it accepts a bid payload and
//! returns a commit identifier. Its contract is at-least-once with no
//! idempotency key, so callers must not blindly retry a failed commit -
//! a duplicate would be recorded as a second transaction.
//!
//! Two implementations: [`FabricClient`] posts to a chaincode gateway over
//! HTTP; [`MockLedger`] simulates the network in-process with a fixed delay
//! and a journal of accepted payloads.

use anyhow::{Context, Result};
use axum::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Payload handed to the ledger for a bid submission.
#[derive(Debug, Clone, Serialize)]
pub struct BidCommit {
    pub tender_id: Uuid,
    pub vendor_id: Uuid,
    pub amount: Decimal,
    pub description: String,
}

/// Proof of submission returned by the ledger.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitReceipt {
    pub tx_id: String,
    pub committed_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum LedgerError {
    /// The caller-imposed deadline elapsed. The commit may or may not have
    /// landed; without an idempotency key there is no safe way to find out
    /// by retrying.
    #[error("ledger commit timed out after {0:?}")]
    Timeout(Duration),

    /// Transport failure or ledger-side outage.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    /// The ledger understood the request and refused it.
    #[error("ledger rejected commit: {0}")]
    Rejected(String),
}

impl LedgerError {
    /// Whether a later, operator-driven resubmission could succeed.
    /// `Rejected` is final; the rest are transient.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Rejected(_))
    }
}

/// Abstract commit capability, so a real ledger integration can replace the
/// stub without touching the submission workflow.
#[async_trait]
pub trait CommitLedger: Send + Sync {
    async fn commit(&self, payload: &BidCommit) -> Result<CommitReceipt, LedgerError>;
}

/// In-process stand-in for the ledger. Sleeps for a configured delay, then
/// accepts every payload and journals it.
pub struct MockLedger {
    delay: Duration,
    journal: RwLock<Vec<BidCommit>>,
}

impl MockLedger {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            journal: RwLock::new(Vec::new()),
        }
    }

    /// Payloads accepted so far, in commit order.
    pub fn committed(&self) -> Vec<BidCommit> {
        self.journal.read().clone()
    }
}

#[async_trait]
impl CommitLedger for MockLedger {
    async fn commit(&self, payload: &BidCommit) -> Result<CommitReceipt, LedgerError> {
        // Simulated network round trip
        tokio::time::sleep(self.delay).await;

        let receipt = CommitReceipt {
            tx_id: format!("tx-{}", Uuid::new_v4().simple()),
            committed_at: Utc::now(),
        };
        tracing::debug!(
            tx_id = %receipt.tx_id,
            tender_id = %payload.tender_id,
            vendor_id = %payload.vendor_id,
            "Mock ledger accepted commit"
        );
        self.journal.write().push(payload.clone());
        Ok(receipt)
    }
}

/// HTTP client for the chaincode gateway fronting the Fabric network.
#[derive(Clone)]
pub struct FabricClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

/// Error body returned by the gateway.
#[derive(Debug, Deserialize)]
struct GatewayError {
    message: String,
}

impl FabricClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        tracing::info!(base_url = base_url, "Ledger gateway client initialized");

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }
}

#[async_trait]
impl CommitLedger for FabricClient {
    async fn commit(&self, payload: &BidCommit) -> Result<CommitReceipt, LedgerError> {
        let url = format!("{}/invoke/SubmitBid", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LedgerError::Timeout(self.timeout)
                } else {
                    LedgerError::Unavailable(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<CommitReceipt>()
                .await
                .map_err(|e| LedgerError::Unavailable(format!("invalid gateway response: {e}")));
        }

        let message = response
            .json::<GatewayError>()
            .await
            .map(|e| e.message)
            .unwrap_or_else(|_| format!("gateway returned {status}"));

        if status.is_client_error() {
            Err(LedgerError::Rejected(message))
        } else {
            Err(LedgerError::Unavailable(message))
        }
    }
}
