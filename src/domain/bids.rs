use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TenderSummary;

/// Bid status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BidStatus {
    Submitted,
    Evaluated,
    Awarded,
    Rejected,
}

impl BidStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Evaluated => "evaluated",
            Self::Awarded => "awarded",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "submitted" => Some(Self::Submitted),
            "evaluated" => Some(Self::Evaluated),
            "awarded" => Some(Self::Awarded),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// Bid entity. Holds non-owning references (by id) to its tender and vendor,
/// plus the commit identifier returned by the external ledger.
#[derive(Debug, Clone)]
pub struct Bid {
    pub id: Uuid,
    pub tender_id: Uuid,
    pub vendor_id: Uuid,
    pub amount: Decimal,
    pub description: String,
    pub status: BidStatus,
    pub ledger_tx_id: String,
    pub documents: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a new bid. Always persisted as `Submitted`, and only
/// after the ledger has returned a commit id.
#[derive(Debug, Clone)]
pub struct NewBid {
    pub tender_id: Uuid,
    pub vendor_id: Uuid,
    pub amount: Decimal,
    pub description: String,
    pub ledger_tx_id: String,
    pub documents: Vec<String>,
}

/// Request DTO for submitting a bid
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitBidRequest {
    pub tender_id: Uuid,
    pub amount: Decimal,
    pub description: String,
    #[serde(default)]
    pub documents: Vec<String>,
}

/// A bid joined with a condensed view of its tender, for vendor-facing
/// listings.
#[derive(Debug, Clone)]
pub struct BidWithTender {
    pub bid: Bid,
    pub tender: TenderSummary,
}

/// Response DTO for bid
#[derive(Debug, Clone, Serialize)]
pub struct BidResponse {
    pub id: Uuid,
    pub tender_id: Uuid,
    pub vendor_id: Uuid,
    pub amount: Decimal,
    pub description: String,
    pub status: BidStatus,
    pub ledger_tx_id: String,
    pub documents: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tender: Option<TenderSummary>,
}

impl From<Bid> for BidResponse {
    fn from(b: Bid) -> Self {
        Self {
            id: b.id,
            tender_id: b.tender_id,
            vendor_id: b.vendor_id,
            amount: b.amount,
            description: b.description,
            status: b.status,
            ledger_tx_id: b.ledger_tx_id,
            documents: b.documents,
            created_at: b.created_at,
            updated_at: b.updated_at,
            tender: None,
        }
    }
}

impl From<BidWithTender> for BidResponse {
    fn from(bt: BidWithTender) -> Self {
        let mut response = BidResponse::from(bt.bid);
        response.tender = Some(bt.tender);
        response
    }
}
