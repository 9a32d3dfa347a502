use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::VendorCategory;

/// Tender lifecycle. Created `Open`; the transition out of `Open` happens in
/// an out-of-band awarding process, not through this API.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TenderStatus {
    Open,
    Closed,
    Awarded,
}

impl TenderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Awarded => "awarded",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(Self::Open),
            "closed" => Some(Self::Closed),
            "awarded" => Some(Self::Awarded),
            _ => None,
        }
    }
}

/// Tender entity
#[derive(Debug, Clone)]
pub struct Tender {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: VendorCategory,
    pub budget: Decimal,
    pub deadline: DateTime<Utc>,
    pub status: TenderStatus,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a new tender; always created `Open`.
#[derive(Debug, Clone)]
pub struct NewTender {
    pub title: String,
    pub description: String,
    pub category: VendorCategory,
    pub budget: Decimal,
    pub deadline: DateTime<Utc>,
    pub created_by: Uuid,
}

/// Request DTO for creating a tender
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTenderRequest {
    pub title: String,
    pub description: String,
    pub category: String,
    pub budget: Decimal,
    pub deadline: DateTime<Utc>,
}

impl CreateTenderRequest {
    /// Validate against `now` so the deadline rule stays deterministic in
    /// tests.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<VendorCategory, Vec<String>> {
        let mut problems = Vec::new();
        if self.title.trim().is_empty() {
            problems.push("title must not be empty".to_string());
        }
        if self.description.trim().is_empty() {
            problems.push("description must not be empty".to_string());
        }
        if self.budget <= Decimal::ZERO {
            problems.push("budget must be greater than zero".to_string());
        }
        if self.deadline <= now {
            problems.push("deadline must be in the future".to_string());
        }
        let category = VendorCategory::parse(&self.category);
        if category.is_none() {
            problems.push("category must be either \"goods\" or \"services\"".to_string());
        }

        match (category, problems.is_empty()) {
            (Some(category), true) => Ok(category),
            _ => Err(problems),
        }
    }
}

/// Response DTO for tender
#[derive(Debug, Clone, Serialize)]
pub struct TenderResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: VendorCategory,
    pub budget: Decimal,
    pub deadline: DateTime<Utc>,
    pub status: TenderStatus,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Tender> for TenderResponse {
    fn from(t: Tender) -> Self {
        Self {
            id: t.id,
            title: t.title,
            description: t.description,
            category: t.category,
            budget: t.budget,
            deadline: t.deadline,
            status: t.status,
            created_by: t.created_by,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

/// Condensed tender view embedded in bid listings.
#[derive(Debug, Clone, Serialize)]
pub struct TenderSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: TenderStatus,
    pub deadline: DateTime<Utc>,
}

impl From<Tender> for TenderSummary {
    fn from(t: Tender) -> Self {
        Self {
            id: t.id,
            title: t.title,
            description: t.description,
            status: t.status,
            deadline: t.deadline,
        }
    }
}
