//! Persistence seams for the three resources.
//!
//! Each resource gets a small trait so the submission workflow and the
//! routes depend on behavior, not on the database. Production runs on
//! [`postgres::PgStore`]; the integration tests supply an in-memory
//! implementation.
//!
//! Uniqueness is enforced here, not in the callers: a conflicting insert
//! comes back as [`StoreError::UniqueViolation`] carrying the constraint
//! name, so the duplicate-bid pre-check can race without letting a second
//! bid through.

pub mod postgres;

use axum::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    Bid, BidWithTender, NewBid, NewTender, NewVendor, Tender, UpdateProfileRequest, Vendor,
};

/// Unique-constraint names shared by every store implementation.
pub mod constraints {
    pub const VENDOR_EMAIL: &str = "vendors_email_key";
    pub const VENDOR_KRA_PIN: &str = "vendors_kra_pin_key";
    pub const BID_TENDER_VENDOR: &str = "bids_tender_vendor_key";
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write. Carries the constraint name.
    #[error("unique constraint `{0}` violated")]
    UniqueViolation(String),

    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// The backing store misbehaved in a way that is not a driver error,
    /// e.g. a status column holding text no variant matches.
    #[error("{0}")]
    Backend(String),
}

#[async_trait]
pub trait VendorStore: Send + Sync {
    async fn insert(&self, vendor: NewVendor) -> Result<Vendor, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Vendor>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Vendor>, StoreError>;

    /// Registration pre-check: returns any vendor already holding the email
    /// or the PIN, so the handler can name the offending field. The unique
    /// constraints remain the backstop for races.
    async fn find_by_email_or_pin(
        &self,
        email: &str,
        kra_pin: &str,
    ) -> Result<Option<Vendor>, StoreError>;

    async fn update_profile(
        &self,
        id: Uuid,
        update: UpdateProfileRequest,
    ) -> Result<Option<Vendor>, StoreError>;

    /// Non-blacklisted vendor directory, ordered by company name.
    async fn list_active(&self, limit: i64, offset: i64)
        -> Result<(Vec<Vendor>, u64), StoreError>;
}

#[async_trait]
pub trait TenderStore: Send + Sync {
    async fn insert(&self, tender: NewTender) -> Result<Tender, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tender>, StoreError>;

    /// Open tenders, newest first.
    async fn list_open(&self, limit: i64, offset: i64) -> Result<(Vec<Tender>, u64), StoreError>;
}

#[async_trait]
pub trait BidStore: Send + Sync {
    /// Insert a bid. A second bid for the same (tender, vendor) pair must
    /// fail with [`StoreError::UniqueViolation`] even when callers raced
    /// past [`BidStore::find_for_vendor`].
    async fn insert(&self, bid: NewBid) -> Result<Bid, StoreError>;

    async fn find_for_vendor(
        &self,
        tender_id: Uuid,
        vendor_id: Uuid,
    ) -> Result<Option<Bid>, StoreError>;

    /// Owner-scoped detail lookup; `None` when the bid does not exist or
    /// belongs to a different vendor.
    async fn find_by_id_for_vendor(
        &self,
        id: Uuid,
        vendor_id: Uuid,
    ) -> Result<Option<BidWithTender>, StoreError>;

    /// The vendor's bids, newest first, each with its tender summary.
    async fn list_for_vendor(
        &self,
        vendor_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<BidWithTender>, u64), StoreError>;
}
