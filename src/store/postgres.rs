//! PostgreSQL store implementation.

use axum::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::{BidStore, StoreError, TenderStore, VendorStore};
use crate::domain::{
    Bid, BidStatus, BidWithTender, NewBid, NewTender, NewVendor, Tender, TenderStatus,
    TenderSummary, UpdateProfileRequest, Vendor, VendorCategory,
};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map a driver error, surfacing unique violations by constraint name.
fn map_write_err(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return StoreError::UniqueViolation(db.constraint().unwrap_or("unknown").to_string());
        }
    }
    StoreError::Database(e)
}

#[derive(Debug, sqlx::FromRow)]
struct VendorRow {
    id: Uuid,
    email: String,
    password_hash: String,
    kra_pin: String,
    company_name: String,
    phone_number: String,
    category: String,
    blacklisted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<VendorRow> for Vendor {
    type Error = StoreError;

    fn try_from(row: VendorRow) -> Result<Self, StoreError> {
        let category = VendorCategory::parse(&row.category)
            .ok_or_else(|| StoreError::Backend(format!("unknown vendor category `{}`", row.category)))?;
        Ok(Vendor {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            kra_pin: row.kra_pin,
            company_name: row.company_name,
            phone_number: row.phone_number,
            category,
            blacklisted: row.blacklisted,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const VENDOR_COLUMNS: &str = "id, email, password_hash, kra_pin, company_name, phone_number, category, blacklisted, created_at, updated_at";

#[async_trait]
impl VendorStore for PgStore {
    async fn insert(&self, vendor: NewVendor) -> Result<Vendor, StoreError> {
        let row = sqlx::query_as::<_, VendorRow>(
            r#"
            INSERT INTO vendors (id, email, password_hash, kra_pin, company_name, phone_number, category)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, email, password_hash, kra_pin, company_name, phone_number, category, blacklisted, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&vendor.email)
        .bind(&vendor.password_hash)
        .bind(&vendor.kra_pin)
        .bind(&vendor.company_name)
        .bind(&vendor.phone_number)
        .bind(vendor.category.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_err)?;

        row.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Vendor>, StoreError> {
        let row = sqlx::query_as::<_, VendorRow>(&format!(
            "SELECT {VENDOR_COLUMNS} FROM vendors WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Vendor::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Vendor>, StoreError> {
        let row = sqlx::query_as::<_, VendorRow>(&format!(
            "SELECT {VENDOR_COLUMNS} FROM vendors WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Vendor::try_from).transpose()
    }

    async fn find_by_email_or_pin(
        &self,
        email: &str,
        kra_pin: &str,
    ) -> Result<Option<Vendor>, StoreError> {
        let row = sqlx::query_as::<_, VendorRow>(&format!(
            "SELECT {VENDOR_COLUMNS} FROM vendors WHERE email = $1 OR kra_pin = $2 LIMIT 1"
        ))
        .bind(email)
        .bind(kra_pin)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Vendor::try_from).transpose()
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: UpdateProfileRequest,
    ) -> Result<Option<Vendor>, StoreError> {
        let row = sqlx::query_as::<_, VendorRow>(
            r#"
            UPDATE vendors
            SET company_name = COALESCE($2, company_name),
                phone_number = COALESCE($3, phone_number),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, password_hash, kra_pin, company_name, phone_number, category, blacklisted, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(update.company_name)
        .bind(update.phone_number)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Vendor::try_from).transpose()
    }

    async fn list_active(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Vendor>, u64), StoreError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM vendors WHERE NOT blacklisted")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, VendorRow>(&format!(
            r#"
            SELECT {VENDOR_COLUMNS} FROM vendors
            WHERE NOT blacklisted
            ORDER BY company_name ASC, created_at ASC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let vendors = rows
            .into_iter()
            .map(Vendor::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((vendors, total as u64))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TenderRow {
    id: Uuid,
    title: String,
    description: String,
    category: String,
    budget: Decimal,
    deadline: DateTime<Utc>,
    status: String,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TenderRow> for Tender {
    type Error = StoreError;

    fn try_from(row: TenderRow) -> Result<Self, StoreError> {
        let category = VendorCategory::parse(&row.category)
            .ok_or_else(|| StoreError::Backend(format!("unknown tender category `{}`", row.category)))?;
        let status = TenderStatus::parse(&row.status)
            .ok_or_else(|| StoreError::Backend(format!("unknown tender status `{}`", row.status)))?;
        Ok(Tender {
            id: row.id,
            title: row.title,
            description: row.description,
            category,
            budget: row.budget,
            deadline: row.deadline,
            status,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const TENDER_COLUMNS: &str =
    "id, title, description, category, budget, deadline, status, created_by, created_at, updated_at";

#[async_trait]
impl TenderStore for PgStore {
    async fn insert(&self, tender: NewTender) -> Result<Tender, StoreError> {
        let row = sqlx::query_as::<_, TenderRow>(
            r#"
            INSERT INTO tenders (id, title, description, category, budget, deadline, status, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, 'open', $7)
            RETURNING id, title, description, category, budget, deadline, status, created_by, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&tender.title)
        .bind(&tender.description)
        .bind(tender.category.as_str())
        .bind(tender.budget)
        .bind(tender.deadline)
        .bind(tender.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_err)?;

        row.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tender>, StoreError> {
        let row = sqlx::query_as::<_, TenderRow>(&format!(
            "SELECT {TENDER_COLUMNS} FROM tenders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Tender::try_from).transpose()
    }

    async fn list_open(&self, limit: i64, offset: i64) -> Result<(Vec<Tender>, u64), StoreError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tenders WHERE status = 'open'")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, TenderRow>(&format!(
            r#"
            SELECT {TENDER_COLUMNS} FROM tenders
            WHERE status = 'open'
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let tenders = rows
            .into_iter()
            .map(Tender::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((tenders, total as u64))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct BidRow {
    id: Uuid,
    tender_id: Uuid,
    vendor_id: Uuid,
    amount: Decimal,
    description: String,
    status: String,
    ledger_tx_id: String,
    documents: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BidRow> for Bid {
    type Error = StoreError;

    fn try_from(row: BidRow) -> Result<Self, StoreError> {
        let status = BidStatus::parse(&row.status)
            .ok_or_else(|| StoreError::Backend(format!("unknown bid status `{}`", row.status)))?;
        Ok(Bid {
            id: row.id,
            tender_id: row.tender_id,
            vendor_id: row.vendor_id,
            amount: row.amount,
            description: row.description,
            status,
            ledger_tx_id: row.ledger_tx_id,
            documents: row.documents,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Bid joined with the columns needed for its tender summary.
#[derive(Debug, sqlx::FromRow)]
struct BidTenderRow {
    id: Uuid,
    tender_id: Uuid,
    vendor_id: Uuid,
    amount: Decimal,
    description: String,
    status: String,
    ledger_tx_id: String,
    documents: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    tender_title: String,
    tender_description: String,
    tender_status: String,
    tender_deadline: DateTime<Utc>,
}

impl TryFrom<BidTenderRow> for BidWithTender {
    type Error = StoreError;

    fn try_from(row: BidTenderRow) -> Result<Self, StoreError> {
        let bid_status = BidStatus::parse(&row.status)
            .ok_or_else(|| StoreError::Backend(format!("unknown bid status `{}`", row.status)))?;
        let tender_status = TenderStatus::parse(&row.tender_status).ok_or_else(|| {
            StoreError::Backend(format!("unknown tender status `{}`", row.tender_status))
        })?;
        Ok(BidWithTender {
            bid: Bid {
                id: row.id,
                tender_id: row.tender_id,
                vendor_id: row.vendor_id,
                amount: row.amount,
                description: row.description,
                status: bid_status,
                ledger_tx_id: row.ledger_tx_id,
                documents: row.documents,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            tender: TenderSummary {
                id: row.tender_id,
                title: row.tender_title,
                description: row.tender_description,
                status: tender_status,
                deadline: row.tender_deadline,
            },
        })
    }
}

const BID_JOIN_SELECT: &str = r#"
    SELECT b.id, b.tender_id, b.vendor_id, b.amount, b.description, b.status,
           b.ledger_tx_id, b.documents, b.created_at, b.updated_at,
           t.title AS tender_title, t.description AS tender_description,
           t.status AS tender_status, t.deadline AS tender_deadline
    FROM bids b
    JOIN tenders t ON t.id = b.tender_id
"#;

#[async_trait]
impl BidStore for PgStore {
    async fn insert(&self, bid: NewBid) -> Result<Bid, StoreError> {
        let row = sqlx::query_as::<_, BidRow>(
            r#"
            INSERT INTO bids (id, tender_id, vendor_id, amount, description, status, ledger_tx_id, documents)
            VALUES ($1, $2, $3, $4, $5, 'submitted', $6, $7)
            RETURNING id, tender_id, vendor_id, amount, description, status, ledger_tx_id, documents, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(bid.tender_id)
        .bind(bid.vendor_id)
        .bind(bid.amount)
        .bind(&bid.description)
        .bind(&bid.ledger_tx_id)
        .bind(&bid.documents)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_err)?;

        row.try_into()
    }

    async fn find_for_vendor(
        &self,
        tender_id: Uuid,
        vendor_id: Uuid,
    ) -> Result<Option<Bid>, StoreError> {
        let row = sqlx::query_as::<_, BidRow>(
            r#"
            SELECT id, tender_id, vendor_id, amount, description, status, ledger_tx_id, documents, created_at, updated_at
            FROM bids
            WHERE tender_id = $1 AND vendor_id = $2
            "#,
        )
        .bind(tender_id)
        .bind(vendor_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Bid::try_from).transpose()
    }

    async fn find_by_id_for_vendor(
        &self,
        id: Uuid,
        vendor_id: Uuid,
    ) -> Result<Option<BidWithTender>, StoreError> {
        let row = sqlx::query_as::<_, BidTenderRow>(&format!(
            "{BID_JOIN_SELECT} WHERE b.id = $1 AND b.vendor_id = $2"
        ))
        .bind(id)
        .bind(vendor_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(BidWithTender::try_from).transpose()
    }

    async fn list_for_vendor(
        &self,
        vendor_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<BidWithTender>, u64), StoreError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bids WHERE vendor_id = $1")
            .bind(vendor_id)
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, BidTenderRow>(&format!(
            "{BID_JOIN_SELECT} WHERE b.vendor_id = $1 ORDER BY b.created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(vendor_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let bids = rows
            .into_iter()
            .map(BidWithTender::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((bids, total as u64))
    }
}
