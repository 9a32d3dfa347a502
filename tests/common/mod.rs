//! Shared test harness: an in-memory store, scripted ledger doubles, and
//! request helpers that drive the full router.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{self, Request, StatusCode};
use axum::{async_trait, Router};
use chrono::{Duration as ChronoDuration, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use tenderhub_backend::app::{self, AppState};
use tenderhub_backend::auth::TokenSigner;
use tenderhub_backend::config::{Environment, LedgerMode, Settings};
use tenderhub_backend::domain::{
    Bid, BidStatus, BidWithTender, NewBid, NewTender, NewVendor, Tender, TenderStatus,
    TenderSummary, UpdateProfileRequest, Vendor, VendorCategory,
};
use tenderhub_backend::services::ledger::{BidCommit, CommitLedger, CommitReceipt, LedgerError};
use tenderhub_backend::services::MockLedger;
use tenderhub_backend::store::{
    constraints, BidStore, StoreError, TenderStore, VendorStore,
};

pub const TEST_JWT_SECRET: &str = "integration-test-secret";

/// In-memory store honoring the same unique constraints as the schema.
#[derive(Default)]
pub struct MemStore {
    inner: Mutex<MemInner>,
}

#[derive(Default)]
struct MemInner {
    vendors: Vec<Vendor>,
    tenders: Vec<Tender>,
    bids: Vec<Bid>,
}

impl MemStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn bid_count(&self) -> usize {
        self.inner.lock().bids.len()
    }

    pub fn add_vendor(&self, vendor: Vendor) {
        self.inner.lock().vendors.push(vendor);
    }

    pub fn add_tender(&self, tender: Tender) {
        self.inner.lock().tenders.push(tender);
    }
}

#[async_trait]
impl VendorStore for MemStore {
    async fn insert(&self, vendor: NewVendor) -> Result<Vendor, StoreError> {
        let mut inner = self.inner.lock();
        if inner.vendors.iter().any(|v| v.email == vendor.email) {
            return Err(StoreError::UniqueViolation(
                constraints::VENDOR_EMAIL.to_string(),
            ));
        }
        if inner.vendors.iter().any(|v| v.kra_pin == vendor.kra_pin) {
            return Err(StoreError::UniqueViolation(
                constraints::VENDOR_KRA_PIN.to_string(),
            ));
        }
        let now = Utc::now();
        let vendor = Vendor {
            id: Uuid::new_v4(),
            email: vendor.email,
            password_hash: vendor.password_hash,
            kra_pin: vendor.kra_pin,
            company_name: vendor.company_name,
            phone_number: vendor.phone_number,
            category: vendor.category,
            blacklisted: false,
            created_at: now,
            updated_at: now,
        };
        inner.vendors.push(vendor.clone());
        Ok(vendor)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Vendor>, StoreError> {
        Ok(self.inner.lock().vendors.iter().find(|v| v.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Vendor>, StoreError> {
        Ok(self
            .inner
            .lock()
            .vendors
            .iter()
            .find(|v| v.email == email)
            .cloned())
    }

    async fn find_by_email_or_pin(
        &self,
        email: &str,
        kra_pin: &str,
    ) -> Result<Option<Vendor>, StoreError> {
        Ok(self
            .inner
            .lock()
            .vendors
            .iter()
            .find(|v| v.email == email || v.kra_pin == kra_pin)
            .cloned())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: UpdateProfileRequest,
    ) -> Result<Option<Vendor>, StoreError> {
        let mut inner = self.inner.lock();
        let Some(vendor) = inner.vendors.iter_mut().find(|v| v.id == id) else {
            return Ok(None);
        };
        if let Some(company_name) = update.company_name {
            vendor.company_name = company_name;
        }
        if let Some(phone_number) = update.phone_number {
            vendor.phone_number = phone_number;
        }
        vendor.updated_at = Utc::now();
        Ok(Some(vendor.clone()))
    }

    async fn list_active(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Vendor>, u64), StoreError> {
        let inner = self.inner.lock();
        let mut active: Vec<Vendor> = inner
            .vendors
            .iter()
            .filter(|v| !v.blacklisted)
            .cloned()
            .collect();
        active.sort_by(|a, b| a.company_name.cmp(&b.company_name));
        let total = active.len() as u64;
        let page = active
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok((page, total))
    }
}

#[async_trait]
impl TenderStore for MemStore {
    async fn insert(&self, tender: NewTender) -> Result<Tender, StoreError> {
        let now = Utc::now();
        let tender = Tender {
            id: Uuid::new_v4(),
            title: tender.title,
            description: tender.description,
            category: tender.category,
            budget: tender.budget,
            deadline: tender.deadline,
            status: TenderStatus::Open,
            created_by: tender.created_by,
            created_at: now,
            updated_at: now,
        };
        self.inner.lock().tenders.push(tender.clone());
        Ok(tender)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tender>, StoreError> {
        Ok(self.inner.lock().tenders.iter().find(|t| t.id == id).cloned())
    }

    async fn list_open(&self, limit: i64, offset: i64) -> Result<(Vec<Tender>, u64), StoreError> {
        let inner = self.inner.lock();
        // reverse insertion order first so equal timestamps stay newest-first
        let mut open: Vec<Tender> = inner
            .tenders
            .iter()
            .rev()
            .filter(|t| t.status == TenderStatus::Open)
            .cloned()
            .collect();
        open.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = open.len() as u64;
        let page = open
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok((page, total))
    }
}

#[async_trait]
impl BidStore for MemStore {
    async fn insert(&self, bid: NewBid) -> Result<Bid, StoreError> {
        // check-and-insert under one lock, like the database constraint
        let mut inner = self.inner.lock();
        if inner
            .bids
            .iter()
            .any(|b| b.tender_id == bid.tender_id && b.vendor_id == bid.vendor_id)
        {
            return Err(StoreError::UniqueViolation(
                constraints::BID_TENDER_VENDOR.to_string(),
            ));
        }
        let now = Utc::now();
        let bid = Bid {
            id: Uuid::new_v4(),
            tender_id: bid.tender_id,
            vendor_id: bid.vendor_id,
            amount: bid.amount,
            description: bid.description,
            status: BidStatus::Submitted,
            ledger_tx_id: bid.ledger_tx_id,
            documents: bid.documents,
            created_at: now,
            updated_at: now,
        };
        inner.bids.push(bid.clone());
        Ok(bid)
    }

    async fn find_for_vendor(
        &self,
        tender_id: Uuid,
        vendor_id: Uuid,
    ) -> Result<Option<Bid>, StoreError> {
        Ok(self
            .inner
            .lock()
            .bids
            .iter()
            .find(|b| b.tender_id == tender_id && b.vendor_id == vendor_id)
            .cloned())
    }

    async fn find_by_id_for_vendor(
        &self,
        id: Uuid,
        vendor_id: Uuid,
    ) -> Result<Option<BidWithTender>, StoreError> {
        let inner = self.inner.lock();
        let Some(bid) = inner
            .bids
            .iter()
            .find(|b| b.id == id && b.vendor_id == vendor_id)
            .cloned()
        else {
            return Ok(None);
        };
        let tender = tender_summary(&inner, bid.tender_id)?;
        Ok(Some(BidWithTender { bid, tender }))
    }

    async fn list_for_vendor(
        &self,
        vendor_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<BidWithTender>, u64), StoreError> {
        let inner = self.inner.lock();
        let mut mine: Vec<Bid> = inner
            .bids
            .iter()
            .rev()
            .filter(|b| b.vendor_id == vendor_id)
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = mine.len() as u64;
        let mut page = Vec::new();
        for bid in mine.into_iter().skip(offset as usize).take(limit as usize) {
            let tender = tender_summary(&inner, bid.tender_id)?;
            page.push(BidWithTender { bid, tender });
        }
        Ok((page, total))
    }
}

fn tender_summary(inner: &MemInner, tender_id: Uuid) -> Result<TenderSummary, StoreError> {
    inner
        .tenders
        .iter()
        .find(|t| t.id == tender_id)
        .cloned()
        .map(TenderSummary::from)
        .ok_or_else(|| StoreError::Backend(format!("bid references missing tender {tender_id}")))
}

/// Ledger that always reports an outage.
pub struct FailingLedger;

#[async_trait]
impl CommitLedger for FailingLedger {
    async fn commit(&self, _payload: &BidCommit) -> Result<CommitReceipt, LedgerError> {
        Err(LedgerError::Unavailable("injected outage".to_string()))
    }
}

/// Ledger that never answers; exercises the caller-imposed timeout.
pub struct StallLedger;

#[async_trait]
impl CommitLedger for StallLedger {
    async fn commit(&self, _payload: &BidCommit) -> Result<CommitReceipt, LedgerError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Err(LedgerError::Unavailable("woke up unexpectedly".to_string()))
    }
}

pub fn test_settings(ledger_timeout: Duration) -> Settings {
    Settings {
        env: Environment::Dev,
        server_addr: "127.0.0.1:0".to_string(),
        database_url: "postgres://unused".to_string(),
        database_max_connections: 1,
        cors_allow_origins: vec!["http://localhost:3000".to_string()],
        jwt_secret: TEST_JWT_SECRET.to_string(),
        jwt_ttl_hours: 24,
        ledger_mode: LedgerMode::Mock,
        ledger_endpoint: "http://localhost:7052".to_string(),
        ledger_timeout,
        ledger_mock_delay: Duration::ZERO,
    }
}

pub struct TestApp {
    pub app: Router,
    pub state: Arc<AppState>,
    pub store: Arc<MemStore>,
}

/// Wire the real router onto the in-memory store and the given ledger.
pub fn test_app_with(ledger: Arc<dyn CommitLedger>, ledger_timeout: Duration) -> TestApp {
    let settings = test_settings(ledger_timeout);
    let store = MemStore::new();
    let tokens = TokenSigner::new(&settings.jwt_secret, settings.jwt_ttl_hours);
    let state = AppState::new(
        settings,
        store.clone(),
        store.clone(),
        store.clone(),
        ledger,
        tokens,
        None,
    );
    TestApp {
        app: app::create_app(state.clone()),
        state,
        store,
    }
}

/// Default harness: instant mock ledger, generous timeout.
pub fn test_app() -> TestApp {
    test_app_with(Arc::new(MockLedger::new(Duration::ZERO)), Duration::from_secs(5))
}

impl TestApp {
    pub fn token_for(&self, vendor_id: Uuid) -> String {
        self.state.tokens.sign(vendor_id).expect("sign test token")
    }

    /// Seed a vendor directly in the store, bypassing registration.
    pub fn seed_vendor(&self, email: &str, kra_pin: &str, blacklisted: bool) -> Vendor {
        let now = Utc::now();
        let vendor = Vendor {
            id: Uuid::new_v4(),
            email: email.to_string(),
            // not a valid PHC string; only login tests need real hashes
            password_hash: "seeded".to_string(),
            kra_pin: kra_pin.to_string(),
            company_name: format!("{email} Ltd"),
            phone_number: "+254712345678".to_string(),
            category: VendorCategory::Goods,
            blacklisted,
            created_at: now,
            updated_at: now,
        };
        self.store.add_vendor(vendor.clone());
        vendor
    }

    pub fn seed_tender(&self, created_by: Uuid, status: TenderStatus, budget: i64) -> Tender {
        let now = Utc::now();
        let tender = Tender {
            id: Uuid::new_v4(),
            title: "Supply of office equipment".to_string(),
            description: "As per attached schedule".to_string(),
            category: VendorCategory::Goods,
            budget: Decimal::new(budget, 0),
            deadline: now + ChronoDuration::days(14),
            status,
            created_by,
            created_at: now,
            updated_at: now,
        };
        self.store.add_tender(tender.clone());
        tender
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .expect("build request"),
            None => builder.body(Body::empty()).expect("build request"),
        };

        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router never fails");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request("GET", uri, token, None).await
    }

    pub async fn post(
        &self,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        self.request("POST", uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request("PUT", uri, token, Some(body)).await
    }
}
