//! Bid submission workflow.
//!
//! Orchestrates validation, tender-state checks, the duplicate-bid guard,
//! the external ledger commit, and persistence. The order matters:
//! validation happens before any store or ledger call, and the bid row is
//! only written once the ledger has returned a commit id, so a ledger
//! failure never leaves a bid without proof of submission.
//!
//! The reverse does not hold: if the insert fails after the ledger accepted
//! the payload, the commit is orphaned. There is no compensation path (the
//! ledger is append-only and has no idempotent cancel), so the orphan is
//! logged at WARN with its transaction id for out-of-band reconciliation.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{Bid, NewBid, SubmitBidRequest, TenderStatus};
use crate::error::ApiError;
use crate::services::ledger::{BidCommit, CommitLedger, LedgerError};
use crate::store::{BidStore, TenderStore};

#[derive(Clone)]
pub struct BidSubmission {
    tenders: Arc<dyn TenderStore>,
    bids: Arc<dyn BidStore>,
    ledger: Arc<dyn CommitLedger>,
    /// Deadline imposed on the ledger call; the stub's delay is otherwise
    /// unbounded from the caller's point of view.
    commit_timeout: Duration,
}

impl BidSubmission {
    pub fn new(
        tenders: Arc<dyn TenderStore>,
        bids: Arc<dyn BidStore>,
        ledger: Arc<dyn CommitLedger>,
        commit_timeout: Duration,
    ) -> Self {
        Self {
            tenders,
            bids,
            ledger,
            commit_timeout,
        }
    }

    pub async fn submit(
        &self,
        vendor_id: Uuid,
        req: SubmitBidRequest,
    ) -> Result<Bid, ApiError> {
        // 1. Validate the payload before touching the store or the ledger.
        let mut problems = Vec::new();
        if req.amount <= Decimal::ZERO {
            problems.push("amount must be greater than zero".to_string());
        }
        if req.description.trim().is_empty() {
            problems.push("description must not be empty".to_string());
        }
        if !problems.is_empty() {
            return Err(ApiError::Validation(problems));
        }

        // 2. The tender must exist and still be accepting bids.
        let tender = self
            .tenders
            .find_by_id(req.tender_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Tender not found"))?;
        if tender.status != TenderStatus::Open {
            return Err(ApiError::invalid_state("Tender is no longer accepting bids"));
        }

        // 3. One bid per vendor per tender. This check is advisory - the
        // store's unique constraint in step 5 is what holds under races.
        if self
            .bids
            .find_for_vendor(req.tender_id, vendor_id)
            .await?
            .is_some()
        {
            return Err(ApiError::conflict(
                "A bid for this tender has already been submitted",
            ));
        }

        // 4. Commit to the external ledger under an explicit deadline. No
        // retry: the ledger has no idempotency key, so a retry after an
        // ambiguous failure could record the bid twice.
        let payload = BidCommit {
            tender_id: req.tender_id,
            vendor_id,
            amount: req.amount,
            description: req.description.clone(),
        };
        let receipt = match tokio::time::timeout(self.commit_timeout, self.ledger.commit(&payload))
            .await
        {
            Err(_) => return Err(LedgerError::Timeout(self.commit_timeout).into()),
            Ok(Err(e)) => return Err(e.into()),
            Ok(Ok(receipt)) => receipt,
        };

        // 5. Persist. A racing duplicate surfaces here as a unique
        // violation; any failure past this point orphans the commit.
        let bid = self
            .bids
            .insert(NewBid {
                tender_id: req.tender_id,
                vendor_id,
                amount: req.amount,
                description: req.description,
                ledger_tx_id: receipt.tx_id.clone(),
                documents: req.documents,
            })
            .await
            .map_err(|e| {
                tracing::warn!(
                    tx_id = %receipt.tx_id,
                    tender_id = %req.tender_id,
                    vendor_id = %vendor_id,
                    error = %e,
                    "Ledger commit orphaned: bid row was not persisted"
                );
                ApiError::from(e)
            })?;

        tracing::info!(
            bid_id = %bid.id,
            tender_id = %bid.tender_id,
            vendor_id = %bid.vendor_id,
            tx_id = %bid.ledger_tx_id,
            "Bid submitted"
        );

        Ok(bid)
    }
}
