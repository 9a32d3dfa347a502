//! Service layer modules for external collaborators and orchestration.
//!
//! Contains the commit-ledger clients and the bid submission workflow.

pub mod ledger;
pub mod submission;

pub use ledger::{BidCommit, CommitLedger, CommitReceipt, FabricClient, LedgerError, MockLedger};
pub use submission::BidSubmission;
