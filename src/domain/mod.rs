//! Domain types and DTOs
//!
//! Entities, request/response shapes, and the input validation rules for
//! vendors, tenders, and bids.

pub mod bids;
pub mod tenders;
pub mod vendors;

pub use bids::*;
pub use tenders::*;
pub use vendors::*;
