//! Core business logic: the equity ledger, valuation sync, derived metrics

pub mod cache;
pub mod config;
pub mod ledger;
pub mod log;
pub mod metrics;
pub mod valuation;

// Re-export main types for cleaner imports
pub use ledger::{EquityError, EquityLedger, MAX_INVESTORS, MIN_OCCUPANT_EQUITY};
pub use metrics::{ShareReport, StatusSnapshot};
pub use valuation::{SyncError, ValuationDelta, ValuationProvider};
