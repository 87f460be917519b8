//! Valuation sync protocol: pull the latest market value from an external
//! provider and commit it to the ledger without touching the fixed
//! origination figures.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::ledger::EquityLedger;

/// Source of externally reported property valuations.
///
/// `Ok(None)` means the provider has no record for the property; transport
/// and decode failures surface as errors. Implementations are injected into
/// [`sync_valuation`] so tests can run against a fake.
#[async_trait]
pub trait ValuationProvider: Send + Sync {
    async fn current_value(&self, property_id: &str) -> Result<Option<f64>>;
}

/// Outcome of one successful valuation sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationDelta {
    pub property_id: String,
    pub previous_value: f64,
    pub new_value: f64,
    pub change: f64,
    /// Change expressed against the original purchase value, not the
    /// previous market value.
    pub change_percent_of_original: f64,
}

/// Sync-time failures. Both leave the ledger untouched.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("property {0} not found by the valuation provider")]
    PropertyNotFound(String),

    #[error("valuation provider unavailable: {0}")]
    ProviderUnavailable(anyhow::Error),
}

/// Fetches the latest market value for the ledger's property and commits it.
///
/// The provider call completes before any mutation is staged, so a failed
/// sync is fail-closed: the ledger state (including `last_sync_timestamp`)
/// is exactly what it was. The fixed `original_purchase_value` and
/// `original_monthly_obligation` are never modified here.
pub async fn sync_valuation(
    ledger: &mut EquityLedger,
    provider: &dyn ValuationProvider,
) -> Result<ValuationDelta, SyncError> {
    debug!(property_id = %ledger.property_id(), "Syncing market valuation");

    let value = provider
        .current_value(ledger.property_id())
        .await
        .map_err(SyncError::ProviderUnavailable)?;

    let Some(new_value) = value else {
        return Err(SyncError::PropertyNotFound(ledger.property_id().to_string()));
    };

    let delta = ledger.apply_valuation(new_value, Utc::now());
    info!(
        property_id = %delta.property_id,
        previous = delta.previous_value,
        current = delta.new_value,
        change = delta.change,
        change_percent_of_original = delta.change_percent_of_original,
        "Market sync complete; fixed obligation unchanged"
    );
    Ok(delta)
}
