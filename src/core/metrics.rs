//! Pure, read-only calculations over ledger state.
//!
//! Dues are always computed from the fixed origination obligation; share
//! values and profit are the only figures that move with the market.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_finprim::rate::cagr;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::ledger::EquityLedger;

/// Annualizing over less than a month produces meaningless rates.
const MIN_ANNUALIZATION_YEARS: f64 = 1.0 / 12.0;

/// Market position of a single investor's stake.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareReport {
    pub investor_id: String,
    pub equity_percent: f64,
    /// Stake valued at the original purchase price.
    pub original_value: f64,
    /// Stake valued at the latest synced market price.
    pub current_value: f64,
    pub unrealized_profit: f64,
    pub profit_percent: f64,
}

/// Display projection of a ledger; carries no business logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub property_id: String,
    pub address: String,
    pub occupant_id: String,
    pub occupant_equity_percent: f64,
    pub investor_count: usize,
    pub unallocated_percent: f64,
    pub current_market_value: f64,
    pub last_sync_timestamp: Option<DateTime<Utc>>,
}

/// Splits the fixed monthly obligation across occupant and investors in
/// proportion to their equity. The payments never change with market value;
/// unallocated equity carries no due, so the map sums to the obligation
/// scaled by the allocated share.
pub fn monthly_dues(ledger: &EquityLedger) -> BTreeMap<String, f64> {
    let obligation = ledger.original_monthly_obligation();
    let mut dues = BTreeMap::new();
    dues.insert(
        ledger.occupant_id().to_string(),
        ledger.occupant_equity_percent() / 100.0 * obligation,
    );
    for (investor_id, equity) in ledger.investors() {
        dues.insert(investor_id.clone(), equity / 100.0 * obligation);
    }
    dues
}

/// Values an investor's stake at original and current prices.
///
/// Returns `None` when the id is not a current investor (the occupant's
/// position is reported through [`status_snapshot`], not here).
pub fn share_value(ledger: &EquityLedger, investor_id: &str) -> Option<ShareReport> {
    let equity_percent = *ledger.investors().get(investor_id)?;
    let original_value = ledger.original_purchase_value() * equity_percent / 100.0;
    let current_value = ledger.current_market_value() * equity_percent / 100.0;
    let unrealized_profit = current_value - original_value;
    let profit_percent = if original_value > 0.0 {
        unrealized_profit / original_value * 100.0
    } else {
        0.0
    };

    Some(ShareReport {
        investor_id: investor_id.to_string(),
        equity_percent,
        original_value,
        current_value,
        unrealized_profit,
        profit_percent,
    })
}

/// Compound annual growth rate of the property's market value since
/// origination, in percent.
///
/// `None` until the first sync has brought in an external valuation, when
/// the holding period is too short to annualize, or when the market value
/// has collapsed to zero or below.
pub fn annualized_appreciation(ledger: &EquityLedger, as_of: DateTime<Utc>) -> Option<f64> {
    ledger.last_sync_timestamp()?;

    let years = (as_of - ledger.originated_at()).num_days() as f64 / 365.25;
    if years < MIN_ANNUALIZATION_YEARS {
        return None;
    }
    if ledger.current_market_value() <= 0.0 {
        return None;
    }

    let begin = Decimal::from_f64(ledger.original_purchase_value())?;
    let end = Decimal::from_f64(ledger.current_market_value())?;
    let periods = Decimal::from_f64(years)?;
    let rate = cagr(begin, end, periods);
    Some(rate.to_f64()? * 100.0)
}

/// Read-only projection for external display or ingestion sinks.
pub fn status_snapshot(ledger: &EquityLedger) -> StatusSnapshot {
    StatusSnapshot {
        property_id: ledger.property_id().to_string(),
        address: ledger.address().to_string(),
        occupant_id: ledger.occupant_id().to_string(),
        occupant_equity_percent: ledger.occupant_equity_percent(),
        investor_count: ledger.investor_count(),
        unallocated_percent: ledger.unallocated_percent(),
        current_market_value: ledger.current_market_value(),
        last_sync_timestamp: ledger.last_sync_timestamp(),
    }
}
