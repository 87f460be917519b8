use crate::store::LedgerStore;
use anyhow::{Context, Result, anyhow};
use tracing::info;

fn load_required(
    store: &dyn LedgerStore,
    property_id: &str,
) -> Result<crate::core::ledger::EquityLedger> {
    store
        .load(property_id)?
        .ok_or_else(|| anyhow!("No agreement found for property {property_id}"))
}

/// Moves equity from a current stakeholder to a buyer and persists the
/// resulting snapshot. A rejected transfer changes nothing.
pub fn run_transfer(
    store: &dyn LedgerStore,
    property_id: &str,
    buyer_id: &str,
    seller_id: &str,
    amount_percent: f64,
) -> Result<()> {
    let mut ledger = load_required(store, property_id)?;

    ledger
        .transfer(buyer_id, seller_id, amount_percent)
        .with_context(|| {
            format!("Transfer of {amount_percent}% from {seller_id} to {buyer_id} rejected")
        })?;
    store.save(&ledger)?;

    info!(
        property_id,
        seller = seller_id,
        buyer = buyer_id,
        amount = amount_percent,
        "Equity transferred"
    );
    println!(
        "{seller_id} sold {amount_percent:.2}% of {property_id} to {buyer_id}. \
         Occupant holds {:.2}%, {} investor(s), {:.2}% unallocated.",
        ledger.occupant_equity_percent(),
        ledger.investor_count(),
        ledger.unallocated_percent()
    );
    Ok(())
}

/// Issues equity from the unallocated pool to an investor and persists the
/// resulting snapshot.
pub fn run_issue(
    store: &dyn LedgerStore,
    property_id: &str,
    investor_id: &str,
    amount_percent: f64,
) -> Result<()> {
    let mut ledger = load_required(store, property_id)?;

    ledger.issue(investor_id, amount_percent).with_context(|| {
        format!("Issue of {amount_percent}% to {investor_id} rejected")
    })?;
    store.save(&ledger)?;

    info!(
        property_id,
        investor = investor_id,
        amount = amount_percent,
        "Equity issued"
    );
    println!(
        "Issued {amount_percent:.2}% of {property_id} to {investor_id}. \
         {:.2}% remains unallocated.",
        ledger.unallocated_percent()
    );
    Ok(())
}
