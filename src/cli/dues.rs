use super::ui;
use crate::core::metrics;
use crate::store::LedgerStore;
use anyhow::{Result, anyhow};
use comfy_table::Cell;

/// Shows the monthly dues apportionment for one property.
///
/// Dues derive from the fixed origination obligation, so this table never
/// moves with the market.
pub fn run(store: &dyn LedgerStore, property_id: &str) -> Result<()> {
    let ledger = store
        .load(property_id)?
        .ok_or_else(|| anyhow!("No agreement found for property {property_id}"))?;

    let dues = metrics::monthly_dues(&ledger);

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Party"),
        ui::header_cell("Equity"),
        ui::header_cell("Monthly Due"),
    ]);

    for (party_id, due) in &dues {
        let label = if party_id == ledger.occupant_id() {
            format!("{party_id} (occupant)")
        } else {
            party_id.clone()
        };
        // Every party in the dues map holds a stake by construction.
        let equity = ledger.stake_of(party_id).unwrap_or(0.0);
        table.add_row(vec![
            Cell::new(label),
            ui::percent_cell(equity),
            ui::money_cell(*due),
        ]);
    }

    let total: f64 = dues.values().sum();
    println!(
        "{}\n\n{table}\n\nTotal due: {}  (fixed obligation: {})",
        ui::style_text(
            &format!("Monthly Dues - {property_id}"),
            ui::StyleType::Title
        ),
        ui::style_text(&format!("{total:.2}"), ui::StyleType::TotalValue),
        ui::style_text(
            &format!("{:.2}", ledger.original_monthly_obligation()),
            ui::StyleType::TotalLabel
        )
    );
    Ok(())
}
