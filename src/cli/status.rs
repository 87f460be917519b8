use super::ui;
use crate::core::metrics;
use crate::store::LedgerStore;
use anyhow::{Result, anyhow};
use comfy_table::Cell;

/// Shows one property agreement, or every stored agreement when no id is
/// given.
pub fn run(store: &dyn LedgerStore, property_id: Option<&str>) -> Result<()> {
    let ledgers = match property_id {
        Some(id) => {
            let ledger = store
                .load(id)?
                .ok_or_else(|| anyhow!("No agreement found for property {id}"))?;
            vec![ledger]
        }
        None => store.list()?,
    };

    if ledgers.is_empty() {
        println!("No property agreements found. Run `stakehouse originate` to create one.");
        return Ok(());
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Property"),
        ui::header_cell("Address"),
        ui::header_cell("Occupant"),
        ui::header_cell("Occupant Equity"),
        ui::header_cell("Investors"),
        ui::header_cell("Unallocated"),
        ui::header_cell("Market Value"),
        ui::header_cell("Last Sync"),
    ]);

    for ledger in &ledgers {
        let snapshot = metrics::status_snapshot(ledger);
        table.add_row(vec![
            Cell::new(&snapshot.property_id),
            Cell::new(&snapshot.address),
            Cell::new(&snapshot.occupant_id),
            ui::percent_cell(snapshot.occupant_equity_percent),
            Cell::new(snapshot.investor_count.to_string()),
            ui::percent_cell(snapshot.unallocated_percent),
            ui::money_cell(snapshot.current_market_value),
            ui::format_optional_cell(snapshot.last_sync_timestamp, |ts| {
                ts.format("%Y-%m-%d %H:%M UTC").to_string()
            }),
        ]);
    }

    println!(
        "{}\n\n{table}",
        ui::style_text("Property Agreements", ui::StyleType::Title)
    );
    Ok(())
}
