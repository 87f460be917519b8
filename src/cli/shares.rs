use super::ui;
use crate::core::metrics;
use crate::store::LedgerStore;
use anyhow::{Result, anyhow};
use chrono::Utc;
use comfy_table::Cell;

/// Shows share value and unrealized profit for one investor, or for all
/// investors of the property when no investor is given.
pub fn run(store: &dyn LedgerStore, property_id: &str, investor_id: Option<&str>) -> Result<()> {
    let ledger = store
        .load(property_id)?
        .ok_or_else(|| anyhow!("No agreement found for property {property_id}"))?;

    let reports: Vec<_> = match investor_id {
        Some(id) => {
            let report = metrics::share_value(&ledger, id)
                .ok_or_else(|| anyhow!("{id} holds no equity in property {property_id}"))?;
            vec![report]
        }
        None => ledger
            .investors()
            .keys()
            .filter_map(|id| metrics::share_value(&ledger, id))
            .collect(),
    };

    if reports.is_empty() {
        println!("No investors hold equity in {property_id}.");
        return Ok(());
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Investor"),
        ui::header_cell("Equity"),
        ui::header_cell("Original Value"),
        ui::header_cell("Current Value"),
        ui::header_cell("Unrealized Profit"),
        ui::header_cell("Profit (%)"),
    ]);

    for report in &reports {
        table.add_row(vec![
            Cell::new(&report.investor_id),
            ui::percent_cell(report.equity_percent),
            ui::money_cell(report.original_value),
            ui::money_cell(report.current_value),
            ui::change_cell(report.unrealized_profit, ""),
            ui::change_cell(report.profit_percent, "%"),
        ]);
    }

    let mut output = format!(
        "{}\n\n{table}",
        ui::style_text(
            &format!("Investor Shares - {property_id}"),
            ui::StyleType::Title
        )
    );
    if let Some(rate) = metrics::annualized_appreciation(&ledger, Utc::now()) {
        output.push_str(&format!(
            "\n\nAnnualized appreciation since origination: {}",
            ui::style_text(&format!("{rate:.2}%"), ui::StyleType::TotalValue)
        ));
    }
    println!("{output}");
    Ok(())
}
