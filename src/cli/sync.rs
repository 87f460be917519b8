use super::ui;
use crate::core::valuation::{ValuationProvider, sync_valuation};
use crate::store::LedgerStore;
use anyhow::{Context, Result, anyhow};
use futures::future::join_all;

/// Refreshes the market valuation for one property, or for every stored
/// agreement when no id is given.
///
/// Ledgers are independent, so the batch fans out concurrently. A failed
/// sync leaves that ledger's snapshot untouched and does not abort the
/// rest of the batch.
pub async fn run(
    store: &dyn LedgerStore,
    provider: &dyn ValuationProvider,
    property_id: Option<&str>,
) -> Result<()> {
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
        println!("No property agreements to sync.");
        return Ok(());
    }

    let single = property_id.is_some();
    let total = ledgers.len();

    let pb = ui::new_progress_bar(total as u64, true);
    pb.set_message("Syncing valuations...");

    let sync_futures = ledgers.into_iter().map(|mut ledger| {
        let pb_clone = pb.clone();
        async move {
            let result = sync_valuation(&mut ledger, provider).await;
            pb_clone.inc(1);
            (ledger, result)
        }
    });
    let results = join_all(sync_futures).await;
    pb.finish_and_clear();

    let mut failed = 0;
    for (ledger, result) in results {
        match result {
            Ok(delta) => {
                store.save(&ledger)?;
                let change = format!(
                    "{:+.2} ({:+.2}% of original)",
                    delta.change, delta.change_percent_of_original
                );
                let styled_change = if delta.change >= 0.0 {
                    console::style(change).green()
                } else {
                    console::style(change).red()
                };
                println!(
                    "{}: {:.2} -> {:.2}  {styled_change}",
                    delta.property_id, delta.previous_value, delta.new_value
                );
            }
            Err(e) => {
                failed += 1;
                if single {
                    return Err(e).with_context(|| {
                        format!("Failed to sync property {}", ledger.property_id())
                    });
                }
                println!(
                    "{}",
                    ui::style_text(
                        &format!("{}: sync failed: {e}", ledger.property_id()),
                        ui::StyleType::Error
                    )
                );
            }
        }
    }

    if failed > 0 {
        println!(
            "\n{}",
            ui::style_text(
                &format!("{failed} of {total} properties failed to sync"),
                ui::StyleType::Error
            )
        );
    }
    Ok(())
}
