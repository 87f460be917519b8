use crate::core::config::AppConfig;
use crate::core::ledger::EquityLedger;
use crate::core::valuation::ValuationProvider;
use crate::store::LedgerStore;
use anyhow::{Context, Result, anyhow, bail};
use tracing::info;

/// Originates a new property agreement from a warehouse valuation record.
///
/// The estimated value becomes the fixed original purchase value, and the
/// fixed monthly obligation is priced once as `value * obligation_rate`.
/// Later market moves never revisit either figure.
pub async fn run(
    config: &AppConfig,
    store: &dyn LedgerStore,
    provider: &dyn ValuationProvider,
    property_id: &str,
    occupant_id: &str,
    address: Option<&str>,
) -> Result<()> {
    if store.load(property_id)?.is_some() {
        bail!("Property {property_id} already has an agreement");
    }

    let value = provider
        .current_value(property_id)
        .await
        .with_context(|| format!("Failed to fetch a valuation for property {property_id}"))?
        .ok_or_else(|| anyhow!("Property {property_id} not found in the valuation warehouse"))?;

    let obligation = value * config.obligation_rate;
    // Address data lives in a separate warehouse table; fall back to the id
    // until a join is wired up.
    let address = address
        .map(str::to_string)
        .unwrap_or_else(|| format!("Property {property_id}"));

    let ledger = EquityLedger::with_property_id(
        property_id,
        &address,
        value,
        obligation,
        occupant_id,
        None,
    )?;
    store.save(&ledger)?;

    info!(
        property_id,
        occupant_id,
        purchase_value = value,
        monthly_obligation = obligation,
        "Property agreement originated"
    );
    println!(
        "Originated agreement for {property_id}: purchase value {value:.2}, \
         monthly obligation {obligation:.2}, occupant {occupant_id} at {}%",
        ledger.occupant_equity_percent()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use async_trait::async_trait;

    struct FixedProvider(Option<f64>);

    #[async_trait]
    impl ValuationProvider for FixedProvider {
        async fn current_value(&self, _property_id: &str) -> Result<Option<f64>> {
            Ok(self.0)
        }
    }

    fn test_config() -> AppConfig {
        serde_yaml::from_str("{}").unwrap()
    }

    #[tokio::test]
    async fn test_originate_prices_the_obligation_once() {
        let store = MemoryStore::new();
        let provider = FixedProvider(Some(500_000.0));

        run(&test_config(), &store, &provider, "PROP-1", "alice", None)
            .await
            .unwrap();

        let ledger = store.load("PROP-1").unwrap().unwrap();
        assert_eq!(ledger.original_purchase_value(), 500_000.0);
        assert_eq!(ledger.original_monthly_obligation(), 2_500.0);
        assert_eq!(ledger.occupant_id(), "alice");
        assert_eq!(ledger.address(), "Property PROP-1");
    }

    #[tokio::test]
    async fn test_originate_rejects_unknown_property() {
        let store = MemoryStore::new();
        let provider = FixedProvider(None);

        let err = run(&test_config(), &store, &provider, "PROP-9", "alice", None)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("not found"));
        assert!(store.load("PROP-9").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_originate_refuses_to_overwrite() {
        let store = MemoryStore::new();
        let provider = FixedProvider(Some(500_000.0));

        run(&test_config(), &store, &provider, "PROP-1", "alice", None)
            .await
            .unwrap();
        let err = run(&test_config(), &store, &provider, "PROP-1", "bob", None)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("already has an agreement"));
        // The original occupant is untouched.
        let ledger = store.load("PROP-1").unwrap().unwrap();
        assert_eq!(ledger.occupant_id(), "alice");
    }
}
