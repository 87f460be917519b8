use super::LedgerStore;
use crate::core::ledger::EquityLedger;
use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// In-memory store for tests and embedding library callers.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<BTreeMap<String, EquityLedger>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for MemoryStore {
    fn load(&self, property_id: &str) -> Result<Option<EquityLedger>> {
        let ledgers = self.inner.read().unwrap();
        Ok(ledgers.get(property_id).cloned())
    }

    fn save(&self, ledger: &EquityLedger) -> Result<()> {
        let mut ledgers = self.inner.write().unwrap();
        ledgers.insert(ledger.property_id().to_string(), ledger.clone());
        Ok(())
    }

    fn remove(&self, property_id: &str) -> Result<bool> {
        let mut ledgers = self.inner.write().unwrap();
        Ok(ledgers.remove(property_id).is_some())
    }

    fn list(&self) -> Result<Vec<EquityLedger>> {
        let ledgers = self.inner.read().unwrap();
        Ok(ledgers.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_ledger(property_id: &str) -> EquityLedger {
        EquityLedger::with_property_id(
            property_id,
            "12 Birchwood Lane",
            500_000.0,
            2_500.0,
            "alice",
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_save_load_roundtrip() {
        let store = MemoryStore::new();
        let ledger = sample_ledger("PROP-1");

        assert!(store.load("PROP-1").unwrap().is_none());
        store.save(&ledger).unwrap();
        assert_eq!(store.load("PROP-1").unwrap(), Some(ledger));
    }

    #[test]
    fn test_save_overwrites_previous_snapshot() {
        let store = MemoryStore::new();
        let mut ledger = sample_ledger("PROP-1");
        store.save(&ledger).unwrap();

        ledger.issue("bob", 20.0).unwrap();
        store.save(&ledger).unwrap();

        let loaded = store.load("PROP-1").unwrap().unwrap();
        assert_eq!(loaded.stake_of("bob"), Some(20.0));
    }

    #[test]
    fn test_remove() {
        let store = MemoryStore::new();
        store.save(&sample_ledger("PROP-1")).unwrap();

        assert!(store.remove("PROP-1").unwrap());
        assert!(!store.remove("PROP-1").unwrap());
        assert!(store.load("PROP-1").unwrap().is_none());
    }

    #[test]
    fn test_list_is_ordered_by_property_id() {
        let store = MemoryStore::new();
        store.save(&sample_ledger("PROP-2")).unwrap();
        store.save(&sample_ledger("PROP-1")).unwrap();

        let ids: Vec<String> = store
            .list()
            .unwrap()
            .iter()
            .map(|l| l.property_id().to_string())
            .collect();
        assert_eq!(ids, vec!["PROP-1", "PROP-2"]);
    }
}
