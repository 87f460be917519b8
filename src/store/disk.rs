use super::LedgerStore;
use crate::core::ledger::EquityLedger;
use anyhow::{Context, Result};
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

/// Durable ledger store backed by a fjall keyspace, one JSON snapshot per
/// property id. Writes are synced before returning; losing an equity
/// mutation is not acceptable the way losing a cached price would be.
pub struct DiskStore {
    keyspace: Keyspace,
    ledgers: PartitionHandle,
}

impl DiskStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create data directory: {}", path.display()))?;

        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("Failed to open ledger store at {}", path.display()))?;
        let ledgers = keyspace
            .open_partition("ledgers", PartitionCreateOptions::default())
            .context("Failed to open ledgers partition")?;

        Ok(Self { keyspace, ledgers })
    }
}

impl LedgerStore for DiskStore {
    fn load(&self, property_id: &str) -> Result<Option<EquityLedger>> {
        match self.ledgers.get(property_id)? {
            Some(bytes) => {
                let ledger: EquityLedger = serde_json::from_slice(&bytes)
                    .with_context(|| format!("Corrupt ledger snapshot for {property_id}"))?;
                Ok(Some(ledger))
            }
            None => Ok(None),
        }
    }

    fn save(&self, ledger: &EquityLedger) -> Result<()> {
        let snapshot = serde_json::to_vec(ledger).context("Failed to serialize ledger")?;
        self.ledgers.insert(ledger.property_id(), snapshot)?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        debug!(property_id = %ledger.property_id(), "Ledger snapshot saved");
        Ok(())
    }

    fn remove(&self, property_id: &str) -> Result<bool> {
        let existed = self.ledgers.get(property_id)?.is_some();
        self.ledgers.remove(property_id)?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(existed)
    }

    fn list(&self) -> Result<Vec<EquityLedger>> {
        let mut ledgers = Vec::new();
        for entry in self.ledgers.iter() {
            let (key, value) = entry?;
            let ledger: EquityLedger = serde_json::from_slice(&value).with_context(|| {
                format!(
                    "Corrupt ledger snapshot for {}",
                    String::from_utf8_lossy(&key)
                )
            })?;
            ledgers.push(ledger);
        }
        Ok(ledgers)
    }
}
