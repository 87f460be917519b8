pub mod disk;
pub mod memory;

use crate::core::config::AppConfig;
use crate::core::ledger::EquityLedger;
use anyhow::Result;
use disk::DiskStore;

/// Persistence seam for ledger snapshots, keyed by property id.
///
/// The core never sees the storage format; it hands over a serializable
/// ledger and gets one back. Ledgers for distinct properties are fully
/// independent, so implementations only need per-key consistency.
pub trait LedgerStore: Send + Sync {
    fn load(&self, property_id: &str) -> Result<Option<EquityLedger>>;
    fn save(&self, ledger: &EquityLedger) -> Result<()>;
    fn remove(&self, property_id: &str) -> Result<bool>;
    /// All stored ledgers, ordered by property id.
    fn list(&self) -> Result<Vec<EquityLedger>>;
}

/// Opens the on-disk store under the configured data directory.
pub fn open_default(config: &AppConfig) -> Result<DiskStore> {
    DiskStore::open(&config.default_data_path()?.join("ledgers"))
}
