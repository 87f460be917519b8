//! The equity ledger: ownership state for a single property agreement.
//!
//! One occupant holds a controlling stake, up to [`MAX_INVESTORS`] outside
//! investors hold the rest. All mutation goes through [`EquityLedger::transfer`]
//! and [`EquityLedger::issue`]; both commit atomically or leave the ledger
//! untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, error};

use crate::core::valuation::ValuationDelta;

/// The occupant may never drop below this equity percentage.
pub const MIN_OCCUPANT_EQUITY: f64 = 51.0;

/// Upper bound on distinct outside investors per property.
pub const MAX_INVESTORS: usize = 10;

/// Rounding tolerance for equity percentage sums.
pub const EQUITY_EPSILON: f64 = 0.001;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, EquityError>;

/// Errors that can occur when constructing or mutating an equity ledger.
///
/// Every variant is an expected business outcome, not a fault; a rejected
/// operation leaves the ledger exactly as it was. `InvariantViolation` is the
/// one exception: it signals an internal consistency break that the per-step
/// checks should have made unreachable.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EquityError {
    #[error("invalid equity state: {0}")]
    InvalidEquityState(String),

    #[error("party {0} is not part of this property agreement")]
    UnknownParty(String),

    #[error("{party} holds {held}% equity, cannot sell {requested}%")]
    InsufficientEquity {
        party: String,
        held: f64,
        requested: f64,
    },

    #[error(
        "occupant holds {held}% and cannot drop below {MIN_OCCUPANT_EQUITY}% by selling {requested}%"
    )]
    OccupantFloorViolation { held: f64, requested: f64 },

    #[error("maximum of {MAX_INVESTORS} investors reached")]
    MaxInvestorsExceeded,

    #[error("equity amount must be a positive percentage, got {0}")]
    InvalidAmount(f64),

    #[error("ledger invariant violated after mutation: {0}")]
    InvariantViolation(String),
}

/// Ownership ledger for a single property agreement.
///
/// Invariants, checked after construction and every mutation:
/// - occupant equity never drops below [`MIN_OCCUPANT_EQUITY`]
/// - occupant plus investor equity never exceeds 100% (within [`EQUITY_EPSILON`])
/// - at most [`MAX_INVESTORS`] distinct investors
/// - every stored investor stake is strictly positive
///
/// `original_purchase_value` and `original_monthly_obligation` are fixed at
/// origination and are never touched again; only `current_market_value` moves
/// with the market, via the valuation sync protocol.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EquityLedger {
    pub(crate) property_id: String,
    pub(crate) address: String,
    pub(crate) original_purchase_value: f64,
    pub(crate) original_monthly_obligation: f64,
    pub(crate) current_market_value: f64,
    pub(crate) last_sync_timestamp: Option<DateTime<Utc>>,
    pub(crate) originated_at: DateTime<Utc>,
    pub(crate) occupant_id: String,
    pub(crate) occupant_equity_percent: f64,
    pub(crate) investors: BTreeMap<String, f64>,
}

impl EquityLedger {
    /// Creates a ledger with a freshly generated property id.
    pub fn new(
        address: &str,
        original_purchase_value: f64,
        original_monthly_obligation: f64,
        occupant_id: &str,
        initial_occupant_equity: Option<f64>,
    ) -> Result<Self> {
        let property_id = format!(
            "PROP-{}",
            &uuid::Uuid::new_v4().simple().to_string().to_uppercase()[..8]
        );
        Self::with_property_id(
            &property_id,
            address,
            original_purchase_value,
            original_monthly_obligation,
            occupant_id,
            initial_occupant_equity,
        )
    }

    /// Creates a ledger keyed by an externally assigned property id, e.g. the
    /// valuation warehouse record id. Uniqueness of the id is the caller's
    /// responsibility.
    pub fn with_property_id(
        property_id: &str,
        address: &str,
        original_purchase_value: f64,
        original_monthly_obligation: f64,
        occupant_id: &str,
        initial_occupant_equity: Option<f64>,
    ) -> Result<Self> {
        if original_purchase_value <= 0.0 {
            return Err(EquityError::InvalidEquityState(format!(
                "purchase value must be positive, got {original_purchase_value}"
            )));
        }
        if original_monthly_obligation < 0.0 {
            return Err(EquityError::InvalidEquityState(format!(
                "monthly obligation must not be negative, got {original_monthly_obligation}"
            )));
        }

        let ledger = Self {
            property_id: property_id.to_string(),
            address: address.to_string(),
            original_purchase_value,
            original_monthly_obligation,
            current_market_value: original_purchase_value,
            last_sync_timestamp: None,
            originated_at: Utc::now(),
            occupant_id: occupant_id.to_string(),
            occupant_equity_percent: initial_occupant_equity.unwrap_or(MIN_OCCUPANT_EQUITY),
            investors: BTreeMap::new(),
        };

        // Construction shares the mutation-time invariant check, so a ledger
        // can never be observed in an invalid state.
        ledger.validate().map_err(EquityError::InvalidEquityState)?;
        Ok(ledger)
    }

    pub fn property_id(&self) -> &str {
        &self.property_id
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Legal basis for the fixed obligation. Never changes after origination.
    pub fn original_purchase_value(&self) -> f64 {
        self.original_purchase_value
    }

    /// Fixed recurring obligation. Never changes after origination.
    pub fn original_monthly_obligation(&self) -> f64 {
        self.original_monthly_obligation
    }

    /// Latest externally reported market value; starts equal to the purchase
    /// value until the first sync.
    pub fn current_market_value(&self) -> f64 {
        self.current_market_value
    }

    pub fn last_sync_timestamp(&self) -> Option<DateTime<Utc>> {
        self.last_sync_timestamp
    }

    pub fn originated_at(&self) -> DateTime<Utc> {
        self.originated_at
    }

    pub fn occupant_id(&self) -> &str {
        &self.occupant_id
    }

    pub fn occupant_equity_percent(&self) -> f64 {
        self.occupant_equity_percent
    }

    pub fn investors(&self) -> &BTreeMap<String, f64> {
        &self.investors
    }

    pub fn investor_count(&self) -> usize {
        self.investors.len()
    }

    /// Equity not yet allocated to the occupant or any investor.
    pub fn unallocated_percent(&self) -> f64 {
        100.0 - self.occupant_equity_percent - self.investors.values().sum::<f64>()
    }

    /// Current stake of a party, or `None` if the id is neither the occupant
    /// nor a listed investor.
    pub fn stake_of(&self, party_id: &str) -> Option<f64> {
        if party_id == self.occupant_id {
            Some(self.occupant_equity_percent)
        } else {
            self.investors.get(party_id).copied()
        }
    }

    /// Moves `amount_percent` equity from `seller_id` to `buyer_id`.
    ///
    /// This single operation covers occupant buy-backs, secondary sales
    /// between investors, and sales to a previously unseen investor. The
    /// mutation is staged on a working copy and committed only after the full
    /// invariant check passes, so a rejected transfer is never observable.
    pub fn transfer(&mut self, buyer_id: &str, seller_id: &str, amount_percent: f64) -> Result<()> {
        if !(amount_percent > 0.0) {
            return Err(EquityError::InvalidAmount(amount_percent));
        }

        let mut next = self.clone();
        next.debit(seller_id, amount_percent)?;
        next.credit(buyer_id, amount_percent)?;
        next.validate().map_err(|msg| {
            // The per-step checks should make this unreachable; reaching it
            // is a defect, not a business outcome.
            error!(property_id = %self.property_id, %msg, "Transfer rolled back");
            EquityError::InvariantViolation(msg)
        })?;

        debug!(
            property_id = %self.property_id,
            seller = seller_id,
            buyer = buyer_id,
            amount = amount_percent,
            "Equity transfer committed"
        );
        *self = next;
        Ok(())
    }

    /// Allocates `amount_percent` of unallocated equity to `buyer_id`.
    ///
    /// This is how a new investment enters the agreement without routing
    /// through the occupant's stake (which may sit exactly at the floor).
    pub fn issue(&mut self, buyer_id: &str, amount_percent: f64) -> Result<()> {
        if !(amount_percent > 0.0) {
            return Err(EquityError::InvalidAmount(amount_percent));
        }

        let unallocated = self.unallocated_percent();
        if amount_percent > unallocated + EQUITY_EPSILON {
            return Err(EquityError::InsufficientEquity {
                party: "unallocated pool".to_string(),
                held: unallocated,
                requested: amount_percent,
            });
        }

        let mut next = self.clone();
        next.credit(buyer_id, amount_percent)?;
        next.validate().map_err(|msg| {
            error!(property_id = %self.property_id, %msg, "Issue rolled back");
            EquityError::InvariantViolation(msg)
        })?;

        debug!(
            property_id = %self.property_id,
            buyer = buyer_id,
            amount = amount_percent,
            "Equity issue committed"
        );
        *self = next;
        Ok(())
    }

    /// Commits a fresh market valuation. The two `original_*` fields are
    /// deliberately untouched: the obligation is fixed at origination and does
    /// not float with the market.
    pub(crate) fn apply_valuation(&mut self, new_value: f64, now: DateTime<Utc>) -> ValuationDelta {
        let previous_value = self.current_market_value;
        let change = new_value - previous_value;
        let change_percent_of_original = change / self.original_purchase_value * 100.0;

        self.current_market_value = new_value;
        self.last_sync_timestamp = Some(now);

        ValuationDelta {
            property_id: self.property_id.clone(),
            previous_value,
            new_value,
            change,
            change_percent_of_original,
        }
    }

    fn debit(&mut self, seller_id: &str, amount: f64) -> Result<()> {
        if seller_id == self.occupant_id {
            if self.occupant_equity_percent < amount {
                return Err(EquityError::InsufficientEquity {
                    party: seller_id.to_string(),
                    held: self.occupant_equity_percent,
                    requested: amount,
                });
            }
            if self.occupant_equity_percent - amount < MIN_OCCUPANT_EQUITY {
                return Err(EquityError::OccupantFloorViolation {
                    held: self.occupant_equity_percent,
                    requested: amount,
                });
            }
            self.occupant_equity_percent -= amount;
        } else if let Some(stake) = self.investors.get_mut(seller_id) {
            if *stake < amount {
                return Err(EquityError::InsufficientEquity {
                    party: seller_id.to_string(),
                    held: *stake,
                    requested: amount,
                });
            }
            *stake -= amount;
            // A fully divested investor leaves the agreement; zero-value
            // entries are never stored.
            if *stake <= 0.0 {
                self.investors.remove(seller_id);
            }
        } else {
            return Err(EquityError::UnknownParty(seller_id.to_string()));
        }
        Ok(())
    }

    fn credit(&mut self, buyer_id: &str, amount: f64) -> Result<()> {
        if buyer_id == self.occupant_id {
            self.occupant_equity_percent += amount;
        } else if let Some(stake) = self.investors.get_mut(buyer_id) {
            *stake += amount;
        } else {
            if self.investors.len() >= MAX_INVESTORS {
                return Err(EquityError::MaxInvestorsExceeded);
            }
            self.investors.insert(buyer_id.to_string(), amount);
        }
        Ok(())
    }

    fn validate(&self) -> std::result::Result<(), String> {
        let investor_total: f64 = self.investors.values().sum();
        let total = self.occupant_equity_percent + investor_total;

        if self.occupant_equity_percent < MIN_OCCUPANT_EQUITY {
            return Err(format!(
                "occupant equity {}% below the {MIN_OCCUPANT_EQUITY}% floor",
                self.occupant_equity_percent
            ));
        }
        if total > 100.0 + EQUITY_EPSILON {
            return Err(format!("total equity {total}% exceeds 100%"));
        }
        if self.investors.len() > MAX_INVESTORS {
            return Err(format!(
                "{} investors exceeds the maximum of {MAX_INVESTORS}",
                self.investors.len()
            ));
        }
        if let Some((id, stake)) = self.investors.iter().find(|(_, s)| **s <= 0.0) {
            return Err(format!("investor {id} holds a non-positive stake {stake}%"));
        }
        Ok(())
    }
}
