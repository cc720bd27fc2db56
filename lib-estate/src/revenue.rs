//! Revenue Pool and Claim Tracker
//!
//! Revenue distribution uses a cumulative revenue-per-unit accumulator with
//! lazy per-holder settlement: a deposit touches one pool record regardless
//! of holder count, and each holder's claim is reconciled only when they
//! withdraw or inspect it. Do not replace this with per-holder iteration on
//! deposit; O(1) deposits are the point of the design.
//!
//! # Invariants
//!
//! - `total_revenue` and `revenue_per_unit` never decrease
//! - `settled_per_unit <= revenue_per_unit` for the same property, always

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use lib_types::{Address, Amount, PropertyId, Timestamp, Units};

use crate::errors::{EstateError, EstateResult};

// ============================================================================
// REVENUE POOL
// ============================================================================

/// Per-property revenue accounting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenuePoolState {
    /// Total currency ever deposited for this property
    pub total_revenue: Amount,

    /// Cumulative revenue per unit, fixed-point integer semantics
    pub revenue_per_unit: Amount,

    /// Clock marker of the last deposit
    pub last_update: Timestamp,
}

/// Staged result of a deposit, computed before any value moves
///
/// All arithmetic happens here so the inbound transfer is the last
/// fallible step; committing is a plain write.
#[derive(Debug, Clone, Copy)]
pub struct DepositStaging {
    /// Accumulator increment, `amount / issued` truncated toward zero
    pub increment: Amount,

    /// Post-deposit totals
    total_revenue: Amount,
    revenue_per_unit: Amount,
}

/// Revenue pools for all properties
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RevenuePool {
    pools: HashMap<PropertyId, RevenuePoolState>,
}

impl RevenuePool {
    /// Create an empty pool set
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize the zero pool state for a newly registered property
    pub fn init_property(&mut self, property: PropertyId, now: Timestamp) {
        self.pools.entry(property).or_insert_with(|| RevenuePoolState {
            total_revenue: 0,
            revenue_per_unit: 0,
            last_update: now,
        });
    }

    /// Current accumulator value (0 if the pool is absent)
    pub fn accumulator(&self, property: PropertyId) -> Amount {
        self.pools
            .get(&property)
            .map(|state| state.revenue_per_unit)
            .unwrap_or(0)
    }

    /// Get the pool state for a property
    pub fn get(&self, property: PropertyId) -> Option<&RevenuePoolState> {
        self.pools.get(&property)
    }

    /// Stage a deposit: compute the accumulator increment and post-deposit
    /// totals without mutating anything
    ///
    /// The increment is `amount / issued` with truncating division; the
    /// remainder stays in the custodial balance indefinitely (dust). With
    /// no units issued the increment is 0 and the full amount is dust.
    pub fn stage_deposit(
        &self,
        property: PropertyId,
        amount: Amount,
        issued: Units,
    ) -> EstateResult<DepositStaging> {
        let state = self
            .pools
            .get(&property)
            .ok_or(EstateError::PropertyNotFound(property))?;

        let increment = if issued > 0 {
            amount / Amount::from(issued)
        } else {
            0
        };

        let total_revenue = state
            .total_revenue
            .checked_add(amount)
            .ok_or(EstateError::Overflow)?;
        let revenue_per_unit = state
            .revenue_per_unit
            .checked_add(increment)
            .ok_or(EstateError::Overflow)?;

        Ok(DepositStaging {
            increment,
            total_revenue,
            revenue_per_unit,
        })
    }

    /// Commit a staged deposit after the inbound transfer succeeded
    pub fn commit_deposit(
        &mut self,
        property: PropertyId,
        staging: DepositStaging,
        now: Timestamp,
    ) -> EstateResult<()> {
        let state = self
            .pools
            .get_mut(&property)
            .ok_or(EstateError::PropertyNotFound(property))?;

        state.total_revenue = staging.total_revenue;
        state.revenue_per_unit = staging.revenue_per_unit;
        state.last_update = now;
        Ok(())
    }
}

// ============================================================================
// CLAIM TRACKER
// ============================================================================

/// Per-(property, holder) settlement checkpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRecord {
    /// Accumulator value already paid out to this holder
    pub settled_per_unit: Amount,

    /// Clock marker of the last settlement
    pub last_claim_at: Timestamp,
}

/// Settlement checkpoints for all holders
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClaimTracker {
    records: HashMap<(PropertyId, Address), ClaimRecord>,
}

impl ClaimTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// A holder's settled accumulator value (0 if no record)
    pub fn baseline(&self, property: PropertyId, holder: &Address) -> Amount {
        self.records
            .get(&(property, *holder))
            .map(|record| record.settled_per_unit)
            .unwrap_or(0)
    }

    /// Get a holder's claim record
    pub fn get(&self, property: PropertyId, holder: &Address) -> Option<&ClaimRecord> {
        self.records.get(&(property, *holder))
    }

    /// Set a first-time buyer's baseline to the current accumulator so they
    /// cannot claim revenue distributed before they held units
    ///
    /// Holders buying additional units keep their existing baseline; the
    /// kernel only calls this when the balance was previously zero.
    pub fn init_baseline(
        &mut self,
        property: PropertyId,
        holder: &Address,
        accumulator: Amount,
        now: Timestamp,
    ) {
        self.records.insert(
            (property, *holder),
            ClaimRecord {
                settled_per_unit: accumulator,
                last_claim_at: now,
            },
        );
    }

    /// Settle a holder fully up to the current accumulator
    pub fn settle(
        &mut self,
        property: PropertyId,
        holder: &Address,
        accumulator: Amount,
        now: Timestamp,
    ) {
        self.records.insert(
            (property, *holder),
            ClaimRecord {
                settled_per_unit: accumulator,
                last_claim_at: now,
            },
        );
    }

    /// Clone a holder's record ahead of a settlement that may need undoing
    pub fn snapshot(&self, property: PropertyId, holder: &Address) -> Option<ClaimRecord> {
        self.records.get(&(property, *holder)).copied()
    }

    /// Put a snapshot back after a failed outbound transfer
    pub fn restore(
        &mut self,
        property: PropertyId,
        holder: &Address,
        prior: Option<ClaimRecord>,
    ) {
        match prior {
            Some(record) => {
                self.records.insert((property, *holder), record);
            }
            None => {
                self.records.remove(&(property, *holder));
            }
        }
    }
}

/// Settle-able amount for a holder: `balance * (accumulator - baseline)`
///
/// Pure and O(1); never fails (absent pools and records read as zero).
pub fn claimable(balance: Units, accumulator: Amount, baseline: Amount) -> Amount {
    Amount::from(balance).saturating_mul(accumulator.saturating_sub(baseline))
}
