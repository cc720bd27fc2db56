//! Estate Kernel - Composed Operation Surface
//!
//! The kernel owns one instance of each component (registry, token ledger,
//! revenue pool, claim tracker, governance engine) and exposes the full
//! public operation surface. Caller identity and the clock enter every
//! operation as explicit parameters; nothing is read from ambient state.
//!
//! # Atomicity
//!
//! Each operation validates and stages everything before the payment rail
//! is invoked, so a failed transfer aborts with no mutation. The one
//! exception is withdrawal, where the settlement checkpoint is written
//! before the outbound transfer and restored if the rail rejects it.
//!
//! # Invariants
//!
//! - For every property, `sum(balances) == issued_units <= total_supply`
//! - `revenue_per_unit` never decreases; holder baselines never exceed it
//! - First-unit buyers start their claim baseline at the current
//!   accumulator; repeat buyers keep the baseline from their first purchase

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use lib_governance::{Ballot, GovernanceEngine, Proposal};
use lib_types::{Address, Amount, PropertyId, ProposalId, Timestamp, Units};

use crate::errors::{EstateError, EstateResult};
use crate::ledger::TokenLedger;
use crate::rail::PaymentRail;
use crate::registry::{Property, PropertyRegistry};
use crate::revenue::{self, ClaimTracker, RevenuePool, RevenuePoolState};

/// Composed fractional-ownership ledger
///
/// Each component exclusively owns its own records; the kernel is the only
/// place where cross-component flows (purchase, deposit, withdrawal,
/// governance gating) are wired together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstateKernel {
    registry: PropertyRegistry,
    ledger: TokenLedger,
    pool: RevenuePool,
    claims: ClaimTracker,
    governance: GovernanceEngine,
}

impl EstateKernel {
    /// Create an empty kernel under the given registrar
    pub fn new(registrar: Address) -> Self {
        Self {
            registry: PropertyRegistry::new(registrar),
            ledger: TokenLedger::new(),
            pool: RevenuePool::new(),
            claims: ClaimTracker::new(),
            governance: GovernanceEngine::new(),
        }
    }

    /// The process-wide registrar address
    pub fn registrar(&self) -> &Address {
        self.registry.registrar()
    }

    // ========================================================================
    // PROPERTY REGISTRATION
    // ========================================================================

    /// Register a property and initialize its ledger, pool, and proposal
    /// sequence in the same mutation
    ///
    /// # Errors
    ///
    /// - `Unauthorized` unless `caller` is the registrar
    /// - `InvalidInput` on zero supply, zero price, or empty name/location
    pub fn register_property(
        &mut self,
        name: String,
        location: String,
        total_supply: Units,
        price_per_unit: Amount,
        caller: Address,
        now: Timestamp,
    ) -> EstateResult<PropertyId> {
        let id = self
            .registry
            .register(name, location, total_supply, price_per_unit, caller, now)?;
        self.pool.init_property(id, now);
        self.governance.init_property(id);
        Ok(id)
    }

    /// Deactivate a property (one-way; admin only)
    pub fn deactivate_property(&mut self, property: PropertyId, caller: Address) -> EstateResult<()> {
        self.registry.deactivate(property, caller)
    }

    // ========================================================================
    // UNIT PURCHASE
    // ========================================================================

    /// Purchase units against the supply cap
    ///
    /// Cost is `amount * price_per_unit`; the inbound transfer is the last
    /// fallible step, so a rejected payment leaves the ledger untouched.
    ///
    /// # Errors
    ///
    /// - `PropertyNotFound` / `InactiveProperty`
    /// - `InvalidInput` on a zero amount
    /// - `InsufficientCapacity` beyond the supply cap
    /// - `Overflow` on cost computation
    /// - `TransferFailed` from the payment rail
    pub fn purchase_units(
        &mut self,
        property: PropertyId,
        amount: Units,
        buyer: Address,
        now: Timestamp,
        rail: &dyn PaymentRail,
    ) -> EstateResult<Units> {
        let record = self.registry.require_active(property)?;
        let total_supply = record.total_supply;
        let price_per_unit = record.price_per_unit;

        if amount == 0 {
            return Err(EstateError::InvalidInput(
                "purchase amount must be greater than zero".to_string(),
            ));
        }

        let issued = self.ledger.issued_units(property);
        let would_issue = issued.checked_add(amount).ok_or(EstateError::Overflow)?;
        if would_issue > total_supply {
            return Err(EstateError::InsufficientCapacity {
                requested: amount,
                available: total_supply - issued,
            });
        }

        let cost = Amount::from(amount)
            .checked_mul(price_per_unit)
            .ok_or(EstateError::Overflow)?;

        let first_units = self.ledger.balance_of(property, &buyer) == 0;

        rail.transfer_in(&buyer, cost)?;

        self.ledger.credit(property, &buyer, amount)?;
        if first_units {
            // Baseline at the current accumulator: revenue distributed
            // before this holder existed is not claimable by them.
            let accumulator = self.pool.accumulator(property);
            self.claims.init_baseline(property, &buyer, accumulator, now);
        }

        info!(property, buyer = %buyer, amount, cost, "units purchased");
        Ok(amount)
    }

    // ========================================================================
    // REVENUE
    // ========================================================================

    /// Deposit revenue into a property's pool
    ///
    /// The accumulator advances by `amount / issued_units` (truncating);
    /// the remainder stays in custody as dust. Only the property's own
    /// admin may deposit.
    pub fn deposit_revenue(
        &mut self,
        property: PropertyId,
        amount: Amount,
        caller: Address,
        now: Timestamp,
        rail: &dyn PaymentRail,
    ) -> EstateResult<Amount> {
        let record = self.registry.require_active(property)?;
        if caller != record.admin {
            return Err(EstateError::Unauthorized(
                "only the property admin can deposit revenue".to_string(),
            ));
        }

        if amount == 0 {
            return Err(EstateError::InvalidInput(
                "deposit amount must be greater than zero".to_string(),
            ));
        }

        let issued = self.ledger.issued_units(property);
        let staging = self.pool.stage_deposit(property, amount, issued)?;

        rail.transfer_in(&caller, amount)?;
        self.pool.commit_deposit(property, staging, now)?;

        info!(
            property,
            amount,
            increment = staging.increment,
            "revenue deposited"
        );
        Ok(amount)
    }

    /// Settle-able amount for a holder (0 for absent properties or pools)
    pub fn claimable(&self, property: PropertyId, holder: &Address) -> Amount {
        if self.registry.get(property).is_none() {
            return 0;
        }
        revenue::claimable(
            self.ledger.balance_of(property, holder),
            self.pool.accumulator(property),
            self.claims.baseline(property, holder),
        )
    }

    /// Withdraw a holder's accrued income
    ///
    /// Settlement is written before the outbound transfer; a rail failure
    /// restores the prior checkpoint so the two never diverge.
    ///
    /// # Errors
    ///
    /// - `PropertyNotFound` / `InactiveProperty`
    /// - `InsufficientBalance` when the caller holds no units
    /// - `NoIncomeAvailable` when nothing has accrued since last settlement
    /// - `TransferFailed` from the payment rail
    pub fn withdraw_income(
        &mut self,
        property: PropertyId,
        caller: Address,
        now: Timestamp,
        rail: &dyn PaymentRail,
    ) -> EstateResult<Amount> {
        self.registry.require_active(property)?;

        let balance = self.ledger.balance_of(property, &caller);
        if balance == 0 {
            return Err(EstateError::InsufficientBalance { have: 0, need: 1 });
        }

        let accumulator = self.pool.accumulator(property);
        let baseline = self.claims.baseline(property, &caller);
        let delta = accumulator
            .checked_sub(baseline)
            .ok_or(EstateError::Overflow)?;
        let payout = Amount::from(balance)
            .checked_mul(delta)
            .ok_or(EstateError::Overflow)?;

        if payout == 0 {
            return Err(EstateError::NoIncomeAvailable);
        }

        let prior = self.claims.snapshot(property, &caller);
        self.claims.settle(property, &caller, accumulator, now);

        if let Err(err) = rail.transfer_out(&caller, payout) {
            warn!(property, holder = %caller, payout, "payout rejected by rail, settlement restored");
            self.claims.restore(property, &caller, prior);
            return Err(err);
        }

        info!(property, holder = %caller, payout, "income withdrawn");
        Ok(payout)
    }

    // ========================================================================
    // GOVERNANCE
    // ========================================================================

    /// Submit a proposal; the creator must hold 5% of the supply cap
    #[allow(clippy::too_many_arguments)]
    pub fn submit_proposal(
        &mut self,
        property: PropertyId,
        title: String,
        description: String,
        duration: u64,
        category: String,
        caller: Address,
        now: Timestamp,
    ) -> EstateResult<ProposalId> {
        let record = self.registry.require_active(property)?;
        let total_supply = record.total_supply;
        let balance = self.ledger.balance_of(property, &caller);

        let id = self.governance.submit(
            property,
            title,
            description,
            category,
            duration,
            caller,
            balance,
            total_supply,
            now,
        )?;

        info!(property, proposal = id, creator = %caller, "proposal submitted");
        Ok(id)
    }

    /// Cast or overwrite a ballot, weighted by the caller's current balance
    pub fn cast_vote(
        &mut self,
        property: PropertyId,
        proposal: ProposalId,
        support: bool,
        caller: Address,
        now: Timestamp,
    ) -> EstateResult<()> {
        self.registry.require_active(property)?;

        if self.governance.get(property, proposal).is_none() {
            return Err(EstateError::ProposalNotFound { property, proposal });
        }

        let balance = self.ledger.balance_of(property, &caller);
        if balance == 0 {
            return Err(EstateError::InsufficientBalance { have: 0, need: 1 });
        }

        self.governance
            .cast_vote(property, proposal, support, caller, balance, now)?;
        Ok(())
    }

    /// Execute a proposal after its window closes
    ///
    /// Execution records an authorization signal only; acting on the
    /// decision is an external collaborator's responsibility.
    pub fn execute_proposal(
        &mut self,
        property: PropertyId,
        proposal: ProposalId,
        caller: Address,
        now: Timestamp,
    ) -> EstateResult<()> {
        let record = self.registry.require_active(property)?;
        let total_supply = record.total_supply;

        self.governance
            .execute(property, proposal, total_supply, now)?;

        info!(property, proposal, executor = %caller, "proposal executed");
        Ok(())
    }

    // ========================================================================
    // READ OPERATIONS
    // ========================================================================

    /// Get a property by id
    pub fn get_property(&self, property: PropertyId) -> Option<&Property> {
        self.registry.get(property)
    }

    /// Number of registered properties
    pub fn property_count(&self) -> u64 {
        self.registry.count()
    }

    /// Balance of a holder in a property (0 if no record)
    pub fn balance_of(&self, property: PropertyId, holder: &Address) -> Units {
        self.ledger.balance_of(property, holder)
    }

    /// Units issued so far for a property
    pub fn issued_units(&self, property: PropertyId) -> Units {
        self.ledger.issued_units(property)
    }

    /// Revenue pool state for a property
    pub fn get_pool(&self, property: PropertyId) -> Option<&RevenuePoolState> {
        self.pool.get(property)
    }

    /// Get a proposal
    pub fn get_proposal(&self, property: PropertyId, proposal: ProposalId) -> Option<&Proposal> {
        self.governance.get(property, proposal)
    }

    /// Get a voter's recorded ballot
    pub fn get_ballot(
        &self,
        property: PropertyId,
        proposal: ProposalId,
        voter: &Address,
    ) -> Option<&Ballot> {
        self.governance.ballot(property, proposal, voter)
    }

    /// Number of proposals submitted for a property
    pub fn proposal_count(&self, property: PropertyId) -> u64 {
        self.governance.proposal_count(property)
    }

    /// Conservation audit: `sum(balances) == issued_units <= total_supply`
    pub fn audit_supply(&self, property: PropertyId) -> bool {
        match self.registry.get(property) {
            Some(record) => self.ledger.audit_supply(property, record.total_supply),
            None => self.ledger.issued_units(property) == 0,
        }
    }

    // ========================================================================
    // PERSISTENCE
    // ========================================================================

    /// Serialize the whole kernel state to a file (bincode)
    pub fn save_to_file(&self, path: &Path) -> EstateResult<()> {
        let bytes =
            bincode::serialize(self).map_err(|err| EstateError::Storage(err.to_string()))?;
        std::fs::write(path, bytes).map_err(|err| EstateError::Storage(err.to_string()))
    }

    /// Restore a kernel from a snapshot file
    pub fn load_from_file(path: &Path) -> EstateResult<Self> {
        let bytes = std::fs::read(path).map_err(|err| EstateError::Storage(err.to_string()))?;
        bincode::deserialize(&bytes).map_err(|err| EstateError::Storage(err.to_string()))
    }
}
