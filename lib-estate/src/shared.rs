//! Shared Kernel Handle
//!
//! Reproduces the source execution model on a multi-threaded host: every
//! mutation holds the write lock for the whole call (global serialization,
//! no observable interleaving per property), and queries take the read
//! lock so they observe a consistent snapshot. A read-only access mode
//! fails all mutation entrypoints closed.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use lib_governance::Proposal;
use lib_types::{Address, Amount, PropertyId, ProposalId, Timestamp, Units};

use crate::errors::{EstateError, EstateResult};
use crate::kernel::EstateKernel;
use crate::rail::PaymentRail;
use crate::registry::Property;

/// Access mode for kernel mutations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Allows read/write operations on all entrypoints
    ReadWrite,
    /// Allows read-only operations; all mutation entrypoints fail closed
    ReadOnly,
}

/// Shared, serialized access to an [`EstateKernel`]
#[derive(Debug, Clone)]
pub struct SharedKernel {
    kernel: Arc<RwLock<EstateKernel>>,
    access_mode: Arc<RwLock<AccessMode>>,
}

impl SharedKernel {
    /// Wrap a kernel for shared access (read-write by default)
    pub fn new(kernel: EstateKernel) -> Self {
        Self {
            kernel: Arc::new(RwLock::new(kernel)),
            access_mode: Arc::new(RwLock::new(AccessMode::ReadWrite)),
        }
    }

    /// Configure kernel mutation access mode
    pub async fn set_access_mode(&self, access_mode: AccessMode) {
        *self.access_mode.write().await = access_mode;
        info!("kernel access mode set to {:?}", access_mode);
    }

    async fn ensure_write_access(&self, operation: &str) -> EstateResult<()> {
        match *self.access_mode.read().await {
            AccessMode::ReadWrite => Ok(()),
            AccessMode::ReadOnly => Err(EstateError::Unauthorized(format!(
                "rejected kernel mutation '{}': handle is in read-only mode",
                operation
            ))),
        }
    }

    // ========================================================================
    // MUTATIONS (whole-call write lock)
    // ========================================================================

    /// Register a property
    pub async fn register_property(
        &self,
        name: String,
        location: String,
        total_supply: Units,
        price_per_unit: Amount,
        caller: Address,
        now: Timestamp,
    ) -> EstateResult<PropertyId> {
        self.ensure_write_access("register_property").await?;
        self.kernel
            .write()
            .await
            .register_property(name, location, total_supply, price_per_unit, caller, now)
    }

    /// Deactivate a property
    pub async fn deactivate_property(
        &self,
        property: PropertyId,
        caller: Address,
    ) -> EstateResult<()> {
        self.ensure_write_access("deactivate_property").await?;
        self.kernel.write().await.deactivate_property(property, caller)
    }

    /// Purchase units
    pub async fn purchase_units(
        &self,
        property: PropertyId,
        amount: Units,
        buyer: Address,
        now: Timestamp,
        rail: &dyn PaymentRail,
    ) -> EstateResult<Units> {
        self.ensure_write_access("purchase_units").await?;
        self.kernel
            .write()
            .await
            .purchase_units(property, amount, buyer, now, rail)
    }

    /// Deposit revenue
    pub async fn deposit_revenue(
        &self,
        property: PropertyId,
        amount: Amount,
        caller: Address,
        now: Timestamp,
        rail: &dyn PaymentRail,
    ) -> EstateResult<Amount> {
        self.ensure_write_access("deposit_revenue").await?;
        self.kernel
            .write()
            .await
            .deposit_revenue(property, amount, caller, now, rail)
    }

    /// Withdraw accrued income
    pub async fn withdraw_income(
        &self,
        property: PropertyId,
        caller: Address,
        now: Timestamp,
        rail: &dyn PaymentRail,
    ) -> EstateResult<Amount> {
        self.ensure_write_access("withdraw_income").await?;
        self.kernel
            .write()
            .await
            .withdraw_income(property, caller, now, rail)
    }

    /// Submit a proposal
    #[allow(clippy::too_many_arguments)]
    pub async fn submit_proposal(
        &self,
        property: PropertyId,
        title: String,
        description: String,
        duration: u64,
        category: String,
        caller: Address,
        now: Timestamp,
    ) -> EstateResult<ProposalId> {
        self.ensure_write_access("submit_proposal").await?;
        self.kernel.write().await.submit_proposal(
            property,
            title,
            description,
            duration,
            category,
            caller,
            now,
        )
    }

    /// Cast or overwrite a ballot
    pub async fn cast_vote(
        &self,
        property: PropertyId,
        proposal: ProposalId,
        support: bool,
        caller: Address,
        now: Timestamp,
    ) -> EstateResult<()> {
        self.ensure_write_access("cast_vote").await?;
        self.kernel
            .write()
            .await
            .cast_vote(property, proposal, support, caller, now)
    }

    /// Execute a proposal
    pub async fn execute_proposal(
        &self,
        property: PropertyId,
        proposal: ProposalId,
        caller: Address,
        now: Timestamp,
    ) -> EstateResult<()> {
        self.ensure_write_access("execute_proposal").await?;
        self.kernel
            .write()
            .await
            .execute_proposal(property, proposal, caller, now)
    }

    // ========================================================================
    // QUERIES (read lock, consistent snapshot)
    // ========================================================================

    /// Get a property by id
    pub async fn get_property(&self, property: PropertyId) -> Option<Property> {
        self.kernel.read().await.get_property(property).cloned()
    }

    /// Number of registered properties
    pub async fn property_count(&self) -> u64 {
        self.kernel.read().await.property_count()
    }

    /// Balance of a holder in a property
    pub async fn balance_of(&self, property: PropertyId, holder: &Address) -> Units {
        self.kernel.read().await.balance_of(property, holder)
    }

    /// Settle-able amount for a holder
    pub async fn claimable(&self, property: PropertyId, holder: &Address) -> Amount {
        self.kernel.read().await.claimable(property, holder)
    }

    /// Get a proposal
    pub async fn get_proposal(
        &self,
        property: PropertyId,
        proposal: ProposalId,
    ) -> Option<Proposal> {
        self.kernel.read().await.get_proposal(property, proposal).cloned()
    }
}
