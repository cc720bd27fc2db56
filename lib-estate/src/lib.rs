//! Parcel Estate Ledger
//!
//! Fractional-ownership accounting for divisible property assets: a
//! supply-capped unit ledger, pooled revenue distribution with lazy
//! per-holder settlement, and a property-scoped governance surface.
//!
//! # Key Types
//!
//! - [`EstateKernel`]: the composed operation surface
//! - [`PropertyRegistry`] / [`Property`]: asset metadata and active flag
//! - [`TokenLedger`]: issued units and holder balances
//! - [`RevenuePool`] / [`ClaimTracker`]: revenue-per-unit accumulator and
//!   per-holder settlement checkpoints
//! - [`PaymentRail`]: the external value-transfer seam
//! - [`SharedKernel`]: serialized multi-threaded access
//!
//! # Execution Model
//!
//! Every operation is a single atomic transaction: caller identity and the
//! clock are explicit parameters, failures roll back completely, and the
//! payment rail is invoked only after all validation has passed.

pub mod errors;
pub mod kernel;
pub mod ledger;
pub mod rail;
pub mod registry;
pub mod revenue;
pub mod shared;

pub use errors::{EstateError, EstateResult};
pub use kernel::EstateKernel;
pub use ledger::TokenLedger;
pub use rail::PaymentRail;
pub use registry::{Property, PropertyRegistry};
pub use revenue::{claimable, ClaimRecord, ClaimTracker, RevenuePool, RevenuePoolState};
pub use shared::{AccessMode, SharedKernel};
