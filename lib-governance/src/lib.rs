//! Parcel Governance - Property-Scoped Proposals and Weighted Voting
//!
//! This crate provides the proposal/voting state machine for the Parcel
//! ledger. Each property carries its own proposal sequence; voting weight
//! is the holder's unit balance at the moment a ballot is cast.
//!
//! # Key Principles
//!
//! 1. **Weight-parameterized**: balances and supply thresholds enter as
//!    arguments; the engine never reads ledger state directly
//! 2. **Ballot overwrite**: a voter may re-cast; the prior weight is
//!    retracted from its recorded side before the new weight is tallied
//! 3. **Quorum-gated execution**: 10% combined weight and a strict yes
//!    majority, evaluated only after the voting window closes
//! 4. **Recorded authorization only**: execution flips a flag; acting on
//!    the decision is the platform's responsibility

pub mod engine;
pub mod errors;
pub mod proposal;

pub use engine::{GovernanceEngine, PROPOSAL_THRESHOLD_DIVISOR, QUORUM_DIVISOR};
pub use errors::{GovernanceError, GovernanceResult};
pub use proposal::{Ballot, Proposal, ProposalStatus};
