//! Proposal and ballot records

use serde::{Deserialize, Serialize};

use lib_types::{Address, PropertyId, ProposalId, Timestamp, Units};

use crate::engine::QUORUM_DIVISOR;
use crate::errors::{GovernanceError, GovernanceResult};

/// Derived proposal lifecycle state
///
/// Only `executed` is persisted; Open/Closed are a function of the clock.
/// A Closed proposal that never satisfies the quorum test stays Closed
/// forever — there is no persisted Failed flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalStatus {
    /// Voting window is open (`now < end_at`, not executed)
    Open,

    /// Voting window has closed, not executed
    Closed,

    /// Executed (terminal)
    Executed,
}

/// Individual proposal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    /// Proposal ID, sequential per property starting at 0
    pub id: ProposalId,

    /// Property this proposal is scoped to
    pub property_id: PropertyId,

    /// Proposal title
    pub title: String,

    /// Proposal description
    pub description: String,

    /// Free-text category supplied by the creator
    pub category: String,

    /// Creator address
    pub creator: Address,

    /// When voting started
    pub start_at: Timestamp,

    /// When voting ends (`start_at + duration`)
    pub end_at: Timestamp,

    /// Accumulated yes weight
    pub yes_votes: Units,

    /// Accumulated no weight
    pub no_votes: Units,

    /// Whether the proposal has been executed (one-way)
    pub executed: bool,
}

impl Proposal {
    /// Derive the lifecycle state at a given clock marker
    pub fn status(&self, now: Timestamp) -> ProposalStatus {
        if self.executed {
            ProposalStatus::Executed
        } else if now < self.end_at {
            ProposalStatus::Open
        } else {
            ProposalStatus::Closed
        }
    }

    /// Whether the voting window `[start_at, end_at)` accepts ballots
    pub fn is_open(&self, now: Timestamp) -> bool {
        self.status(now) == ProposalStatus::Open
    }

    /// Combined yes + no weight
    pub fn total_votes(&self) -> GovernanceResult<Units> {
        self.yes_votes
            .checked_add(self.no_votes)
            .ok_or(GovernanceError::Overflow)
    }

    /// Quorum test: combined weight >= total_supply / 10 (integer floor)
    pub fn meets_quorum(&self, total_supply: Units) -> GovernanceResult<bool> {
        Ok(self.total_votes()? >= total_supply / QUORUM_DIVISOR)
    }

    /// Majority test: strict yes majority
    pub fn has_majority(&self) -> bool {
        self.yes_votes > self.no_votes
    }
}

/// Ballot cast by a voter on a proposal
///
/// A voter overwrites their own ballot on re-cast; the engine retracts the
/// recorded weight from its side before tallying the replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    /// Vote direction
    pub support: bool,

    /// Voter's unit balance at cast time
    pub weight: Units,

    /// When the ballot was cast
    pub cast_at: Timestamp,
}
