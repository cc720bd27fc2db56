//! Governance Engine
//!
//! Owns proposal sequences, proposal records, and ballots for every
//! property. Balances and supply caps are passed in by the caller; the
//! engine holds no ledger state of its own.
//!
//! # Invariants
//!
//! - Proposal ids are sequential per property, starting at 0
//! - Tallies equal the sum of recorded ballot weights per side at all times
//! - `executed` is one-way; execution requires a closed window, 10% quorum,
//!   and a strict yes majority

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use lib_types::{Address, PropertyId, ProposalId, Timestamp, Units};

use crate::errors::{GovernanceError, GovernanceResult};
use crate::proposal::{Ballot, Proposal};

// ============================================================================
// CRITICAL CONSTANTS - NEVER CHANGE
// ============================================================================

/// Submission threshold divisor: creator must hold total_supply / 20 (5%)
pub const PROPOSAL_THRESHOLD_DIVISOR: Units = 20;

/// Quorum divisor: combined weight must reach total_supply / 10 (10%)
pub const QUORUM_DIVISOR: Units = 10;

// ============================================================================
// GOVERNANCE ENGINE
// ============================================================================

/// Property-scoped proposal and voting state machine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GovernanceEngine {
    /// Next proposal id per property
    sequences: HashMap<PropertyId, ProposalId>,

    /// All proposals, keyed (property, proposal)
    proposals: HashMap<(PropertyId, ProposalId), Proposal>,

    /// Ballots: (property, proposal) -> voter -> ballot
    ballots: HashMap<(PropertyId, ProposalId), HashMap<Address, Ballot>>,
}

impl GovernanceEngine {
    /// Create an empty engine
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the proposal sequence for a newly registered property
    pub fn init_property(&mut self, property: PropertyId) {
        self.sequences.entry(property).or_insert(0);
    }

    // ========================================================================
    // PROPOSAL SUBMISSION
    // ========================================================================

    /// Submit a proposal
    ///
    /// `creator_balance` and `total_supply` are the ledger values at call
    /// time; the creator must hold at least `total_supply / 20` units.
    ///
    /// # Errors
    ///
    /// - `EmptyTitle` / `ZeroDuration` on invalid input
    /// - `InsufficientWeight` below the 5% submission threshold
    #[allow(clippy::too_many_arguments)]
    pub fn submit(
        &mut self,
        property: PropertyId,
        title: String,
        description: String,
        category: String,
        duration: u64,
        creator: Address,
        creator_balance: Units,
        total_supply: Units,
        now: Timestamp,
    ) -> GovernanceResult<ProposalId> {
        let threshold = total_supply / PROPOSAL_THRESHOLD_DIVISOR;
        if creator_balance < threshold {
            return Err(GovernanceError::InsufficientWeight {
                have: creator_balance,
                need: threshold,
            });
        }

        if title.is_empty() {
            return Err(GovernanceError::EmptyTitle);
        }

        if duration == 0 {
            return Err(GovernanceError::ZeroDuration);
        }

        let end_at = now.checked_add(duration).ok_or(GovernanceError::Overflow)?;

        let id = *self.sequences.entry(property).or_insert(0);
        let next = id.checked_add(1).ok_or(GovernanceError::Overflow)?;

        self.proposals.insert(
            (property, id),
            Proposal {
                id,
                property_id: property,
                title,
                description,
                category,
                creator,
                start_at: now,
                end_at,
                yes_votes: 0,
                no_votes: 0,
                executed: false,
            },
        );
        self.sequences.insert(property, next);

        Ok(id)
    }

    // ========================================================================
    // VOTING
    // ========================================================================

    /// Cast or overwrite a ballot
    ///
    /// `voter_balance` is the voter's unit balance at this call, which
    /// becomes the recorded weight. On overwrite, the prior ballot's weight
    /// is removed from whichever tally it was recorded against before the
    /// new weight is added; both tallies are committed together.
    ///
    /// # Errors
    ///
    /// - `ProposalNotFound`
    /// - `VotingEnded` when `now >= end_at`
    /// - `AlreadyExecuted`
    pub fn cast_vote(
        &mut self,
        property: PropertyId,
        proposal: ProposalId,
        support: bool,
        voter: Address,
        voter_balance: Units,
        now: Timestamp,
    ) -> GovernanceResult<()> {
        let record = self
            .proposals
            .get_mut(&(property, proposal))
            .ok_or(GovernanceError::ProposalNotFound { property, proposal })?;

        if now >= record.end_at {
            return Err(GovernanceError::VotingEnded {
                end_at: record.end_at,
                now,
            });
        }

        if record.executed {
            return Err(GovernanceError::AlreadyExecuted);
        }

        let ballots = self.ballots.entry((property, proposal)).or_default();

        // Stage both tallies, then commit: a ballot overwrite must never
        // leave one side adjusted and the other not.
        let mut yes = record.yes_votes;
        let mut no = record.no_votes;

        if let Some(prior) = ballots.get(&voter) {
            if prior.support {
                yes = yes
                    .checked_sub(prior.weight)
                    .ok_or(GovernanceError::Overflow)?;
            } else {
                no = no
                    .checked_sub(prior.weight)
                    .ok_or(GovernanceError::Overflow)?;
            }
        }

        if support {
            yes = yes
                .checked_add(voter_balance)
                .ok_or(GovernanceError::Overflow)?;
        } else {
            no = no
                .checked_add(voter_balance)
                .ok_or(GovernanceError::Overflow)?;
        }

        record.yes_votes = yes;
        record.no_votes = no;
        ballots.insert(
            voter,
            Ballot {
                support,
                weight: voter_balance,
                cast_at: now,
            },
        );

        Ok(())
    }

    // ========================================================================
    // EXECUTION
    // ========================================================================

    /// Execute a proposal after its window closes
    ///
    /// Execution records an authorization signal only; no further effect is
    /// performed here.
    ///
    /// # Errors
    ///
    /// - `ProposalNotFound`
    /// - `VotingInProgress` when `now < end_at`
    /// - `AlreadyExecuted`
    /// - `ProposalFailed` below quorum (`total_supply / 10`) or without a
    ///   strict yes majority
    pub fn execute(
        &mut self,
        property: PropertyId,
        proposal: ProposalId,
        total_supply: Units,
        now: Timestamp,
    ) -> GovernanceResult<()> {
        let record = self
            .proposals
            .get_mut(&(property, proposal))
            .ok_or(GovernanceError::ProposalNotFound { property, proposal })?;

        if now < record.end_at {
            return Err(GovernanceError::VotingInProgress {
                end_at: record.end_at,
                now,
            });
        }

        if record.executed {
            return Err(GovernanceError::AlreadyExecuted);
        }

        let total = record
            .yes_votes
            .checked_add(record.no_votes)
            .ok_or(GovernanceError::Overflow)?;
        let quorum = total_supply / QUORUM_DIVISOR;

        if total < quorum {
            return Err(GovernanceError::ProposalFailed(format!(
                "quorum not met: {} of {} required",
                total, quorum
            )));
        }

        if record.yes_votes <= record.no_votes {
            return Err(GovernanceError::ProposalFailed(format!(
                "majority not met: {} yes, {} no",
                record.yes_votes, record.no_votes
            )));
        }

        record.executed = true;
        Ok(())
    }

    // ========================================================================
    // READ OPERATIONS
    // ========================================================================

    /// Get a proposal
    pub fn get(&self, property: PropertyId, proposal: ProposalId) -> Option<&Proposal> {
        self.proposals.get(&(property, proposal))
    }

    /// Get a voter's recorded ballot
    pub fn ballot(
        &self,
        property: PropertyId,
        proposal: ProposalId,
        voter: &Address,
    ) -> Option<&Ballot> {
        self.ballots.get(&(property, proposal))?.get(voter)
    }

    /// Number of proposals submitted for a property
    pub fn proposal_count(&self, property: PropertyId) -> u64 {
        self.sequences.get(&property).copied().unwrap_or(0)
    }
}
