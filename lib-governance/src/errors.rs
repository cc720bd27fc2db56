//! Governance Errors

use lib_types::{PropertyId, ProposalId, Timestamp, Units};
use thiserror::Error;

/// Error during governance operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GovernanceError {
    #[error("Proposal not found: property {property}, proposal {proposal}")]
    ProposalNotFound {
        property: PropertyId,
        proposal: ProposalId,
    },

    #[error("Insufficient voting weight: have {have}, need {need}")]
    InsufficientWeight { have: Units, need: Units },

    #[error("Proposal title cannot be empty")]
    EmptyTitle,

    #[error("Voting duration must be greater than zero")]
    ZeroDuration,

    #[error("Voting ended at {end_at} (now {now})")]
    VotingEnded { end_at: Timestamp, now: Timestamp },

    #[error("Voting in progress until {end_at} (now {now})")]
    VotingInProgress { end_at: Timestamp, now: Timestamp },

    #[error("Proposal already executed")]
    AlreadyExecuted,

    #[error("Proposal failed: {0}")]
    ProposalFailed(String),

    #[error("Arithmetic overflow")]
    Overflow,
}

/// Result type for governance operations
pub type GovernanceResult<T> = Result<T, GovernanceError>;
