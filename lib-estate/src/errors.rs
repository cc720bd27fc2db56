//! Estate Ledger Errors
//!
//! Every failure is synchronous, non-retryable, and leaves all state
//! unchanged. There is no partial-success result for any operation.

use lib_types::{PropertyId, ProposalId, Timestamp, Units};
use lib_governance::GovernanceError;
use thiserror::Error;

/// Error during estate ledger operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EstateError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Property not found: {0}")]
    PropertyNotFound(PropertyId),

    #[error("Proposal not found: property {property}, proposal {proposal}")]
    ProposalNotFound {
        property: PropertyId,
        proposal: ProposalId,
    },

    #[error("Property {0} is inactive")]
    InactiveProperty(PropertyId),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Insufficient capacity: requested {requested}, available {available}")]
    InsufficientCapacity { requested: Units, available: Units },

    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: Units, need: Units },

    #[error("No income available to withdraw")]
    NoIncomeAvailable,

    #[error("Voting ended at {end_at} (now {now})")]
    VotingEnded { end_at: Timestamp, now: Timestamp },

    #[error("Voting in progress until {end_at} (now {now})")]
    VotingInProgress { end_at: Timestamp, now: Timestamp },

    #[error("Proposal already executed")]
    AlreadyExecuted,

    #[error("Proposal failed: {0}")]
    ProposalFailed(String),

    #[error("Transfer failed: {0}")]
    TransferFailed(String),

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<GovernanceError> for EstateError {
    fn from(err: GovernanceError) -> Self {
        match err {
            GovernanceError::ProposalNotFound { property, proposal } => {
                EstateError::ProposalNotFound { property, proposal }
            }
            GovernanceError::InsufficientWeight { have, need } => {
                EstateError::InsufficientBalance { have, need }
            }
            GovernanceError::EmptyTitle => {
                EstateError::InvalidInput("proposal title cannot be empty".to_string())
            }
            GovernanceError::ZeroDuration => {
                EstateError::InvalidInput("voting duration must be greater than zero".to_string())
            }
            GovernanceError::VotingEnded { end_at, now } => {
                EstateError::VotingEnded { end_at, now }
            }
            GovernanceError::VotingInProgress { end_at, now } => {
                EstateError::VotingInProgress { end_at, now }
            }
            GovernanceError::AlreadyExecuted => EstateError::AlreadyExecuted,
            GovernanceError::ProposalFailed(reason) => EstateError::ProposalFailed(reason),
            GovernanceError::Overflow => EstateError::Overflow,
        }
    }
}

/// Result type for estate ledger operations
pub type EstateResult<T> = Result<T, EstateError>;
