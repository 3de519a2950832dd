//! Domain-level errors.

use thiserror::Error;

/// Errors produced by domain validation and state transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// A value object rejected its input.
    #[error("invalid {field}: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: String,
    },

    /// A schedule proposal was already accepted or rejected.
    #[error("schedule proposal is already resolved")]
    ProposalAlreadyResolved,

    /// A call room already holds two peers.
    #[error("call room is full")]
    CallRoomFull,

    /// The call was already ended.
    #[error("call has ended")]
    CallEnded,
}

impl DomainError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}
