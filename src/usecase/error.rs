//! Errors surfaced to the client as per-event `error` replies.

use thiserror::Error;

use crate::domain::{DomainError, RepositoryError};

/// Failure of a client-initiated event. The variant determines the wire
/// error code; the message is sent to the client verbatim, so it must not
/// leak internals.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventError {
    #[error("{0}")]
    Authorization(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("{0}")]
    InvalidPayload(String),

    #[error("{0}")]
    Internal(String),
}

impl From<DomainError> for EventError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::InvalidValue { .. } => EventError::InvalidPayload(e.to_string()),
            DomainError::ProposalAlreadyResolved
            | DomainError::CallRoomFull
            | DomainError::CallEnded => EventError::InvalidState(e.to_string()),
        }
    }
}

impl From<RepositoryError> for EventError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::ConversationNotFound(_)
            | RepositoryError::MessageNotFound(_)
            | RepositoryError::SessionNotFound(_) => EventError::NotFound(e.to_string()),
            RepositoryError::ProposalAlreadyResolved | RepositoryError::NotAScheduleRequest => {
                EventError::InvalidState(e.to_string())
            }
            RepositoryError::Unavailable(_) => {
                EventError::Internal("storage unavailable".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_maps_to_invalid_payload() {
        // given:
        let domain_error = DomainError::invalid("content", "must not be empty");

        // when:
        let event_error = EventError::from(domain_error);

        // then:
        assert!(matches!(event_error, EventError::InvalidPayload(_)));
    }

    #[test]
    fn test_resolved_proposal_maps_to_invalid_state() {
        // given / when:
        let event_error = EventError::from(RepositoryError::ProposalAlreadyResolved);

        // then:
        assert!(matches!(event_error, EventError::InvalidState(_)));
    }

    #[test]
    fn test_store_outage_does_not_leak_details() {
        // given / when:
        let event_error =
            EventError::from(RepositoryError::Unavailable("pool exhausted".to_string()));

        // then:
        assert_eq!(
            event_error,
            EventError::Internal("storage unavailable".to_string())
        );
    }
}
