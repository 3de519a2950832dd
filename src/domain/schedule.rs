//! Schedule proposals embedded in chat messages.
//!
//! A proposal rides inside a `schedule_request` message and is resolved
//! exactly once by the non-proposing participant. The transition from
//! `pending` is monotonic: a second response attempt is an error, never a
//! silent overwrite.

use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::message::MessageId;

/// Resolution state of a schedule proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ProposalStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ProposalStatus::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::Pending => "pending",
            ProposalStatus::Accepted => "accepted",
            ProposalStatus::Rejected => "rejected",
        }
    }
}

/// Proposal metadata carried by a `schedule_request` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleProposal {
    pub subject_id: String,
    pub topic: String,
    /// Unix millis of the proposed session start.
    pub scheduled_at: i64,
    pub status: ProposalStatus,
}

impl ScheduleProposal {
    pub fn new(subject_id: String, topic: String, scheduled_at: i64) -> Result<Self, DomainError> {
        if subject_id.trim().is_empty() {
            return Err(DomainError::invalid("subject_id", "must not be empty"));
        }
        if topic.trim().is_empty() {
            return Err(DomainError::invalid("topic", "must not be empty"));
        }
        Ok(Self {
            subject_id,
            topic,
            scheduled_at,
            status: ProposalStatus::Pending,
        })
    }

    /// Resolve the proposal. Fails if the target status is not terminal or
    /// the proposal was already resolved.
    pub fn resolve(&mut self, status: ProposalStatus) -> Result<(), DomainError> {
        if !status.is_terminal() {
            return Err(DomainError::invalid(
                "status",
                "response must be accepted or rejected",
            ));
        }
        if self.status.is_terminal() {
            return Err(DomainError::ProposalAlreadyResolved);
        }
        self.status = status;
        Ok(())
    }
}

/// Outcome metadata carried by a `schedule_response` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleOutcome {
    /// The `schedule_request` message this responds to.
    pub request_message_id: MessageId,
    pub subject_id: String,
    pub topic: String,
    pub scheduled_at: i64,
    pub status: ProposalStatus,
}
