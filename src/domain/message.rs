//! Chat messages and their typed payloads.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::conversation::ConversationId;
use super::error::DomainError;
use super::identity::UserId;
use super::schedule::{ProposalStatus, ScheduleOutcome, ScheduleProposal};

/// Maximum accepted message length in characters.
const MAX_CONTENT_CHARS: usize = 2000;

/// Identifier of a persisted message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(value: &str) -> Result<Self, DomainError> {
        Uuid::parse_str(value)
            .map(Self)
            .map_err(|_| DomainError::invalid("message_id", "not a valid uuid"))
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated message text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageContent(String);

impl MessageContent {
    pub fn new(value: String) -> Result<Self, DomainError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::invalid("content", "must not be empty"));
        }
        if trimmed.chars().count() > MAX_CONTENT_CHARS {
            return Err(DomainError::invalid("content", "too long"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MessageContent {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Wire-visible message type discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Text,
    ScheduleRequest,
    ScheduleResponse,
    System,
}

/// Delivery status of a message. Mutated in place; the message body itself
/// is immutable once persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Sent,
    Delivered,
    Read,
}

/// Typed metadata, one variant per message kind. Replaces the original
/// free-form metadata blob so malformed metadata is rejected at ingress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagePayload {
    Text,
    ScheduleRequest(ScheduleProposal),
    ScheduleResponse(ScheduleOutcome),
    System,
}

impl MessagePayload {
    pub fn kind(&self) -> MessageKind {
        match self {
            MessagePayload::Text => MessageKind::Text,
            MessagePayload::ScheduleRequest(_) => MessageKind::ScheduleRequest,
            MessagePayload::ScheduleResponse(_) => MessageKind::ScheduleResponse,
            MessagePayload::System => MessageKind::System,
        }
    }
}

/// A chat message, either in a conversation room or the community room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub content: MessageContent,
    pub payload: MessagePayload,
    pub status: MessageStatus,
    /// Unix millis at persistence time.
    pub created_at: i64,
}

impl Message {
    pub fn new(
        conversation_id: ConversationId,
        sender_id: UserId,
        content: MessageContent,
        payload: MessagePayload,
        created_at: i64,
    ) -> Self {
        Self {
            id: MessageId::generate(),
            conversation_id,
            sender_id,
            content,
            payload,
            status: MessageStatus::Sent,
            created_at,
        }
    }

    pub fn kind(&self) -> MessageKind {
        self.payload.kind()
    }

    /// The embedded proposal, if this is a schedule request.
    pub fn proposal(&self) -> Option<&ScheduleProposal> {
        match &self.payload {
            MessagePayload::ScheduleRequest(p) => Some(p),
            _ => None,
        }
    }

    /// Resolve the embedded proposal in place.
    pub fn resolve_proposal(&mut self, status: ProposalStatus) -> Result<(), DomainError> {
        match &mut self.payload {
            MessagePayload::ScheduleRequest(p) => p.resolve(status),
            _ => Err(DomainError::invalid(
                "message",
                "not a schedule request message",
            )),
        }
    }
}
