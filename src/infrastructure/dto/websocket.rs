//! Wire events exchanged over the WebSocket.
//!
//! Frames are adjacently tagged JSON: `{"event": <name>, "data": <payload>}`
//! with snake_case event names and camelCase payload fields. SDP, ICE and
//! call-event payloads stay opaque `serde_json::Value`s; the relay forwards
//! them without inspection.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::time::timestamp_to_rfc3339;
use crate::domain::{
    Message, MessageKind, MessagePayload, MessageStatus, ProposalStatus, Role, ScheduleOutcome,
    ScheduleProposal,
};

/// Message type a client may attach to `send_message`. Only plain text is
/// sent through that event; schedule messages ride their own events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutboundMessageKind {
    #[default]
    Text,
}

/// Events a client may send.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
#[serde(rename_all_fields = "camelCase")]
pub enum ClientEvent {
    JoinConversation {
        conversation_id: String,
    },
    SendMessage {
        conversation_id: String,
        content: String,
        #[serde(rename = "type", default)]
        kind: OutboundMessageKind,
    },
    Typing {
        conversation_id: String,
        is_typing: bool,
    },
    MarkRead {
        conversation_id: String,
    },
    JoinCommunityChat,
    SendCommunityMessage {
        content: String,
    },
    SendScheduleRequest {
        conversation_id: String,
        subject_id: String,
        topic: String,
        /// RFC 3339 session start.
        scheduled_at: String,
    },
    RespondToSchedule {
        conversation_id: String,
        message_id: String,
        status: ProposalStatus,
    },
    JoinCall {
        session_id: String,
    },
    WebrtcOffer {
        session_id: String,
        offer: Value,
    },
    WebrtcAnswer {
        session_id: String,
        answer: Value,
    },
    WebrtcIceCandidate {
        session_id: String,
        candidate: Value,
    },
    EndCall {
        session_id: String,
    },
    CallEvent {
        session_id: String,
        event_type: Value,
    },
}

/// Events the relay pushes to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
#[serde(rename_all_fields = "camelCase")]
pub enum ServerEvent {
    NewMessage(MessageDto),
    UserTyping {
        conversation_id: String,
        user_id: String,
        is_typing: bool,
    },
    MessagesRead {
        conversation_id: String,
        reader_id: String,
    },
    NewCommunityMessage(CommunityMessageDto),
    CommunityMessageRejected {
        reason: String,
    },
    CallPeerJoined {
        session_id: String,
        user_id: String,
        role: Role,
    },
    WebrtcOffer {
        session_id: String,
        from: String,
        offer: Value,
    },
    WebrtcAnswer {
        session_id: String,
        from: String,
        answer: Value,
    },
    WebrtcIceCandidate {
        session_id: String,
        from: String,
        candidate: Value,
    },
    CallEnded {
        session_id: String,
        ended_by: String,
        role: Role,
        ended_at: String,
    },
    CallEvent {
        session_id: String,
        from: String,
        event_type: Value,
    },
    Error {
        code: ErrorCode,
        message: String,
    },
}

impl ServerEvent {
    /// Serialize into a text frame. Serialization of these types cannot
    /// fail for valid UTF-8 content; should it ever, a generic error frame
    /// is pushed instead of dropping the event silently.
    pub fn to_frame(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            tracing::error!("Failed to serialize server event: {}", e);
            r#"{"event":"error","data":{"code":"internal_error","message":"event serialization failed"}}"#
                .to_string()
        })
    }
}

/// Wire error codes for per-event `error` replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    AuthorizationError,
    NotFound,
    InvalidState,
    InvalidPayload,
    InternalError,
}

/// Typed metadata attached to schedule messages; plain text and system
/// messages carry none.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageMetadataDto {
    Proposal(ScheduleProposal),
    Outcome(ScheduleOutcome),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub content: String,
    pub kind: MessageKind,
    pub status: MessageStatus,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MessageMetadataDto>,
}

impl From<&Message> for MessageDto {
    fn from(message: &Message) -> Self {
        let metadata = match &message.payload {
            MessagePayload::Text | MessagePayload::System => None,
            MessagePayload::ScheduleRequest(p) => Some(MessageMetadataDto::Proposal(p.clone())),
            MessagePayload::ScheduleResponse(o) => Some(MessageMetadataDto::Outcome(o.clone())),
        };
        Self {
            id: message.id.to_string(),
            conversation_id: message.conversation_id.to_string(),
            sender_id: message.sender_id.to_string(),
            content: message.content.as_str().to_string(),
            kind: message.kind(),
            status: message.status,
            created_at: timestamp_to_rfc3339(message.created_at),
            metadata,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityMessageDto {
    pub id: String,
    pub sender_id: String,
    pub content: String,
    pub created_at: String,
    /// Always false on the wire: rejected messages are never persisted or
    /// broadcast, so a flagged message cannot reach a client.
    pub is_flagged: bool,
}

impl From<&Message> for CommunityMessageDto {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.to_string(),
            sender_id: message.sender_id.to_string(),
            content: message.content.as_str().to_string(),
            created_at: timestamp_to_rfc3339(message.created_at),
            is_flagged: false,
        }
    }
}
