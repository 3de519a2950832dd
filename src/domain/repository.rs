//! Storage ports consumed by the relay core.
//!
//! The core only needs insert/query operations; storage internals are an
//! external collaborator. Implementations live in the infrastructure layer.

use async_trait::async_trait;
use thiserror::Error;

use super::call::SessionId;
use super::conversation::{Conversation, ConversationId};
use super::identity::UserId;
use super::message::{Message, MessageId};
use super::schedule::ProposalStatus;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("conversation '{0}' not found")]
    ConversationNotFound(String),

    #[error("message '{0}' not found")]
    MessageNotFound(String),

    #[error("schedule proposal is already resolved")]
    ProposalAlreadyResolved,

    #[error("message is not a schedule request")]
    NotAScheduleRequest,

    #[error("session '{0}' not found")]
    SessionNotFound(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Message store port: persisted conversations and message history.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Register or replace a conversation binding (fed by the external CRUD
    /// collaborator; conversations are never deleted).
    async fn upsert_conversation(&self, conversation: Conversation)
    -> Result<(), RepositoryError>;

    async fn find_conversation(
        &self,
        id: &ConversationId,
    ) -> Result<Conversation, RepositoryError>;

    /// Persist a message. Appends in call order per conversation.
    async fn insert(&self, message: Message) -> Result<(), RepositoryError>;

    /// Ordered history of a conversation (or the community sentinel).
    async fn query_by_conversation(
        &self,
        id: &ConversationId,
    ) -> Result<Vec<Message>, RepositoryError>;

    async fn find_message(
        &self,
        conversation: &ConversationId,
        message: &MessageId,
    ) -> Result<Message, RepositoryError>;

    /// Mark every message not sent by `reader` as read. Returns how many
    /// messages changed status.
    async fn mark_read(
        &self,
        conversation: &ConversationId,
        reader: &UserId,
    ) -> Result<usize, RepositoryError>;

    /// Atomically resolve the proposal embedded in a schedule request.
    /// Fails with `ProposalAlreadyResolved` when it is no longer pending;
    /// never overwrites a terminal state. Returns the updated message.
    async fn resolve_proposal(
        &self,
        conversation: &ConversationId,
        message: &MessageId,
        status: ProposalStatus,
    ) -> Result<Message, RepositoryError>;

    /// Update the conversation's recency marker.
    async fn touch_conversation(
        &self,
        id: &ConversationId,
        timestamp: i64,
    ) -> Result<(), RepositoryError>;
}

/// Session store port, invoked on tutor-initiated call end.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn complete_session(&self, session: &SessionId) -> Result<(), RepositoryError>;
}
