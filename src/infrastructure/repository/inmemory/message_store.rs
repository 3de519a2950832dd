//! In-memory `MessageStore` implementation.
//!
//! Conversations and per-room message history live in two maps behind one
//! mutex, so status updates and the proposal compare-and-set are atomic
//! with respect to concurrent readers. The community channel stores its
//! history under the community sentinel id without a conversation binding.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    Conversation, ConversationId, Message, MessageId, MessageStatus, MessageStore,
    ProposalStatus, RepositoryError, UserId,
};

#[derive(Default)]
struct StoreInner {
    conversations: HashMap<ConversationId, Conversation>,
    messages: HashMap<ConversationId, Vec<Message>>,
}

pub struct InMemoryMessageStore {
    inner: Mutex<StoreInner>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StoreInner::default()),
        }
    }
}

impl Default for InMemoryMessageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn upsert_conversation(
        &self,
        conversation: Conversation,
    ) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().await;
        inner
            .conversations
            .insert(conversation.id.clone(), conversation);
        Ok(())
    }

    async fn find_conversation(
        &self,
        id: &ConversationId,
    ) -> Result<Conversation, RepositoryError> {
        let inner = self.inner.lock().await;
        inner
            .conversations
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::ConversationNotFound(id.to_string()))
    }

    async fn insert(&self, message: Message) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().await;
        inner
            .messages
            .entry(message.conversation_id.clone())
            .or_default()
            .push(message);
        Ok(())
    }

    async fn query_by_conversation(
        &self,
        id: &ConversationId,
    ) -> Result<Vec<Message>, RepositoryError> {
        let inner = self.inner.lock().await;
        Ok(inner.messages.get(id).cloned().unwrap_or_default())
    }

    async fn find_message(
        &self,
        conversation: &ConversationId,
        message: &MessageId,
    ) -> Result<Message, RepositoryError> {
        let inner = self.inner.lock().await;
        inner
            .messages
            .get(conversation)
            .and_then(|msgs| msgs.iter().find(|m| &m.id == message))
            .cloned()
            .ok_or_else(|| RepositoryError::MessageNotFound(message.to_string()))
    }

    async fn mark_read(
        &self,
        conversation: &ConversationId,
        reader: &UserId,
    ) -> Result<usize, RepositoryError> {
        let mut inner = self.inner.lock().await;
        let Some(msgs) = inner.messages.get_mut(conversation) else {
            return Ok(0);
        };
        let mut changed = 0;
        for msg in msgs.iter_mut() {
            if &msg.sender_id != reader && msg.status != MessageStatus::Read {
                msg.status = MessageStatus::Read;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn resolve_proposal(
        &self,
        conversation: &ConversationId,
        message: &MessageId,
        status: ProposalStatus,
    ) -> Result<Message, RepositoryError> {
        use crate::domain::DomainError;

        let mut inner = self.inner.lock().await;
        let msg = inner
            .messages
            .get_mut(conversation)
            .and_then(|msgs| msgs.iter_mut().find(|m| &m.id == message))
            .ok_or_else(|| RepositoryError::MessageNotFound(message.to_string()))?;

        match msg.resolve_proposal(status) {
            Ok(()) => Ok(msg.clone()),
            Err(DomainError::ProposalAlreadyResolved) => {
                Err(RepositoryError::ProposalAlreadyResolved)
            }
            Err(_) => Err(RepositoryError::NotAScheduleRequest),
        }
    }

    async fn touch_conversation(
        &self,
        id: &ConversationId,
        timestamp: i64,
    ) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().await;
        if let Some(conversation) = inner.conversations.get_mut(id) {
            conversation.last_message_at = Some(timestamp);
        }
        // the community sentinel has no conversation record to touch
        Ok(())
    }
}
