//! Direct message pipeline: validate, persist, broadcast.

use std::sync::Arc;

use crate::common::time::Clock;
use crate::domain::{
    ConnectionId, Conversation, ConversationId, Identity, Message, MessageContent, MessagePayload,
    MessageStatus, MessageStore, RoomId,
};
use crate::infrastructure::dto::websocket::{MessageDto, ServerEvent};
use crate::infrastructure::registry::ConnectionRegistry;
use crate::infrastructure::router::RoomRouter;

use super::error::EventError;

pub struct SendMessageUseCase {
    registry: Arc<ConnectionRegistry>,
    router: Arc<RoomRouter>,
    store: Arc<dyn MessageStore>,
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        router: Arc<RoomRouter>,
        store: Arc<dyn MessageStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            router,
            store,
            clock,
        }
    }

    /// Send a text message into a conversation. The broadcast targets every
    /// room member including the sender's other tabs; clients dedupe by
    /// message id.
    pub async fn execute(
        &self,
        connection: ConnectionId,
        conversation_id: String,
        content: String,
    ) -> Result<Message, EventError> {
        let identity = self.identity_of(&connection).await?;
        let conversation_id = ConversationId::new(conversation_id)?;
        let conversation = self.store.find_conversation(&conversation_id).await?;

        if !conversation.is_participant(&identity.user_id) {
            return Err(EventError::Authorization(
                "not a participant of this conversation".to_string(),
            ));
        }

        let room = RoomId::Conversation(conversation_id.clone());
        if !self.router.is_member(&room, &connection).await {
            return Err(EventError::InvalidState(
                "join the conversation before sending".to_string(),
            ));
        }

        let content = MessageContent::new(content)?;
        let created_at = self.clock.now_utc_millis();
        let mut message = Message::new(
            conversation_id.clone(),
            identity.user_id.clone(),
            content,
            MessagePayload::Text,
            created_at,
        );

        // Promote to delivered when the counterparty has a live connection
        // in the room at send time.
        if self
            .counterparty_present(&conversation, &identity, &room)
            .await
        {
            message.status = MessageStatus::Delivered;
        }

        self.store.insert(message.clone()).await?;
        self.store
            .touch_conversation(&conversation_id, created_at)
            .await?;

        let frame = ServerEvent::NewMessage(MessageDto::from(&message)).to_frame();
        self.router.broadcast(&room, &frame, None).await;

        Ok(message)
    }

    async fn counterparty_present(
        &self,
        conversation: &Conversation,
        sender: &Identity,
        room: &RoomId,
    ) -> bool {
        let Some(counterpart) = conversation.counterpart(&sender.user_id) else {
            return false;
        };
        let counterpart_connections = self.registry.connections_of(counterpart).await;
        for candidate in counterpart_connections {
            if self.router.is_member(room, &candidate).await {
                return true;
            }
        }
        false
    }

    async fn identity_of(&self, connection: &ConnectionId) -> Result<Identity, EventError> {
        self.registry
            .identity_of(connection)
            .await
            .ok_or_else(|| EventError::Internal("connection not registered".to_string()))
    }
}
