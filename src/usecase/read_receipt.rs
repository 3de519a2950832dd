//! Read receipts: flip counterparty messages to read and notify the room.

use std::sync::Arc;

use crate::domain::{ConnectionId, ConversationId, Identity, MessageStore, RoomId};
use crate::infrastructure::dto::websocket::ServerEvent;
use crate::infrastructure::registry::ConnectionRegistry;
use crate::infrastructure::router::RoomRouter;

use super::error::EventError;

pub struct MarkReadUseCase {
    registry: Arc<ConnectionRegistry>,
    router: Arc<RoomRouter>,
    store: Arc<dyn MessageStore>,
}

impl MarkReadUseCase {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        router: Arc<RoomRouter>,
        store: Arc<dyn MessageStore>,
    ) -> Self {
        Self {
            registry,
            router,
            store,
        }
    }

    /// Mark every counterparty message in the conversation as read and
    /// broadcast `messages_read` to the room. Returns how many messages
    /// changed status.
    pub async fn execute(
        &self,
        connection: ConnectionId,
        conversation_id: String,
    ) -> Result<usize, EventError> {
        let identity = self.identity_of(&connection).await?;
        let conversation_id = ConversationId::new(conversation_id)?;
        let conversation = self.store.find_conversation(&conversation_id).await?;

        if !conversation.is_participant(&identity.user_id) {
            return Err(EventError::Authorization(
                "not a participant of this conversation".to_string(),
            ));
        }

        let changed = self
            .store
            .mark_read(&conversation_id, &identity.user_id)
            .await?;

        let frame = ServerEvent::MessagesRead {
            conversation_id: conversation_id.to_string(),
            reader_id: identity.user_id.to_string(),
        }
        .to_frame();
        let room = RoomId::Conversation(conversation_id);
        self.router.broadcast(&room, &frame, None).await;

        Ok(changed)
    }

    async fn identity_of(&self, connection: &ConnectionId) -> Result<Identity, EventError> {
        self.registry
            .identity_of(connection)
            .await
            .ok_or_else(|| EventError::Internal("connection not registered".to_string()))
    }
}
