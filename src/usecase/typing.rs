//! Typing indicators. Nothing is persisted; the start/stop lifecycle is
//! owned by the client and a stale indicator is the client's problem.

use std::sync::Arc;

use crate::domain::{ConnectionId, ConversationId, RoomId};
use crate::infrastructure::dto::websocket::ServerEvent;
use crate::infrastructure::registry::ConnectionRegistry;
use crate::infrastructure::router::RoomRouter;

use super::error::EventError;

pub struct TypingUseCase {
    registry: Arc<ConnectionRegistry>,
    router: Arc<RoomRouter>,
}

impl TypingUseCase {
    pub fn new(registry: Arc<ConnectionRegistry>, router: Arc<RoomRouter>) -> Self {
        Self { registry, router }
    }

    /// Broadcast a typing indicator to the other members of the room. The
    /// origin connection is excluded; an indicator from a non-member is
    /// dropped without a reply (typing is fire-and-forget).
    pub async fn execute(
        &self,
        connection: ConnectionId,
        conversation_id: String,
        is_typing: bool,
    ) -> Result<(), EventError> {
        let Some(identity) = self.registry.identity_of(&connection).await else {
            return Err(EventError::Internal("connection not registered".to_string()));
        };
        let conversation_id = ConversationId::new(conversation_id)?;
        let room = if conversation_id.is_community() {
            RoomId::Community
        } else {
            RoomId::Conversation(conversation_id.clone())
        };

        if !self.router.is_member(&room, &connection).await {
            tracing::debug!(
                "Dropping typing indicator from non-member '{}' for room '{}'",
                connection,
                room
            );
            return Ok(());
        }

        let frame = ServerEvent::UserTyping {
            conversation_id: conversation_id.to_string(),
            user_id: identity.user_id.to_string(),
            is_typing,
        }
        .to_frame();
        self.router.broadcast(&room, &frame, Some(&connection)).await;
        Ok(())
    }
}
