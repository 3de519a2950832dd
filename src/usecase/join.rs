//! Room joins: conversation rooms and the community channel.

use std::sync::Arc;

use crate::domain::{ConnectionId, ConversationId, Identity, MessageStore, RoomId};
use crate::infrastructure::registry::ConnectionRegistry;
use crate::infrastructure::router::RoomRouter;

use super::error::EventError;

pub struct JoinRoomUseCase {
    registry: Arc<ConnectionRegistry>,
    router: Arc<RoomRouter>,
    store: Arc<dyn MessageStore>,
}

impl JoinRoomUseCase {
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

    /// Join a conversation room. Only the two participants of the
    /// conversation may join; anyone else is refused.
    pub async fn join_conversation(
        &self,
        connection: ConnectionId,
        conversation_id: String,
    ) -> Result<(), EventError> {
        let identity = self.identity_of(&connection).await?;
        let conversation_id = ConversationId::new(conversation_id)?;
        let conversation = self.store.find_conversation(&conversation_id).await?;

        if !conversation.is_participant(&identity.user_id) {
            return Err(EventError::Authorization(
                "not a participant of this conversation".to_string(),
            ));
        }

        let room = RoomId::Conversation(conversation_id);
        self.router.join(room.clone(), connection).await;
        self.registry.track_join(&connection, room).await;
        Ok(())
    }

    /// Join the community channel. Any authenticated connection may join.
    pub async fn join_community(&self, connection: ConnectionId) -> Result<(), EventError> {
        self.identity_of(&connection).await?;
        self.router.join(RoomId::Community, connection).await;
        self.registry.track_join(&connection, RoomId::Community).await;
        Ok(())
    }

    async fn identity_of(&self, connection: &ConnectionId) -> Result<Identity, EventError> {
        self.registry
            .identity_of(connection)
            .await
            .ok_or_else(|| EventError::Internal("connection not registered".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Conversation, Role, UserId};
    use crate::infrastructure::pusher::WebSocketEventPusher;
    use crate::infrastructure::repository::InMemoryMessageStore;

    async fn setup() -> (JoinRoomUseCase, Arc<ConnectionRegistry>, Arc<RoomRouter>) {
        let registry = Arc::new(ConnectionRegistry::new());
        let router = Arc::new(RoomRouter::new(Arc::new(WebSocketEventPusher::new())));
        let store = Arc::new(InMemoryMessageStore::new());
        store
            .upsert_conversation(Conversation::new(
                ConversationId::new("conv-1".to_string()).unwrap(),
                UserId::new("student-1".to_string()).unwrap(),
                UserId::new("tutor-1".to_string()).unwrap(),
            ))
            .await
            .unwrap();
        (
            JoinRoomUseCase::new(registry.clone(), router.clone(), store),
            registry,
            router,
        )
    }

    async fn connect(registry: &ConnectionRegistry, user: &str, role: Role) -> ConnectionId {
        let connection = ConnectionId::generate();
        registry
            .register(
                connection,
                Identity {
                    user_id: UserId::new(user.to_string()).unwrap(),
                    role,
                },
            )
            .await;
        connection
    }

    #[tokio::test]
    async fn test_participant_joins_conversation_room() {
        // given:
        let (usecase, registry, router) = setup().await;
        let connection = connect(&registry, "student-1", Role::Student).await;

        // when:
        let result = usecase
            .join_conversation(connection, "conv-1".to_string())
            .await;

        // then:
        assert!(result.is_ok());
        let room = RoomId::Conversation(ConversationId::new("conv-1".to_string()).unwrap());
        assert!(router.is_member(&room, &connection).await);
    }

    #[tokio::test]
    async fn test_stranger_is_refused() {
        // given:
        let (usecase, registry, router) = setup().await;
        let connection = connect(&registry, "stranger", Role::Student).await;

        // when:
        let result = usecase
            .join_conversation(connection, "conv-1".to_string())
            .await;

        // then:
        assert!(matches!(result, Err(EventError::Authorization(_))));
        let room = RoomId::Conversation(ConversationId::new("conv-1".to_string()).unwrap());
        assert!(!router.is_member(&room, &connection).await);
    }

    #[tokio::test]
    async fn test_unknown_conversation_is_not_found() {
        // given:
        let (usecase, registry, _router) = setup().await;
        let connection = connect(&registry, "student-1", Role::Student).await;

        // when:
        let result = usecase
            .join_conversation(connection, "conv-404".to_string())
            .await;

        // then:
        assert!(matches!(result, Err(EventError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_any_authenticated_user_joins_community() {
        // given:
        let (usecase, registry, router) = setup().await;
        let connection = connect(&registry, "anyone", Role::Tutor).await;

        // when:
        let result = usecase.join_community(connection).await;

        // then:
        assert!(result.is_ok());
        assert!(router.is_member(&RoomId::Community, &connection).await);
    }
}
