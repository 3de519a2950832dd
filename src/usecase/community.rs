//! Community channel pipeline with synchronous moderation.
//!
//! The moderation gate is consulted before anything is persisted. Approval
//! is the only path to storage and broadcast; rejection, gate errors and
//! timeouts all end with nothing persisted and only the sender notified.

use std::sync::Arc;
use std::time::Duration;

use crate::common::time::Clock;
use crate::domain::{
    ConnectionId, ConversationId, EventPusher, Identity, Message, MessageContent, MessagePayload,
    MessageStore, ModerationGate, RoomId, Verdict,
};
use crate::infrastructure::dto::websocket::{CommunityMessageDto, ServerEvent};
use crate::infrastructure::registry::ConnectionRegistry;
use crate::infrastructure::router::RoomRouter;

use super::error::EventError;

const REJECTION_FALLBACK_REASON: &str = "message rejected by moderation";

pub struct CommunityMessageUseCase {
    registry: Arc<ConnectionRegistry>,
    router: Arc<RoomRouter>,
    store: Arc<dyn MessageStore>,
    pusher: Arc<dyn EventPusher>,
    gate: Arc<dyn ModerationGate>,
    clock: Arc<dyn Clock>,
    moderation_timeout: Duration,
}

impl CommunityMessageUseCase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        router: Arc<RoomRouter>,
        store: Arc<dyn MessageStore>,
        pusher: Arc<dyn EventPusher>,
        gate: Arc<dyn ModerationGate>,
        clock: Arc<dyn Clock>,
        moderation_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            router,
            store,
            pusher,
            gate,
            clock,
            moderation_timeout,
        }
    }

    /// Send a message into the community channel. Returns the persisted
    /// message on approval, `None` when moderation turned it away (the
    /// sender has already been notified in that case).
    pub async fn execute(
        &self,
        connection: ConnectionId,
        content: String,
    ) -> Result<Option<Message>, EventError> {
        let identity = self.identity_of(&connection).await?;

        if !self.router.is_member(&RoomId::Community, &connection).await {
            return Err(EventError::InvalidState(
                "join the community chat before sending".to_string(),
            ));
        }

        let content = MessageContent::new(content)?;

        let verdict = match tokio::time::timeout(
            self.moderation_timeout,
            self.gate.evaluate(content.as_str()),
        )
        .await
        {
            Ok(Ok(verdict)) => verdict,
            Ok(Err(e)) => {
                tracing::warn!("Moderation gate failed, rejecting message: {}", e);
                Verdict::reject("moderation unavailable".to_string())
            }
            Err(_) => {
                tracing::warn!(
                    "Moderation gate timed out after {:?}, rejecting message",
                    self.moderation_timeout
                );
                Verdict::reject("moderation timed out".to_string())
            }
        };

        if !verdict.approved {
            let reason = verdict
                .reason
                .unwrap_or_else(|| REJECTION_FALLBACK_REASON.to_string());
            let frame = ServerEvent::CommunityMessageRejected { reason }.to_frame();
            if let Err(e) = self.pusher.push_to(&connection, &frame).await {
                tracing::warn!("Failed to notify sender of rejection: {}", e);
            }
            return Ok(None);
        }

        let message = Message::new(
            ConversationId::community(),
            identity.user_id.clone(),
            content,
            MessagePayload::Text,
            self.clock.now_utc_millis(),
        );
        self.store.insert(message.clone()).await?;

        let frame = ServerEvent::NewCommunityMessage(CommunityMessageDto::from(&message)).to_frame();
        self.router.broadcast(&RoomId::Community, &frame, None).await;

        Ok(Some(message))
    }

    async fn identity_of(&self, connection: &ConnectionId) -> Result<Identity, EventError> {
        self.registry
            .identity_of(connection)
            .await
            .ok_or_else(|| EventError::Internal("connection not registered".to_string()))
    }
}
