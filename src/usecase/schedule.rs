//! Schedule proposal workflow: propose and respond.
//!
//! Both operations ride the message pipeline: a proposal is a
//! `schedule_request` message, a resolution emits a `schedule_response`
//! message referencing it. The pending -> terminal transition happens
//! atomically inside the store so concurrent responses cannot both win.

use std::sync::Arc;

use crate::common::time::Clock;
use crate::domain::{
    ConnectionId, ConversationId, Identity, Message, MessageContent, MessageId, MessagePayload,
    MessageStore, ProposalStatus, Role, RoomId, ScheduleOutcome, ScheduleProposal,
};
use crate::infrastructure::dto::websocket::{MessageDto, ServerEvent};
use crate::infrastructure::registry::ConnectionRegistry;
use crate::infrastructure::router::RoomRouter;

use super::error::EventError;

pub struct ScheduleUseCase {
    registry: Arc<ConnectionRegistry>,
    router: Arc<RoomRouter>,
    store: Arc<dyn MessageStore>,
    clock: Arc<dyn Clock>,
}

impl ScheduleUseCase {
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

    /// Propose a session. Only the conversation's tutor may propose.
    pub async fn propose(
        &self,
        connection: ConnectionId,
        conversation_id: String,
        subject_id: String,
        topic: String,
        scheduled_at: i64,
    ) -> Result<Message, EventError> {
        let identity = self.identity_of(&connection).await?;
        let conversation_id = ConversationId::new(conversation_id)?;
        let conversation = self.store.find_conversation(&conversation_id).await?;

        if conversation.role_of(&identity.user_id) != Some(Role::Tutor) {
            return Err(EventError::Authorization(
                "only the tutor may propose a session".to_string(),
            ));
        }

        let room = RoomId::Conversation(conversation_id.clone());
        if !self.router.is_member(&room, &connection).await {
            return Err(EventError::InvalidState(
                "join the conversation before proposing".to_string(),
            ));
        }

        let proposal = ScheduleProposal::new(subject_id, topic.clone(), scheduled_at)?;
        let content = MessageContent::new(format!("Proposed session: {topic}"))?;
        let created_at = self.clock.now_utc_millis();
        let message = Message::new(
            conversation_id.clone(),
            identity.user_id,
            content,
            MessagePayload::ScheduleRequest(proposal),
            created_at,
        );

        self.store.insert(message.clone()).await?;
        self.store
            .touch_conversation(&conversation_id, created_at)
            .await?;

        let frame = ServerEvent::NewMessage(MessageDto::from(&message)).to_frame();
        self.router.broadcast(&room, &frame, None).await;

        Ok(message)
    }

    /// Respond to a pending proposal. The responder must be a participant
    /// other than the proposer; a proposal resolves at most once.
    pub async fn respond(
        &self,
        connection: ConnectionId,
        conversation_id: String,
        message_id: String,
        status: ProposalStatus,
    ) -> Result<Message, EventError> {
        let identity = self.identity_of(&connection).await?;
        let conversation_id = ConversationId::new(conversation_id)?;
        let conversation = self.store.find_conversation(&conversation_id).await?;

        if !conversation.is_participant(&identity.user_id) {
            return Err(EventError::Authorization(
                "not a participant of this conversation".to_string(),
            ));
        }

        if !status.is_terminal() {
            return Err(EventError::InvalidPayload(
                "response must be accepted or rejected".to_string(),
            ));
        }

        let message_id = MessageId::parse(&message_id)?;
        let request = self
            .store
            .find_message(&conversation_id, &message_id)
            .await?;

        if request.sender_id == identity.user_id {
            return Err(EventError::Authorization(
                "the proposer cannot respond to their own proposal".to_string(),
            ));
        }

        // Atomic pending -> terminal transition; a concurrent second
        // response loses here and never overwrites.
        let resolved = self
            .store
            .resolve_proposal(&conversation_id, &message_id, status)
            .await?;
        let proposal = resolved
            .proposal()
            .ok_or_else(|| EventError::Internal("resolved message lost its proposal".to_string()))?;

        let outcome = ScheduleOutcome {
            request_message_id: resolved.id,
            subject_id: proposal.subject_id.clone(),
            topic: proposal.topic.clone(),
            scheduled_at: proposal.scheduled_at,
            status,
        };
        let content = MessageContent::new(format!("Session {}", status.as_str()))?;
        let created_at = self.clock.now_utc_millis();
        let response = Message::new(
            conversation_id.clone(),
            identity.user_id,
            content,
            MessagePayload::ScheduleResponse(outcome),
            created_at,
        );

        self.store.insert(response.clone()).await?;
        self.store
            .touch_conversation(&conversation_id, created_at)
            .await?;

        let room = RoomId::Conversation(conversation_id);
        let frame = ServerEvent::NewMessage(MessageDto::from(&response)).to_frame();
        self.router.broadcast(&room, &frame, None).await;

        Ok(response)
    }

    async fn identity_of(&self, connection: &ConnectionId) -> Result<Identity, EventError> {
        self.registry
            .identity_of(connection)
            .await
            .ok_or_else(|| EventError::Internal("connection not registered".to_string()))
    }
}
