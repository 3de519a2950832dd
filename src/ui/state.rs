//! Shared application state handed to the axum handlers.

use std::sync::Arc;

use crate::domain::MessageStore;
use crate::usecase::{
    CallUseCase, CommunityMessageUseCase, ConnectUseCase, DisconnectUseCase, JoinRoomUseCase,
    MarkReadUseCase, ScheduleUseCase, SendMessageUseCase, TypingUseCase,
};

pub struct AppState {
    pub connect_usecase: Arc<ConnectUseCase>,
    pub disconnect_usecase: Arc<DisconnectUseCase>,
    pub join_usecase: Arc<JoinRoomUseCase>,
    pub send_message_usecase: Arc<SendMessageUseCase>,
    pub mark_read_usecase: Arc<MarkReadUseCase>,
    pub community_usecase: Arc<CommunityMessageUseCase>,
    pub schedule_usecase: Arc<ScheduleUseCase>,
    pub call_usecase: Arc<CallUseCase>,
    pub typing_usecase: Arc<TypingUseCase>,
    /// Used directly by the HTTP history endpoints.
    pub store: Arc<dyn MessageStore>,
}
