//! HTTP API endpoint handlers.
//!
//! The HTTP surface exists for resynchronization (history fetches after a
//! reconnect) and for the conversation registration feed from the
//! platform's CRUD service. Everything real-time goes over the WebSocket.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::domain::{Conversation, ConversationId, RepositoryError, UserId};
use crate::infrastructure::dto::http::{ConversationDto, RegisterConversationRequest};
use crate::infrastructure::dto::websocket::{CommunityMessageDto, MessageDto};
use crate::ui::state::AppState;

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Register a conversation binding so membership checks can be enforced.
/// Idempotent; conversations are never deleted.
pub async fn register_conversation(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterConversationRequest>,
) -> Result<(StatusCode, Json<ConversationDto>), StatusCode> {
    let conversation = Conversation::new(
        ConversationId::new(body.id).map_err(|_| StatusCode::BAD_REQUEST)?,
        UserId::new(body.student_id).map_err(|_| StatusCode::BAD_REQUEST)?,
        UserId::new(body.tutor_id).map_err(|_| StatusCode::BAD_REQUEST)?,
    );
    let dto = ConversationDto {
        id: conversation.id.to_string(),
        student_id: conversation.student.to_string(),
        tutor_id: conversation.tutor.to_string(),
        last_message_at: None,
    };
    state
        .store
        .upsert_conversation(conversation)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok((StatusCode::CREATED, Json(dto)))
}

/// Ordered message history of one conversation.
pub async fn get_conversation_messages(
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<String>,
) -> Result<Json<Vec<MessageDto>>, StatusCode> {
    let conversation_id =
        ConversationId::new(conversation_id).map_err(|_| StatusCode::BAD_REQUEST)?;
    // The history query alone cannot tell an unregistered conversation from
    // an empty one, so resolve the conversation first.
    if let Err(e) = state.store.find_conversation(&conversation_id).await {
        return match e {
            RepositoryError::ConversationNotFound(_) => Err(StatusCode::NOT_FOUND),
            e => {
                tracing::error!("Failed to resolve conversation: {}", e);
                Err(StatusCode::INTERNAL_SERVER_ERROR)
            }
        };
    }
    match state.store.query_by_conversation(&conversation_id).await {
        Ok(messages) => Ok(Json(messages.iter().map(MessageDto::from).collect())),
        Err(e) => {
            tracing::error!("Failed to load conversation history: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

const DEFAULT_COMMUNITY_HISTORY_LIMIT: usize = 50;

/// Last N community messages, oldest first. Rejected messages are never
/// persisted, so they cannot appear here.
pub async fn get_community_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<CommunityMessageDto>>, StatusCode> {
    let limit = query.limit.unwrap_or(DEFAULT_COMMUNITY_HISTORY_LIMIT);
    match state
        .store
        .query_by_conversation(&ConversationId::community())
        .await
    {
        Ok(messages) => {
            let start = messages.len().saturating_sub(limit);
            Ok(Json(
                messages[start..].iter().map(CommunityMessageDto::from).collect(),
            ))
        }
        Err(e) => {
            tracing::error!("Failed to load community history: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
