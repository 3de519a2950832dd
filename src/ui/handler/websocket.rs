//! WebSocket connection handler.
//!
//! One task pair per connection: a receive loop dispatching client events
//! to the use cases, and a push loop draining the connection's outbound
//! channel into the socket. Either loop ending aborts the other and runs
//! disconnect cleanup exactly once.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::common::time::rfc3339_to_timestamp;
use crate::domain::ConnectionId;
use crate::infrastructure::dto::websocket::{ClientEvent, ErrorCode, ServerEvent};
use crate::ui::state::AppState;
use crate::usecase::EventError;

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub token: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    // Authenticate before the upgrade so a bad credential refuses the
    // connection with a plain 401 instead of a doomed socket.
    let identity = match state.connect_usecase.authenticate(query.token.as_deref()) {
        Ok(identity) => identity,
        Err(e) => {
            tracing::warn!("Refusing WebSocket upgrade: {}", e);
            return Err(StatusCode::UNAUTHORIZED);
        }
    };

    let (tx, rx) = mpsc::unbounded_channel();
    let reply_tx = tx.clone();
    let connection = state.connect_usecase.execute(identity, tx).await;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, connection, rx, reply_tx)))
}

fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    connection: ConnectionId,
    rx: mpsc::UnboundedReceiver<String>,
    reply_tx: mpsc::UnboundedSender<String>,
) {
    let (sender, mut receiver) = socket.split();

    let state_clone = state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::debug!("WebSocket error on '{}': {}", connection, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    // Unparseable frames are logged and dropped; there is no
                    // event name to attach an error reply to.
                    let event = match serde_json::from_str::<ClientEvent>(&text) {
                        Ok(event) => event,
                        Err(e) => {
                            tracing::warn!(
                                "Dropping unparseable frame from '{}': {}",
                                connection,
                                e
                            );
                            continue;
                        }
                    };

                    if let Err(e) = dispatch(&state_clone, connection, event).await {
                        let frame = ServerEvent::Error {
                            code: error_code(&e),
                            message: e.to_string(),
                        }
                        .to_frame();
                        if reply_tx.send(frame).is_err() {
                            break;
                        }
                    }
                }
                Message::Close(_) => {
                    tracing::debug!("Connection '{}' requested close", connection);
                    break;
                }
                // Ping/pong is handled by the protocol layer.
                _ => {}
            }
        }
    });

    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state.disconnect_usecase.execute(connection).await;
}

async fn dispatch(
    state: &AppState,
    connection: ConnectionId,
    event: ClientEvent,
) -> Result<(), EventError> {
    match event {
        ClientEvent::JoinConversation { conversation_id } => {
            state
                .join_usecase
                .join_conversation(connection, conversation_id)
                .await
        }
        ClientEvent::SendMessage {
            conversation_id,
            content,
            ..
        } => state
            .send_message_usecase
            .execute(connection, conversation_id, content)
            .await
            .map(|_| ()),
        ClientEvent::Typing {
            conversation_id,
            is_typing,
        } => {
            state
                .typing_usecase
                .execute(connection, conversation_id, is_typing)
                .await
        }
        ClientEvent::MarkRead { conversation_id } => state
            .mark_read_usecase
            .execute(connection, conversation_id)
            .await
            .map(|_| ()),
        ClientEvent::JoinCommunityChat => state.join_usecase.join_community(connection).await,
        ClientEvent::SendCommunityMessage { content } => state
            .community_usecase
            .execute(connection, content)
            .await
            .map(|_| ()),
        ClientEvent::SendScheduleRequest {
            conversation_id,
            subject_id,
            topic,
            scheduled_at,
        } => {
            let scheduled_at = rfc3339_to_timestamp(&scheduled_at).ok_or_else(|| {
                EventError::InvalidPayload("scheduledAt must be an RFC 3339 timestamp".to_string())
            })?;
            state
                .schedule_usecase
                .propose(connection, conversation_id, subject_id, topic, scheduled_at)
                .await
                .map(|_| ())
        }
        ClientEvent::RespondToSchedule {
            conversation_id,
            message_id,
            status,
        } => state
            .schedule_usecase
            .respond(connection, conversation_id, message_id, status)
            .await
            .map(|_| ()),
        ClientEvent::JoinCall { session_id } => {
            state.call_usecase.join_call(connection, session_id).await
        }
        ClientEvent::WebrtcOffer { session_id, offer } => {
            state
                .call_usecase
                .forward_offer(connection, session_id, offer)
                .await
        }
        ClientEvent::WebrtcAnswer { session_id, answer } => {
            state
                .call_usecase
                .forward_answer(connection, session_id, answer)
                .await
        }
        ClientEvent::WebrtcIceCandidate {
            session_id,
            candidate,
        } => {
            state
                .call_usecase
                .forward_candidate(connection, session_id, candidate)
                .await
        }
        ClientEvent::EndCall { session_id } => {
            state.call_usecase.end_call(connection, session_id).await
        }
        ClientEvent::CallEvent {
            session_id,
            event_type,
        } => {
            state
                .call_usecase
                .forward_call_event(connection, session_id, event_type)
                .await
        }
    }
}

fn error_code(error: &EventError) -> ErrorCode {
    match error {
        EventError::Authorization(_) => ErrorCode::AuthorizationError,
        EventError::NotFound(_) => ErrorCode::NotFound,
        EventError::InvalidState(_) => ErrorCode::InvalidState,
        EventError::InvalidPayload(_) => ErrorCode::InvalidPayload,
        EventError::Internal(_) => ErrorCode::InternalError,
    }
}
