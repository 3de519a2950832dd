//! WebRTC signaling relay.
//!
//! The relay pairs up the two call peers, forwards their SDP and ICE
//! payloads verbatim and tears the room down on end_call. Malformed
//! signaling (unknown session, sender not in the room) is dropped with a
//! warning instead of failing the connection; offers raced against a join
//! are a normal occurrence, not an error.

use std::sync::Arc;

use serde_json::Value;

use crate::common::time::{Clock, timestamp_to_rfc3339};
use crate::domain::{
    CallPeer, ConnectionId, EventPusher, Identity, Role, RoomId, SessionId, SessionStore,
};
use crate::infrastructure::calls::CallDirectory;
use crate::infrastructure::dto::websocket::ServerEvent;
use crate::infrastructure::registry::ConnectionRegistry;
use crate::infrastructure::router::RoomRouter;

use super::error::EventError;

pub struct CallUseCase {
    registry: Arc<ConnectionRegistry>,
    router: Arc<RoomRouter>,
    pusher: Arc<dyn EventPusher>,
    calls: Arc<CallDirectory>,
    sessions: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
}

impl CallUseCase {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        router: Arc<RoomRouter>,
        pusher: Arc<dyn EventPusher>,
        calls: Arc<CallDirectory>,
        sessions: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            router,
            pusher,
            calls,
            sessions,
            clock,
        }
    }

    /// Join the call room of a session. The second joiner triggers
    /// `call_peer_joined` to the peer already present; the tutor side then
    /// creates the WebRTC offer (fixed rule, regardless of join order).
    pub async fn join_call(
        &self,
        connection: ConnectionId,
        session_id: String,
    ) -> Result<(), EventError> {
        let identity = self.identity_of(&connection).await?;
        let session = SessionId::new(session_id)?;

        let peer = CallPeer {
            connection_id: connection,
            user_id: identity.user_id.clone(),
            role: identity.role,
        };
        let existing = self.calls.join(session.clone(), peer).await?;

        let room = RoomId::Call(session.clone());
        self.router.join(room.clone(), connection).await;
        self.registry.track_join(&connection, room).await;

        if let Some(first_peer) = existing {
            let frame = ServerEvent::CallPeerJoined {
                session_id: session.to_string(),
                user_id: identity.user_id.to_string(),
                role: identity.role,
            }
            .to_frame();
            if let Err(e) = self.pusher.push_to(&first_peer.connection_id, &frame).await {
                tracing::warn!("Failed to notify first call peer: {}", e);
            }
        }
        Ok(())
    }

    pub async fn forward_offer(
        &self,
        connection: ConnectionId,
        session_id: String,
        offer: Value,
    ) -> Result<(), EventError> {
        self.forward(connection, session_id, move |session_id, from| {
            ServerEvent::WebrtcOffer {
                session_id,
                from,
                offer,
            }
        })
        .await
    }

    pub async fn forward_answer(
        &self,
        connection: ConnectionId,
        session_id: String,
        answer: Value,
    ) -> Result<(), EventError> {
        self.forward(connection, session_id, move |session_id, from| {
            ServerEvent::WebrtcAnswer {
                session_id,
                from,
                answer,
            }
        })
        .await
    }

    pub async fn forward_candidate(
        &self,
        connection: ConnectionId,
        session_id: String,
        candidate: Value,
    ) -> Result<(), EventError> {
        self.forward(connection, session_id, move |session_id, from| {
            ServerEvent::WebrtcIceCandidate {
                session_id,
                from,
                candidate,
            }
        })
        .await
    }

    /// Forward an in-call notification (mute, camera toggle, screen share)
    /// to the other peer, unexamined.
    pub async fn forward_call_event(
        &self,
        connection: ConnectionId,
        session_id: String,
        event_type: Value,
    ) -> Result<(), EventError> {
        self.forward(connection, session_id, move |session_id, from| {
            ServerEvent::CallEvent {
                session_id,
                from,
                event_type,
            }
        })
        .await
    }

    /// End the call: notify the remaining members, destroy the room and,
    /// when the tutor ended it, mark the session completed.
    pub async fn end_call(
        &self,
        connection: ConnectionId,
        session_id: String,
    ) -> Result<(), EventError> {
        let Ok(session) = SessionId::new(session_id) else {
            tracing::warn!("Dropping end_call with empty session id");
            return Ok(());
        };
        let Some(ender) = self.calls.peer_of(&session, &connection).await else {
            tracing::warn!(
                "Dropping end_call for session '{}' from non-member '{}'",
                session,
                connection
            );
            return Ok(());
        };

        let members = self.calls.end(&session).await.unwrap_or_default();
        let ended_at = timestamp_to_rfc3339(self.clock.now_utc_millis());
        let frame = ServerEvent::CallEnded {
            session_id: session.to_string(),
            ended_by: ender.user_id.to_string(),
            role: ender.role,
            ended_at,
        }
        .to_frame();

        let room = RoomId::Call(session.clone());
        for member in &members {
            self.router.leave(&room, &member.connection_id).await;
            self.registry.track_leave(&member.connection_id, &room).await;
            if member.connection_id != connection {
                if let Err(e) = self.pusher.push_to(&member.connection_id, &frame).await {
                    tracing::warn!("Failed to deliver call_ended: {}", e);
                }
            }
        }

        if ender.role == Role::Tutor {
            if let Err(e) = self.sessions.complete_session(&session).await {
                tracing::warn!("Failed to mark session '{}' completed: {}", session, e);
            }
        }
        Ok(())
    }

    /// Clean up call membership of a dropped connection. The peer left
    /// behind receives exactly one `call_ended`.
    pub async fn handle_disconnect(&self, connection: &ConnectionId) {
        let affected = self.calls.leave_all(connection).await;
        for (session, departed, remaining) in affected {
            let Some(remaining) = remaining else {
                continue;
            };
            let ended_at = timestamp_to_rfc3339(self.clock.now_utc_millis());
            let frame = ServerEvent::CallEnded {
                session_id: session.to_string(),
                ended_by: departed.user_id.to_string(),
                role: departed.role,
                ended_at,
            }
            .to_frame();
            if let Err(e) = self.pusher.push_to(&remaining.connection_id, &frame).await {
                tracing::warn!("Failed to deliver call_ended on disconnect: {}", e);
            }
        }
    }

    async fn forward(
        &self,
        connection: ConnectionId,
        session_id: String,
        build: impl FnOnce(String, String) -> ServerEvent,
    ) -> Result<(), EventError> {
        let Ok(session) = SessionId::new(session_id) else {
            tracing::warn!("Dropping signaling frame with empty session id");
            return Ok(());
        };
        let Some(sender) = self.calls.peer_of(&session, &connection).await else {
            tracing::warn!(
                "Dropping signaling frame for session '{}' from non-member '{}'",
                session,
                connection
            );
            return Ok(());
        };
        let Some(other) = self.calls.other_peer(&session, &connection).await else {
            tracing::debug!(
                "No peer yet in session '{}', dropping signaling frame",
                session
            );
            return Ok(());
        };

        let frame = build(session.to_string(), sender.user_id.to_string()).to_frame();
        if let Err(e) = self.pusher.push_to(&other.connection_id, &frame).await {
            tracing::warn!("Failed to forward signaling frame: {}", e);
        }
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
    use crate::common::time::FixedClock;
    use crate::domain::{MockSessionStore, Role, UserId};
    use crate::infrastructure::pusher::WebSocketEventPusher;
    use serde_json::json;
    use tokio::sync::mpsc;

    struct Fixture {
        usecase: CallUseCase,
        registry: Arc<ConnectionRegistry>,
        pusher: Arc<WebSocketEventPusher>,
        calls: Arc<CallDirectory>,
    }

    fn setup_with_sessions(sessions: MockSessionStore) -> Fixture {
        let registry = Arc::new(ConnectionRegistry::new());
        let pusher = Arc::new(WebSocketEventPusher::new());
        let router = Arc::new(RoomRouter::new(pusher.clone()));
        let calls = Arc::new(CallDirectory::new());
        Fixture {
            usecase: CallUseCase::new(
                registry.clone(),
                router,
                pusher.clone(),
                calls.clone(),
                Arc::new(sessions),
                Arc::new(FixedClock::new(1746093600000)),
            ),
            registry,
            pusher,
            calls,
        }
    }

    fn setup() -> Fixture {
        let mut sessions = MockSessionStore::new();
        sessions.expect_complete_session().returning(|_| Ok(()));
        setup_with_sessions(sessions)
    }

    async fn connect(
        fixture: &Fixture,
        user: &str,
        role: Role,
    ) -> (ConnectionId, mpsc::UnboundedReceiver<String>) {
        let connection = ConnectionId::generate();
        fixture
            .registry
            .register(
                connection,
                Identity {
                    user_id: UserId::new(user.to_string()).unwrap(),
                    role,
                },
            )
            .await;
        let (tx, rx) = mpsc::unbounded_channel();
        fixture.pusher.register(connection, tx).await;
        (connection, rx)
    }

    #[tokio::test]
    async fn test_second_join_notifies_first_peer_only() {
        // given:
        let fixture = setup();
        let (tutor, mut tutor_rx) = connect(&fixture, "tutor-1", Role::Tutor).await;
        let (student, mut student_rx) = connect(&fixture, "student-1", Role::Student).await;
        fixture
            .usecase
            .join_call(tutor, "sess-1".to_string())
            .await
            .unwrap();

        // when:
        fixture
            .usecase
            .join_call(student, "sess-1".to_string())
            .await
            .unwrap();

        // then: the first peer learns who joined; the joiner gets nothing
        let frame = tutor_rx.recv().await.unwrap();
        assert!(frame.contains("call_peer_joined"));
        assert!(frame.contains("student-1"));
        assert!(student_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_third_member_is_rejected() {
        // given:
        let fixture = setup();
        let (tutor, _rx1) = connect(&fixture, "tutor-1", Role::Tutor).await;
        let (student, _rx2) = connect(&fixture, "student-1", Role::Student).await;
        let (intruder, _rx3) = connect(&fixture, "student-2", Role::Student).await;
        fixture
            .usecase
            .join_call(tutor, "sess-1".to_string())
            .await
            .unwrap();
        fixture
            .usecase
            .join_call(student, "sess-1".to_string())
            .await
            .unwrap();

        // when:
        let result = fixture.usecase.join_call(intruder, "sess-1".to_string()).await;

        // then:
        assert!(matches!(result, Err(EventError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_candidates_forward_verbatim_and_in_order() {
        // given:
        let fixture = setup();
        let (tutor, _tutor_rx) = connect(&fixture, "tutor-1", Role::Tutor).await;
        let (student, mut student_rx) = connect(&fixture, "student-1", Role::Student).await;
        fixture
            .usecase
            .join_call(tutor, "sess-1".to_string())
            .await
            .unwrap();
        fixture
            .usecase
            .join_call(student, "sess-1".to_string())
            .await
            .unwrap();

        // when:
        for i in 0..3 {
            fixture
                .usecase
                .forward_candidate(
                    tutor,
                    "sess-1".to_string(),
                    json!({"candidate": format!("candidate:{i}"), "sdpMLineIndex": i}),
                )
                .await
                .unwrap();
        }

        // then: same payloads, same order, sender attached
        for i in 0..3 {
            let frame = student_rx.recv().await.unwrap();
            let value: Value = serde_json::from_str(&frame).unwrap();
            assert_eq!(value["event"], "webrtc_ice_candidate");
            assert_eq!(value["data"]["from"], "tutor-1");
            assert_eq!(
                value["data"]["candidate"]["candidate"],
                format!("candidate:{i}")
            );
        }
    }

    #[tokio::test]
    async fn test_signaling_from_outside_the_room_is_dropped() {
        // given:
        let fixture = setup();
        let (tutor, _tutor_rx) = connect(&fixture, "tutor-1", Role::Tutor).await;
        let (outsider, _outsider_rx) = connect(&fixture, "student-9", Role::Student).await;
        fixture
            .usecase
            .join_call(tutor, "sess-1".to_string())
            .await
            .unwrap();

        // when:
        let result = fixture
            .usecase
            .forward_offer(outsider, "sess-1".to_string(), json!({"sdp": "x"}))
            .await;

        // then: dropped without error
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_tutor_end_call_completes_session() {
        // given:
        let mut sessions = MockSessionStore::new();
        sessions
            .expect_complete_session()
            .times(1)
            .returning(|_| Ok(()));
        let fixture = setup_with_sessions(sessions);
        let (tutor, _tutor_rx) = connect(&fixture, "tutor-1", Role::Tutor).await;
        let (student, mut student_rx) = connect(&fixture, "student-1", Role::Student).await;
        fixture
            .usecase
            .join_call(tutor, "sess-1".to_string())
            .await
            .unwrap();
        fixture
            .usecase
            .join_call(student, "sess-1".to_string())
            .await
            .unwrap();

        // when:
        fixture
            .usecase
            .end_call(tutor, "sess-1".to_string())
            .await
            .unwrap();

        // then: the other peer is told, room destroyed
        let frame = student_rx.recv().await.unwrap();
        assert!(frame.contains("call_ended"));
        assert!(frame.contains("tutor-1"));
        assert!(
            !fixture
                .calls
                .contains(&SessionId::new("sess-1".to_string()).unwrap())
                .await
        );
    }

    #[tokio::test]
    async fn test_student_end_call_does_not_complete_session() {
        // given:
        let mut sessions = MockSessionStore::new();
        sessions.expect_complete_session().never();
        let fixture = setup_with_sessions(sessions);
        let (tutor, mut tutor_rx) = connect(&fixture, "tutor-1", Role::Tutor).await;
        let (student, _student_rx) = connect(&fixture, "student-1", Role::Student).await;
        fixture
            .usecase
            .join_call(tutor, "sess-1".to_string())
            .await
            .unwrap();
        fixture
            .usecase
            .join_call(student, "sess-1".to_string())
            .await
            .unwrap();

        // when:
        fixture
            .usecase
            .end_call(student, "sess-1".to_string())
            .await
            .unwrap();

        // then:
        // skip the call_peer_joined frame from the setup phase
        let first = tutor_rx.recv().await.unwrap();
        assert!(first.contains("call_peer_joined"));
        let frame = tutor_rx.recv().await.unwrap();
        assert!(frame.contains("call_ended"));
        assert!(frame.contains("student-1"));
    }

    #[tokio::test]
    async fn test_disconnect_emits_single_call_ended() {
        // given:
        let fixture = setup();
        let (tutor, _tutor_rx) = connect(&fixture, "tutor-1", Role::Tutor).await;
        let (student, mut student_rx) = connect(&fixture, "student-1", Role::Student).await;
        fixture
            .usecase
            .join_call(tutor, "sess-1".to_string())
            .await
            .unwrap();
        fixture
            .usecase
            .join_call(student, "sess-1".to_string())
            .await
            .unwrap();

        // when:
        fixture.usecase.handle_disconnect(&tutor).await;

        // then: exactly one call_ended reaches the remaining peer
        let frame = student_rx.recv().await.unwrap();
        assert!(frame.contains("call_ended"));
        assert!(frame.contains("tutor-1"));
        assert!(student_rx.try_recv().is_err());
    }
}
