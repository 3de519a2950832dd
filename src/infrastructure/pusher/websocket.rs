//! WebSocket-backed `EventPusher` implementation.
//!
//! The UI layer accepts the WebSocket and creates the outbound channel; this
//! implementation keeps the sender per connection and moves serialized
//! frames to it. Sends on unbounded channels never block, so pushes made
//! while the router holds its membership lock preserve broadcast order.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, EventPushError, EventPusher, PusherChannel};

/// Sender map keyed by connection id.
pub struct WebSocketEventPusher {
    connections: Mutex<HashMap<ConnectionId, PusherChannel>>,
}

impl WebSocketEventPusher {
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for WebSocketEventPusher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPusher for WebSocketEventPusher {
    async fn register(&self, connection: ConnectionId, sender: PusherChannel) {
        let mut connections = self.connections.lock().await;
        connections.insert(connection, sender);
        tracing::debug!("Connection '{}' registered with pusher", connection);
    }

    async fn unregister(&self, connection: &ConnectionId) {
        let mut connections = self.connections.lock().await;
        connections.remove(connection);
        tracing::debug!("Connection '{}' unregistered from pusher", connection);
    }

    async fn push_to(
        &self,
        connection: &ConnectionId,
        frame: &str,
    ) -> Result<(), EventPushError> {
        let connections = self.connections.lock().await;

        if let Some(sender) = connections.get(connection) {
            sender
                .send(frame.to_string())
                .map_err(|e| EventPushError::PushFailed(e.to_string()))?;
            Ok(())
        } else {
            Err(EventPushError::ConnectionNotFound(connection.to_string()))
        }
    }

    async fn broadcast(
        &self,
        targets: &[ConnectionId],
        frame: &str,
    ) -> Result<(), EventPushError> {
        let connections = self.connections.lock().await;

        for target in targets {
            if let Some(sender) = connections.get(target) {
                // a target disconnecting mid-broadcast is tolerated
                if let Err(e) = sender.send(frame.to_string()) {
                    tracing::warn!("Failed to push frame to connection '{}': {}", target, e);
                }
            } else {
                tracing::warn!("Connection '{}' not found during broadcast, skipping", target);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_push_to_registered_connection() {
        // given:
        let pusher = WebSocketEventPusher::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let connection = ConnectionId::generate();
        pusher.register(connection, tx).await;

        // when:
        let result = pusher.push_to(&connection, "hello").await;

        // then:
        assert!(result.is_ok());
        assert_eq!(rx.recv().await, Some("hello".to_string()));
    }

    #[tokio::test]
    async fn test_push_to_unknown_connection_fails() {
        // given:
        let pusher = WebSocketEventPusher::new();
        let connection = ConnectionId::generate();

        // when:
        let result = pusher.push_to(&connection, "hello").await;

        // then:
        assert!(matches!(
            result,
            Err(EventPushError::ConnectionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_targets() {
        // given:
        let pusher = WebSocketEventPusher::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        let a = ConnectionId::generate();
        let b = ConnectionId::generate();
        pusher.register(a, tx1).await;
        pusher.register(b, tx2).await;

        // when:
        let result = pusher.broadcast(&[a, b], "frame").await;

        // then:
        assert!(result.is_ok());
        assert_eq!(rx1.recv().await, Some("frame".to_string()));
        assert_eq!(rx2.recv().await, Some("frame".to_string()));
    }

    #[tokio::test]
    async fn test_broadcast_tolerates_missing_target() {
        // given:
        let pusher = WebSocketEventPusher::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let a = ConnectionId::generate();
        pusher.register(a, tx).await;

        // when:
        let result = pusher
            .broadcast(&[a, ConnectionId::generate()], "frame")
            .await;

        // then:
        assert!(result.is_ok());
        assert_eq!(rx.recv().await, Some("frame".to_string()));
    }

    #[tokio::test]
    async fn test_unregister_stops_delivery() {
        // given:
        let pusher = WebSocketEventPusher::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let a = ConnectionId::generate();
        pusher.register(a, tx).await;

        // when:
        pusher.unregister(&a).await;
        let result = pusher.push_to(&a, "frame").await;

        // then:
        assert!(result.is_err());
    }
}
