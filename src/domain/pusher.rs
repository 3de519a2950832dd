//! Event delivery port.
//!
//! The pusher owns the per-connection outbound channels. Room membership
//! and targeting decisions are made by the router; the pusher only moves
//! serialized frames to connections.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use super::identity::ConnectionId;

/// Outbound channel handed to the pusher when a connection registers.
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventPushError {
    #[error("connection '{0}' not found")]
    ConnectionNotFound(String),

    #[error("push failed: {0}")]
    PushFailed(String),
}

/// Event pusher port.
#[async_trait]
pub trait EventPusher: Send + Sync {
    async fn register(&self, connection: ConnectionId, sender: PusherChannel);

    async fn unregister(&self, connection: &ConnectionId);

    /// Push a frame to a single connection.
    async fn push_to(&self, connection: &ConnectionId, frame: &str)
    -> Result<(), EventPushError>;

    /// Push a frame to several connections. Individual failures (a target
    /// disconnecting mid-broadcast) are tolerated and logged.
    async fn broadcast(
        &self,
        targets: &[ConnectionId],
        frame: &str,
    ) -> Result<(), EventPushError>;
}
