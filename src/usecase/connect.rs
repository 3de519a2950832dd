//! Connection establishment: credential check plus registration.

use std::sync::Arc;

use crate::domain::{AuthError, ConnectionId, EventPusher, Identity, PusherChannel, TokenVerifier};
use crate::infrastructure::registry::ConnectionRegistry;

pub struct ConnectUseCase {
    verifier: Arc<dyn TokenVerifier>,
    registry: Arc<ConnectionRegistry>,
    pusher: Arc<dyn EventPusher>,
}

impl ConnectUseCase {
    pub fn new(
        verifier: Arc<dyn TokenVerifier>,
        registry: Arc<ConnectionRegistry>,
        pusher: Arc<dyn EventPusher>,
    ) -> Self {
        Self {
            verifier,
            registry,
            pusher,
        }
    }

    /// Verify the bearer credential presented at upgrade time. Called before
    /// the WebSocket handshake completes; a failure refuses the connection.
    pub fn authenticate(&self, token: Option<&str>) -> Result<Identity, AuthError> {
        let token = token.ok_or(AuthError::MissingCredential)?;
        self.verifier.verify(token)
    }

    /// Register an authenticated connection and its outbound channel.
    pub async fn execute(&self, identity: Identity, sender: PusherChannel) -> ConnectionId {
        let connection_id = ConnectionId::generate();
        self.registry.register(connection_id, identity.clone()).await;
        self.pusher.register(connection_id, sender).await;
        tracing::info!(
            "Connection '{}' established for user '{}' ({})",
            connection_id,
            identity.user_id,
            identity.role
        );
        connection_id
    }
}
