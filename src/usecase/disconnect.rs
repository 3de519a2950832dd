//! Disconnect cleanup. Runs when a connection's socket task ends, whatever
//! the cause; all state tied to the connection is released immediately.

use std::sync::Arc;

use crate::domain::{ConnectionId, EventPusher};
use crate::infrastructure::registry::ConnectionRegistry;
use crate::infrastructure::router::RoomRouter;

use super::call::CallUseCase;

pub struct DisconnectUseCase {
    registry: Arc<ConnectionRegistry>,
    router: Arc<RoomRouter>,
    pusher: Arc<dyn EventPusher>,
    calls: Arc<CallUseCase>,
}

impl DisconnectUseCase {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        router: Arc<RoomRouter>,
        pusher: Arc<dyn EventPusher>,
        calls: Arc<CallUseCase>,
    ) -> Self {
        Self {
            registry,
            router,
            pusher,
            calls,
        }
    }

    /// Drop every trace of the connection: call rooms first (the abandoned
    /// peer gets its call_ended), then room memberships, registry binding
    /// and the outbound channel.
    pub async fn execute(&self, connection: ConnectionId) {
        self.calls.handle_disconnect(&connection).await;
        let drained = self.router.drain_connection(&connection).await;
        let removed = self.registry.remove(&connection).await;
        self.pusher.unregister(&connection).await;

        match removed {
            Some(binding) => tracing::info!(
                "Connection '{}' of user '{}' closed, left {} room(s)",
                connection,
                binding.user_id,
                drained.len()
            ),
            None => tracing::warn!("Disconnect for unknown connection '{}'", connection),
        }
    }
}
