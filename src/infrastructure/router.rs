//! Room router: membership plus ordered broadcast.
//!
//! All membership mutations and broadcasts go through one mutex. The lock
//! is held across the channel sends of a broadcast; because the pusher's
//! channels are unbounded the sends never block, and every member observes
//! the broadcasts of a room in the same relative order.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{ConnectionId, EventPusher, RoomId, Rooms};

pub struct RoomRouter {
    rooms: Mutex<Rooms>,
    pusher: Arc<dyn EventPusher>,
}

impl RoomRouter {
    pub fn new(pusher: Arc<dyn EventPusher>) -> Self {
        Self {
            rooms: Mutex::new(Rooms::new()),
            pusher,
        }
    }

    pub async fn join(&self, room: RoomId, connection: ConnectionId) {
        let mut rooms = self.rooms.lock().await;
        if rooms.join(room.clone(), connection) {
            tracing::debug!("Connection '{}' joined room '{}'", connection, room);
        }
    }

    pub async fn leave(&self, room: &RoomId, connection: &ConnectionId) {
        let mut rooms = self.rooms.lock().await;
        if rooms.leave(room, connection) {
            tracing::debug!("Connection '{}' left room '{}'", connection, room);
        }
    }

    pub async fn is_member(&self, room: &RoomId, connection: &ConnectionId) -> bool {
        let rooms = self.rooms.lock().await;
        rooms.contains(room, connection)
    }

    pub async fn members_of(&self, room: &RoomId) -> Vec<ConnectionId> {
        let rooms = self.rooms.lock().await;
        rooms.members(room)
    }

    /// Broadcast a frame to every member of a room, optionally excluding one
    /// connection (e.g. the typing origin). Returns the targeted members.
    ///
    /// The membership lock is held until the frame is handed to every
    /// member's channel, which is what guarantees per-room ordering.
    pub async fn broadcast(
        &self,
        room: &RoomId,
        frame: &str,
        exclude: Option<&ConnectionId>,
    ) -> Vec<ConnectionId> {
        let rooms = self.rooms.lock().await;
        let targets: Vec<ConnectionId> = rooms
            .members(room)
            .into_iter()
            .filter(|c| Some(c) != exclude)
            .collect();

        if let Err(e) = self.pusher.broadcast(&targets, frame).await {
            tracing::warn!("Broadcast to room '{}' failed: {}", room, e);
        }

        targets
    }

    /// Remove a connection from every room it joined; used on disconnect.
    /// Returns the rooms the connection was a member of.
    pub async fn drain_connection(&self, connection: &ConnectionId) -> Vec<RoomId> {
        let mut rooms = self.rooms.lock().await;
        rooms.drain_connection(connection)
    }
}
