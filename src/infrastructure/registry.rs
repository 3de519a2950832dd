//! Connection registry: the connection <-> user binding.
//!
//! Owned exclusively by the gateway side of the relay. A user may hold
//! several simultaneous connections (multiple tabs); none evicts another.

use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::domain::{Connection, ConnectionId, Identity, RoomId, UserId};

pub struct ConnectionRegistry {
    connections: Mutex<HashMap<ConnectionId, Connection>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(HashMap::new()),
        }
    }

    /// Bind a new connection to an authenticated identity.
    pub async fn register(&self, connection: ConnectionId, identity: Identity) {
        let mut connections = self.connections.lock().await;
        connections.insert(connection, Connection::new(connection, identity));
    }

    /// Remove a connection, returning its final state (including the rooms
    /// it still held membership in).
    pub async fn remove(&self, connection: &ConnectionId) -> Option<Connection> {
        let mut connections = self.connections.lock().await;
        connections.remove(connection)
    }

    pub async fn identity_of(&self, connection: &ConnectionId) -> Option<Identity> {
        let connections = self.connections.lock().await;
        connections.get(connection).map(|c| Identity {
            user_id: c.user_id.clone(),
            role: c.role,
        })
    }

    pub async fn track_join(&self, connection: &ConnectionId, room: RoomId) {
        let mut connections = self.connections.lock().await;
        if let Some(c) = connections.get_mut(connection) {
            c.joined_rooms.insert(room);
        }
    }

    pub async fn track_leave(&self, connection: &ConnectionId, room: &RoomId) {
        let mut connections = self.connections.lock().await;
        if let Some(c) = connections.get_mut(connection) {
            c.joined_rooms.remove(room);
        }
    }

    /// All live connections of one user.
    pub async fn connections_of(&self, user: &UserId) -> Vec<ConnectionId> {
        let connections = self.connections.lock().await;
        connections
            .values()
            .filter(|c| &c.user_id == user)
            .map(|c| c.id)
            .collect()
    }

    pub async fn count(&self) -> usize {
        let connections = self.connections.lock().await;
        connections.len()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
