//! Room identity and the membership registry.
//!
//! The registry is a plain map from room id to the set of connections that
//! receive its broadcasts. It is pure state; the router in the
//! infrastructure layer wraps it in a mutex and serializes broadcasts.

use std::collections::{HashMap, HashSet};
use std::fmt;

use super::call::SessionId;
use super::conversation::ConversationId;
use super::identity::ConnectionId;

/// The three room classes of the relay.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RoomId {
    /// Per-conversation room, exactly two logical participants.
    Conversation(ConversationId),
    /// The single public community channel.
    Community,
    /// Per-session call room, at most two members.
    Call(SessionId),
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomId::Conversation(id) => write!(f, "conversation:{id}"),
            RoomId::Community => write!(f, "community"),
            RoomId::Call(id) => write!(f, "call:{id}"),
        }
    }
}

/// Membership registry: room id -> set of member connections.
#[derive(Debug, Default)]
pub struct Rooms {
    map: HashMap<RoomId, HashSet<ConnectionId>>,
}

impl Rooms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection to a room. Returns false if it was already a member.
    pub fn join(&mut self, room: RoomId, connection: ConnectionId) -> bool {
        self.map.entry(room).or_default().insert(connection)
    }

    /// Remove a connection from a room, dropping the room once empty.
    /// Returns false if the connection was not a member.
    pub fn leave(&mut self, room: &RoomId, connection: &ConnectionId) -> bool {
        let Some(members) = self.map.get_mut(room) else {
            return false;
        };
        let removed = members.remove(connection);
        if members.is_empty() {
            self.map.remove(room);
        }
        removed
    }

    pub fn contains(&self, room: &RoomId, connection: &ConnectionId) -> bool {
        self.map
            .get(room)
            .is_some_and(|members| members.contains(connection))
    }

    pub fn members(&self, room: &RoomId) -> Vec<ConnectionId> {
        self.map
            .get(room)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Remove a connection from every room it joined, returning the room ids
    /// it held membership in. Used on disconnect.
    pub fn drain_connection(&mut self, connection: &ConnectionId) -> Vec<RoomId> {
        let joined: Vec<RoomId> = self
            .map
            .iter()
            .filter(|(_, members)| members.contains(connection))
            .map(|(room, _)| room.clone())
            .collect();
        for room in &joined {
            self.leave(room, connection);
        }
        joined
    }

    pub fn room_count(&self) -> usize {
        self.map.len()
    }
}
