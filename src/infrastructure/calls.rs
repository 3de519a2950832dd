//! Directory of live call rooms, keyed by session.
//!
//! Rooms are created lazily on the first join and removed when the call
//! ends or the last member leaves. Occupancy rules live in the domain
//! `CallRoom`; this map only guards concurrent access.

use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::domain::{CallPeer, CallRoom, ConnectionId, DomainError, SessionId};

pub struct CallDirectory {
    rooms: Mutex<HashMap<SessionId, CallRoom>>,
}

impl CallDirectory {
    pub fn new() -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
        }
    }

    /// Join the room of `session`, creating it if this is the first join.
    /// On the second join, returns the peer that was already present.
    pub async fn join(
        &self,
        session: SessionId,
        peer: CallPeer,
    ) -> Result<Option<CallPeer>, DomainError> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms
            .entry(session.clone())
            .or_insert_with(|| CallRoom::new(session));
        room.join(peer)
    }

    pub async fn peer_of(&self, session: &SessionId, connection: &ConnectionId) -> Option<CallPeer> {
        let rooms = self.rooms.lock().await;
        rooms
            .get(session)
            .and_then(|room| room.peer_of(connection).cloned())
    }

    /// The member of the session's room that is not `connection`, if any.
    pub async fn other_peer(
        &self,
        session: &SessionId,
        connection: &ConnectionId,
    ) -> Option<CallPeer> {
        let rooms = self.rooms.lock().await;
        rooms
            .get(session)
            .and_then(|room| room.other_peer(connection).cloned())
    }

    /// End the call and destroy the room. Returns the members present at
    /// that moment, or `None` if no such room existed.
    pub async fn end(&self, session: &SessionId) -> Option<Vec<CallPeer>> {
        let mut rooms = self.rooms.lock().await;
        let mut room = rooms.remove(session)?;
        Some(room.end())
    }

    /// Remove `connection` from the room of `session`. Returns the departed
    /// peer and the remaining one (if any); destroys the room once empty.
    pub async fn leave(
        &self,
        session: &SessionId,
        connection: &ConnectionId,
    ) -> Option<(CallPeer, Option<CallPeer>)> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms.get_mut(session)?;
        let departed = room.leave(connection)?;
        let remaining = room.peers().first().cloned();
        if room.is_empty() {
            rooms.remove(session);
        }
        Some((departed, remaining))
    }

    /// Remove `connection` from every room it participates in; used on
    /// disconnect. Returns, per affected session, the departed peer and the
    /// member left behind (if any).
    pub async fn leave_all(
        &self,
        connection: &ConnectionId,
    ) -> Vec<(SessionId, CallPeer, Option<CallPeer>)> {
        let mut rooms = self.rooms.lock().await;
        let affected: Vec<SessionId> = rooms
            .iter()
            .filter(|(_, room)| room.peer_of(connection).is_some())
            .map(|(session, _)| session.clone())
            .collect();

        let mut result = Vec::new();
        for session in affected {
            if let Some(room) = rooms.get_mut(&session) {
                if let Some(departed) = room.leave(connection) {
                    let remaining = room.peers().first().cloned();
                    if room.is_empty() {
                        rooms.remove(&session);
                    }
                    result.push((session, departed, remaining));
                }
            }
        }
        result
    }

    pub async fn contains(&self, session: &SessionId) -> bool {
        let rooms = self.rooms.lock().await;
        rooms.contains_key(session)
    }
}

impl Default for CallDirectory {
    fn default() -> Self {
        Self::new()
    }
}
