//! Call rooms for WebRTC signaling.
//!
//! A call room holds at most two peers for a scheduled session. The room is
//! created lazily on the first join and destroyed on end_call or when both
//! members have left. The relay only tracks occupancy; SDP and ICE payloads
//! pass through unexamined.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::identity::{ConnectionId, Role, UserId};

/// Identifier of a scheduled session, issued by the session CRUD service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(value: String) -> Result<Self, DomainError> {
        if value.trim().is_empty() {
            return Err(DomainError::invalid("session_id", "must not be empty"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Occupancy state of a call room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallRoomState {
    Empty,
    OnePeer,
    TwoPeers,
    Ended,
}

/// A connection participating in a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallPeer {
    pub connection_id: ConnectionId,
    pub user_id: UserId,
    pub role: Role,
}

/// Per-session call room: `empty -> one_peer -> two_peers -> ended`.
#[derive(Debug, Clone)]
pub struct CallRoom {
    pub session_id: SessionId,
    peers: Vec<CallPeer>,
    state: CallRoomState,
}

impl CallRoom {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            peers: Vec::new(),
            state: CallRoomState::Empty,
        }
    }

    pub fn state(&self) -> CallRoomState {
        self.state
    }

    pub fn peers(&self) -> &[CallPeer] {
        &self.peers
    }

    /// Join the room. On the second join, returns the peer that was already
    /// present so the relay can notify it. A third concurrent member is
    /// rejected; joining an ended room is rejected.
    pub fn join(&mut self, peer: CallPeer) -> Result<Option<CallPeer>, DomainError> {
        if self.state == CallRoomState::Ended {
            return Err(DomainError::CallEnded);
        }
        if self.peers.len() >= 2 {
            return Err(DomainError::CallRoomFull);
        }
        let existing = self.peers.first().cloned();
        self.peers.push(peer);
        self.state = if self.peers.len() == 2 {
            CallRoomState::TwoPeers
        } else {
            CallRoomState::OnePeer
        };
        Ok(existing)
    }

    /// Remove a peer. Returns the departed peer if it was a member.
    pub fn leave(&mut self, connection_id: &ConnectionId) -> Option<CallPeer> {
        let idx = self
            .peers
            .iter()
            .position(|p| &p.connection_id == connection_id)?;
        let departed = self.peers.remove(idx);
        if self.state != CallRoomState::Ended {
            self.state = match self.peers.len() {
                0 => CallRoomState::Empty,
                1 => CallRoomState::OnePeer,
                _ => CallRoomState::TwoPeers,
            };
        }
        Some(departed)
    }

    /// Mark the call ended, returning the members present at that moment.
    pub fn end(&mut self) -> Vec<CallPeer> {
        self.state = CallRoomState::Ended;
        std::mem::take(&mut self.peers)
    }

    pub fn peer_of(&self, connection_id: &ConnectionId) -> Option<&CallPeer> {
        self.peers
            .iter()
            .find(|p| &p.connection_id == connection_id)
    }

    /// The member that is not `connection_id`, if any.
    pub fn other_peer(&self, connection_id: &ConnectionId) -> Option<&CallPeer> {
        self.peers
            .iter()
            .find(|p| &p.connection_id != connection_id)
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer(user: &str, role: Role) -> CallPeer {
        CallPeer {
            connection_id: ConnectionId::generate(),
            user_id: UserId::new(user.to_string()).unwrap(),
            role,
        }
    }

    fn session() -> SessionId {
        SessionId::new("sess-42".to_string()).unwrap()
    }

    #[test]
    fn test_first_join_reaches_one_peer() {
        // given:
        let mut room = CallRoom::new(session());

        // when:
        let existing = room.join(peer("tutor-1", Role::Tutor)).unwrap();

        // then:
        assert_eq!(existing, None);
        assert_eq!(room.state(), CallRoomState::OnePeer);
    }

    #[test]
    fn test_second_join_returns_first_peer() {
        // given:
        let mut room = CallRoom::new(session());
        let tutor = peer("tutor-1", Role::Tutor);
        room.join(tutor.clone()).unwrap();

        // when:
        let existing = room.join(peer("student-1", Role::Student)).unwrap();

        // then:
        assert_eq!(existing, Some(tutor));
        assert_eq!(room.state(), CallRoomState::TwoPeers);
    }

    #[test]
    fn test_third_join_is_rejected() {
        // given:
        let mut room = CallRoom::new(session());
        room.join(peer("tutor-1", Role::Tutor)).unwrap();
        room.join(peer("student-1", Role::Student)).unwrap();

        // when:
        let result = room.join(peer("student-2", Role::Student));

        // then:
        assert_eq!(result, Err(DomainError::CallRoomFull));
        assert_eq!(room.peers().len(), 2);
    }

    #[test]
    fn test_join_after_end_is_rejected() {
        // given:
        let mut room = CallRoom::new(session());
        room.join(peer("tutor-1", Role::Tutor)).unwrap();
        room.end();

        // when:
        let result = room.join(peer("student-1", Role::Student));

        // then:
        assert_eq!(result, Err(DomainError::CallEnded));
    }

    #[test]
    fn test_leave_returns_departed_peer() {
        // given:
        let mut room = CallRoom::new(session());
        let tutor = peer("tutor-1", Role::Tutor);
        let student = peer("student-1", Role::Student);
        room.join(tutor.clone()).unwrap();
        room.join(student.clone()).unwrap();

        // when:
        let departed = room.leave(&tutor.connection_id);

        // then:
        assert_eq!(departed, Some(tutor));
        assert_eq!(room.state(), CallRoomState::OnePeer);
        assert_eq!(
            room.other_peer(&ConnectionId::generate()),
            Some(&student)
        );
    }

    #[test]
    fn test_leave_of_non_member_is_none() {
        // given:
        let mut room = CallRoom::new(session());
        room.join(peer("tutor-1", Role::Tutor)).unwrap();

        // when:
        let departed = room.leave(&ConnectionId::generate());

        // then:
        assert_eq!(departed, None);
        assert_eq!(room.state(), CallRoomState::OnePeer);
    }

    #[test]
    fn test_end_drains_members() {
        // given:
        let mut room = CallRoom::new(session());
        room.join(peer("tutor-1", Role::Tutor)).unwrap();
        room.join(peer("student-1", Role::Student)).unwrap();

        // when:
        let members = room.end();

        // then:
        assert_eq!(members.len(), 2);
        assert!(room.is_empty());
        assert_eq!(room.state(), CallRoomState::Ended);
    }
}
