//! User and connection identity.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::DomainError;
use super::room::RoomId;

/// Role of an authenticated user. The platform has exactly two sides of a
/// tutoring relationship; admins never hold relay connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Tutor,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Student => write!(f, "student"),
            Role::Tutor => write!(f, "tutor"),
        }
    }
}

/// Identifier of a platform user, issued by the external account service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(value: String) -> Result<Self, DomainError> {
        if value.trim().is_empty() {
            return Err(DomainError::invalid("user_id", "must not be empty"));
        }
        if value.len() > 128 {
            return Err(DomainError::invalid("user_id", "too long"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Identifier of a single live WebSocket connection. A user with several
/// tabs holds several connections, each with its own id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity resolved from a verified bearer credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub role: Role,
}

/// Ephemeral binding between a connection and its authenticated user,
/// together with the rooms the connection currently holds membership in.
#[derive(Debug, Clone)]
pub struct Connection {
    pub id: ConnectionId,
    pub user_id: UserId,
    pub role: Role,
    pub joined_rooms: HashSet<RoomId>,
}

impl Connection {
    pub fn new(id: ConnectionId, identity: Identity) -> Self {
        Self {
            id,
            user_id: identity.user_id,
            role: identity.role,
            joined_rooms: HashSet::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_rejects_empty_value() {
        // given:
        let value = "   ".to_string();

        // when:
        let result = UserId::new(value);

        // then:
        assert!(result.is_err());
    }

    #[test]
    fn test_user_id_accepts_normal_value() {
        // given:
        let value = "user-42".to_string();

        // when:
        let result = UserId::new(value);

        // then:
        assert_eq!(result.unwrap().as_str(), "user-42");
    }

    #[test]
    fn test_connection_ids_are_unique() {
        // given / when:
        let a = ConnectionId::generate();
        let b = ConnectionId::generate();

        // then:
        assert_ne!(a, b);
    }

    #[test]
    fn test_connection_starts_with_no_rooms() {
        // given:
        let identity = Identity {
            user_id: UserId::new("user-1".to_string()).unwrap(),
            role: Role::Tutor,
        };

        // when:
        let connection = Connection::new(ConnectionId::generate(), identity);

        // then:
        assert!(connection.joined_rooms.is_empty());
        assert_eq!(connection.role, Role::Tutor);
    }
}
