//! Conversations between one student and one tutor.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::identity::{Role, UserId};

/// Identifier of a conversation, issued by the external CRUD service when
/// the student first contacts the tutor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(value: String) -> Result<Self, DomainError> {
        if value.trim().is_empty() {
            return Err(DomainError::invalid("conversation_id", "must not be empty"));
        }
        Ok(Self(value))
    }

    /// Sentinel id of the single public community channel.
    pub fn community() -> Self {
        Self("community".to_string())
    }

    pub fn is_community(&self) -> bool {
        self.0 == "community"
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ConversationId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A student/tutor conversation. Created on first contact, never deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: ConversationId,
    pub student: UserId,
    pub tutor: UserId,
    /// Unix millis of the most recent message, `None` before first message.
    pub last_message_at: Option<i64>,
}

impl Conversation {
    pub fn new(id: ConversationId, student: UserId, tutor: UserId) -> Self {
        Self {
            id,
            student,
            tutor,
            last_message_at: None,
        }
    }

    pub fn is_participant(&self, user: &UserId) -> bool {
        &self.student == user || &self.tutor == user
    }

    /// The other party of the conversation, if `user` is a participant.
    pub fn counterpart(&self, user: &UserId) -> Option<&UserId> {
        if user == &self.student {
            Some(&self.tutor)
        } else if user == &self.tutor {
            Some(&self.student)
        } else {
            None
        }
    }

    pub fn role_of(&self, user: &UserId) -> Option<Role> {
        if user == &self.student {
            Some(Role::Student)
        } else if user == &self.tutor {
            Some(Role::Tutor)
        } else {
            None
        }
    }
}
