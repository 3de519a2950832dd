//! Domain model of the relay core.
//!
//! Value objects, entities and state machines are defined here along with
//! the ports (traits) the use cases depend on. Implementations of the ports
//! live in the infrastructure layer (dependency inversion).

mod auth;
mod call;
mod conversation;
mod error;
mod identity;
mod message;
mod moderation;
mod pusher;
mod repository;
mod room;
mod schedule;

pub use auth::{AuthError, TokenVerifier};
pub use call::{CallPeer, CallRoom, CallRoomState, SessionId};
pub use conversation::{Conversation, ConversationId};
pub use error::DomainError;
pub use identity::{Connection, ConnectionId, Identity, Role, UserId};
pub use message::{Message, MessageContent, MessageId, MessageKind, MessagePayload, MessageStatus};
pub use moderation::{ModerationError, ModerationGate, Verdict};
pub use pusher::{EventPushError, EventPusher, PusherChannel};
pub use repository::{MessageStore, RepositoryError, SessionStore};
pub use room::{RoomId, Rooms};
pub use schedule::{ProposalStatus, ScheduleOutcome, ScheduleProposal};

#[cfg(test)]
pub use moderation::MockModerationGate;
#[cfg(test)]
pub use repository::MockSessionStore;
