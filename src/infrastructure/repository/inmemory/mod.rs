//! In-memory reference stores.
//!
//! The relay treats storage as an external collaborator; these
//! implementations keep everything in process memory behind the domain
//! ports. Suitable for development and tests.

mod message_store;
mod session_store;

pub use message_store::InMemoryMessageStore;
pub use session_store::InMemorySessionStore;
