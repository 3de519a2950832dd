//! Use case layer: one struct per operation family, wired with `Arc`'d
//! collaborators at startup. Each use case validates input, drives the
//! domain model and pushes the resulting wire events itself.

pub mod call;
pub mod community;
pub mod connect;
pub mod disconnect;
pub mod error;
pub mod join;
pub mod read_receipt;
pub mod schedule;
pub mod send_message;
pub mod typing;

pub use call::CallUseCase;
pub use community::CommunityMessageUseCase;
pub use connect::ConnectUseCase;
pub use disconnect::DisconnectUseCase;
pub use error::EventError;
pub use join::JoinRoomUseCase;
pub use read_receipt::MarkReadUseCase;
pub use schedule::ScheduleUseCase;
pub use send_message::SendMessageUseCase;
pub use typing::TypingUseCase;
