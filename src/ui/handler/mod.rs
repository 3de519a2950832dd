//! HTTP and WebSocket endpoint handlers.

mod http;
mod websocket;

pub use http::{
    get_community_history, get_conversation_messages, health_check, register_conversation,
};
pub use websocket::websocket_handler;
