//! Event pusher implementations.

mod websocket;

pub use websocket::WebSocketEventPusher;
