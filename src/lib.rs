//! Real-time communication core for the Morpheus tutoring platform.
//!
//! This library implements the persistent-connection relay that carries
//! direct tutor/student chat, the moderated community channel, schedule
//! proposals and WebRTC call signaling over per-user WebSocket connections.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// shared library
pub mod common;
