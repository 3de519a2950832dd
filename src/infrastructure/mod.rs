//! Infrastructure layer: implementations of the domain ports plus the
//! connection registry, room router and wire DTOs.

pub mod auth;
pub mod calls;
pub mod dto;
pub mod moderation;
pub mod pusher;
pub mod registry;
pub mod repository;
pub mod router;
