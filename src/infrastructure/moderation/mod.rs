//! Moderation gate implementations.

mod http;

pub use http::HttpModerationGate;

use async_trait::async_trait;

use crate::domain::{ModerationError, ModerationGate, Verdict};

/// Gate that approves everything. Used when no classifier endpoint is
/// configured (development only); a loud warning is logged at startup.
pub struct PermissiveModerationGate;

#[async_trait]
impl ModerationGate for PermissiveModerationGate {
    async fn evaluate(&self, _content: &str) -> Result<Verdict, ModerationError> {
        Ok(Verdict::approve())
    }
}
