//! Moderation gate port.
//!
//! The classifier itself is a black box; the relay only sees approve/reject
//! plus a reason. The caller imposes the timeout, and any error or timeout
//! is treated as a rejection (fail closed).

use async_trait::async_trait;
use thiserror::Error;

/// Classifier verdict for one piece of community content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub approved: bool,
    pub reason: Option<String>,
}

impl Verdict {
    pub fn approve() -> Self {
        Self {
            approved: true,
            reason: None,
        }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            approved: false,
            reason: Some(reason.into()),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModerationError {
    #[error("moderation classifier unavailable: {0}")]
    Unavailable(String),
}

/// Moderation classifier port.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModerationGate: Send + Sync {
    async fn evaluate(&self, content: &str) -> Result<Verdict, ModerationError>;
}
