//! Credential verification port.

use thiserror::Error;

use super::identity::Identity;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing credential")]
    MissingCredential,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    Expired,
}

/// Verifies a bearer credential presented at connect time and resolves it
/// to a user identity. Verification is local (signature + expiry); rejected
/// credentials refuse the connection before the WebSocket upgrade.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}
