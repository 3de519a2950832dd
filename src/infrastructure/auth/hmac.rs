//! HMAC-SHA256 signed bearer tokens.
//!
//! Token format: `base64url(payload) "." base64url(signature)` where the
//! payload is JSON `{"sub": user id, "role": student|tutor, "exp": unix
//! millis}` and the signature covers the encoded payload. The account
//! service shares the signing secret with the relay; verification is local.
//! Signature comparison is constant time via `Mac::verify_slice`.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::common::time::Clock;
use crate::domain::{AuthError, Identity, Role, TokenVerifier, UserId};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    sub: String,
    role: Role,
    /// Expiry, unix millis.
    exp: i64,
}

pub struct HmacTokenVerifier {
    secret: Vec<u8>,
    clock: Arc<dyn Clock>,
}

impl HmacTokenVerifier {
    pub fn new(secret: impl Into<Vec<u8>>, clock: Arc<dyn Clock>) -> Self {
        Self {
            secret: secret.into(),
            clock,
        }
    }
}

impl TokenVerifier for HmacTokenVerifier {
    fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let (payload_b64, sig_b64) = token
            .split_once('.')
            .ok_or_else(|| AuthError::InvalidToken("malformed token".to_string()))?;

        let signature = URL_SAFE_NO_PAD
            .decode(sig_b64)
            .map_err(|_| AuthError::InvalidToken("bad signature encoding".to_string()))?;

        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        mac.update(payload_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::InvalidToken("signature mismatch".to_string()))?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| AuthError::InvalidToken("bad payload encoding".to_string()))?;
        let claims: TokenClaims = serde_json::from_slice(&payload)
            .map_err(|_| AuthError::InvalidToken("bad payload json".to_string()))?;

        if claims.exp <= self.clock.now_utc_millis() {
            return Err(AuthError::Expired);
        }

        let user_id = UserId::new(claims.sub)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok(Identity {
            user_id,
            role: claims.role,
        })
    }
}

/// Mint a token the verifier accepts. Shared with the account service's
/// token issuance; also used by tests and local tooling.
pub fn sign_token(secret: &[u8], user_id: &str, role: Role, expires_at_millis: i64) -> String {
    let claims = TokenClaims {
        sub: user_id.to_string(),
        role,
        exp: expires_at_millis,
    };
    let payload_b64 = URL_SAFE_NO_PAD.encode(
        serde_json::to_vec(&claims).expect("token claims serialize"),
    );
    let mut mac = HmacSha256::new_from_slice(secret).expect("hmac accepts any key length");
    mac.update(payload_b64.as_bytes());
    let signature = mac.finalize().into_bytes();
    format!("{}.{}", payload_b64, URL_SAFE_NO_PAD.encode(signature))
}
