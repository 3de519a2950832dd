//! Credential verification implementations.

mod hmac;

pub use hmac::{HmacTokenVerifier, sign_token};
