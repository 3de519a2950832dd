//! HTTP client for the external moderation classifier.
//!
//! The classifier exposes a single endpoint accepting `{"content": ...}`
//! and answering `{"approved": bool, "reason": string|null}`. Transport
//! failures and non-success statuses surface as `ModerationError`; the
//! caller treats any error as a rejection (fail closed) and imposes the
//! timeout.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{ModerationError, ModerationGate, Verdict};

#[derive(Serialize)]
struct EvaluateRequest<'a> {
    content: &'a str,
}

#[derive(Deserialize)]
struct EvaluateResponse {
    approved: bool,
    reason: Option<String>,
}

pub struct HttpModerationGate {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpModerationGate {
    pub fn new(endpoint: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }
}

#[async_trait]
impl ModerationGate for HttpModerationGate {
    async fn evaluate(&self, content: &str) -> Result<Verdict, ModerationError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&EvaluateRequest { content })
            .send()
            .await
            .map_err(|e| ModerationError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ModerationError::Unavailable(format!(
                "classifier returned {}",
                response.status()
            )));
        }

        let body: EvaluateResponse = response
            .json()
            .await
            .map_err(|e| ModerationError::Unavailable(e.to_string()))?;

        Ok(Verdict {
            approved: body.approved,
            reason: body.reason,
        })
    }
}
