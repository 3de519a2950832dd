//! Request/response bodies of the HTTP API.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/conversations`, sent by the platform's CRUD service
/// when a student first contacts a tutor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterConversationRequest {
    pub id: String,
    pub student_id: String,
    pub tutor_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationDto {
    pub id: String,
    pub student_id: String,
    pub tutor_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message_at: Option<String>,
}
