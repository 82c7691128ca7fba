//! Wire types for the chat endpoint that supplies enrichment text.
//!
//! The service takes `{"content": "..."}` and answers with a status
//! envelope: `{"status": 200, "msg": "ok", "data": {"Content": "..."}}`.

use serde::{Deserialize, Serialize};

/// Request body: the raw submission, untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub content: String,
}

/// Response envelope returned by the chat endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Application-level status; only 200 means the payload is usable.
    pub status: u16,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub data: Option<ChatData>,
}

/// Payload of a successful response. The field is capitalized on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatData {
    #[serde(rename = "Content", default)]
    pub content: Option<String>,
}
