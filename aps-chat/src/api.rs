//! Wire types for the remote assistant service.
//!
//! These mirror the JSON contract of the backend's `/api/chat/simple`
//! endpoint: a request carries the full `{role, content}` history plus an
//! optional conversation id, and a response carries the assistant's reply,
//! the (possibly newly assigned) conversation id, and an optional artifact
//! descriptor for the side panel.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Deserialize, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    #[default]
    Assistant,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            _ => Err(()),
        }
    }
}

/// A single `{role, content}` pair as exchanged with the backend.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        ChatMessage {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Request body for `POST /api/chat/simple`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

/// Artifact metadata attached to a response.
///
/// `kind` is a free string on the wire ("document", "code", "table");
/// consumers decide how strictly to interpret it.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ArtifactInfo {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Success response body from the assistant service.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ChatResponse {
    pub message: ChatMessage,
    pub conversation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<ArtifactInfo>,
}

/// Request body for `POST /api/enhance-prompt`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EnhanceRequest {
    pub prompt: String,
}

/// Response body from the prompt enhancer.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EnhanceResponse {
    pub enhanced_prompt: String,
}
