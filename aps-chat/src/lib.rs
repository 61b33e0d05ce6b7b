//! Wire layer for the APS Assistant: chat API types, the HTTP gateway to
//! the remote assistant service, and the deterministic fallback responder
//! the gateway answers from when that service is unreachable.

pub mod api;
pub mod gateway;
pub mod responder;

pub use api::{ArtifactInfo, ChatMessage, ChatRequest, ChatResponse, Role};
pub use gateway::{AssistantClient, Exchange, HttpGateway};
pub use responder::{respond, FallbackReply};
