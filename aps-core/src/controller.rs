//! Chat session controller: the presentation-facing facade over the
//! repository and the assistant gateway.
//!
//! One send is one round trip: the user message is appended optimistically
//! before the network call, and exactly one assistant message is appended
//! afterwards no matter how the call went. The gateway absorbs transport
//! failures itself; only a gateway-internal fault reaches the apology
//! path here. No retries, no cancellation.

use aps_chat::{AssistantClient, ChatMessage};
use tracing::{debug, warn};

use crate::ids::ConversationId;
use crate::model::{ArtifactRef, Message};
use crate::repository::ConversationRepository;

/// Last-resort assistant reply when the gateway itself fails.
pub const APOLOGY_MESSAGE: &str =
    "I apologize, but I encountered an error processing your request. Please try again.";

/// Which path produced the assistant's reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplyPath {
    /// The remote service answered.
    Remote,
    /// The gateway answered from its internal fallback.
    Fallback,
    /// The gateway failed internally; the fixed apology was appended.
    Apology,
}

/// Result of a send operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    /// Input was empty after trimming; nothing happened.
    Ignored,
    /// User and assistant messages were appended.
    Delivered {
        conversation_id: ConversationId,
        path: ReplyPath,
    },
}

pub struct ChatController<G: AssistantClient> {
    repository: ConversationRepository,
    gateway: G,
}

impl<G: AssistantClient> ChatController<G> {
    pub fn new(repository: ConversationRepository, gateway: G) -> Self {
        ChatController {
            repository,
            gateway,
        }
    }

    pub fn repository(&self) -> &ConversationRepository {
        &self.repository
    }

    pub fn create_conversation(&mut self) -> ConversationId {
        self.repository.create_conversation()
    }

    pub fn set_active(&mut self, id: &ConversationId) {
        self.repository.set_active(id);
    }

    pub fn rename(&mut self, id: &ConversationId, title: impl Into<String>) {
        self.repository.rename(id, title);
    }

    pub fn delete(&mut self, id: &ConversationId) {
        self.repository.delete(id);
    }

    /// Send a user message and append the assistant's reply.
    ///
    /// The target is the supplied conversation when it exists, else the
    /// active one, else a freshly created conversation. Whitespace-only
    /// input is rejected before any side effect.
    pub async fn send(
        &mut self,
        conversation: Option<&ConversationId>,
        text: &str,
    ) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SendOutcome::Ignored;
        }

        let target = conversation
            .filter(|id| self.repository.get(id).is_some())
            .cloned()
            .or_else(|| self.repository.active_id().cloned())
            .unwrap_or_else(|| self.repository.create_conversation());

        // Optimistic append: the user sees their message before the round
        // trip completes.
        self.repository.add_message(&target, Message::user(text));

        let history: Vec<ChatMessage> = self
            .repository
            .get(&target)
            .map(|conversation| {
                conversation
                    .messages
                    .iter()
                    .map(|message| ChatMessage {
                        role: message.role.into(),
                        content: message.content.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        match self.gateway.exchange(&history, Some(target.as_str())).await {
            Ok(exchange) => {
                let path = if exchange.used_fallback() {
                    ReplyPath::Fallback
                } else {
                    ReplyPath::Remote
                };
                let response = exchange.into_response();
                let artifact = response.artifact.map(ArtifactRef::from);
                self.repository
                    .add_message(&target, Message::assistant(response.message.content, artifact));
                SendOutcome::Delivered {
                    conversation_id: target,
                    path,
                }
            }
            Err(err) => {
                warn!(error = %err, "assistant exchange failed, appending apology");
                self.repository
                    .add_message(&target, Message::assistant(APOLOGY_MESSAGE, None));
                SendOutcome::Delivered {
                    conversation_id: target,
                    path: ReplyPath::Apology,
                }
            }
        }
    }

    /// Rewrite a draft prompt via the gateway, keeping the draft unchanged
    /// when the enhancer is unavailable.
    pub async fn enhance_prompt(&self, prompt: &str) -> String {
        match self.gateway.enhance(prompt).await {
            Ok(enhanced) => enhanced,
            Err(err) => {
                debug!(error = %err, "prompt enhancement unavailable, keeping draft");
                prompt.to_string()
            }
        }
    }
}
