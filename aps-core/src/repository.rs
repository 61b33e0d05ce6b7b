//! Conversation repository: the single owner of the conversation
//! collection and the sole writer to the persistent store.
//!
//! Persistence is advisory. Hydration failures degrade to an empty
//! collection, flush failures are logged and swallowed, and an empty
//! collection is never flushed so that a failed or raced hydration cannot
//! wipe previously stored history.

use tracing::{debug, warn};

use crate::ids::ConversationId;
use crate::model::{Conversation, Message};
use crate::store::StateStore;

/// Well-known key the serialized conversation collection lives under.
pub const STORAGE_KEY: &str = "aps-assistant-conversations";

pub struct ConversationRepository {
    store: Box<dyn StateStore>,
    conversations: Vec<Conversation>,
    active: Option<ConversationId>,
}

impl ConversationRepository {
    /// Create a repository over `store`, hydrating any stored history.
    pub fn new(store: Box<dyn StateStore>) -> Self {
        let conversations = hydrate(store.as_ref());
        ConversationRepository {
            store,
            conversations,
            active: None,
        }
    }

    /// Ordered collection, most recently created first.
    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn get(&self, id: &ConversationId) -> Option<&Conversation> {
        self.conversations.iter().find(|c| &c.id == id)
    }

    pub fn active_id(&self) -> Option<&ConversationId> {
        self.active.as_ref()
    }

    pub fn active_conversation(&self) -> Option<&Conversation> {
        let id = self.active.as_ref()?;
        self.conversations.iter().find(|c| &c.id == id)
    }

    /// Allocate a new empty conversation, prepend it to the collection,
    /// and mark it active.
    pub fn create_conversation(&mut self) -> ConversationId {
        let conversation = Conversation::new();
        let id = conversation.id.clone();
        self.conversations.insert(0, conversation);
        self.active = Some(id.clone());
        self.flush();
        id
    }

    /// Mark a conversation as current; no-op for unknown ids.
    pub fn set_active(&mut self, id: &ConversationId) {
        if self.get(id).is_some() {
            self.active = Some(id.clone());
        }
    }

    /// Append a message to the matching conversation.
    ///
    /// A message for an unknown conversation is a non-fatal caller error
    /// and is silently dropped.
    pub fn add_message(&mut self, id: &ConversationId, message: Message) {
        let Some(conversation) = self.conversations.iter_mut().find(|c| &c.id == id) else {
            debug!(conversation = %id, "dropping message for unknown conversation");
            return;
        };
        conversation.push(message);
        self.flush();
    }

    /// Explicitly rename a conversation; no-op for unknown ids.
    pub fn rename(&mut self, id: &ConversationId, title: impl Into<String>) {
        let Some(conversation) = self.conversations.iter_mut().find(|c| &c.id == id) else {
            return;
        };
        conversation.title = title.into();
        conversation.updated_at = chrono::Utc::now();
        self.flush();
    }

    /// Remove a conversation, clearing the active marker if it pointed at
    /// the removed one.
    pub fn delete(&mut self, id: &ConversationId) {
        self.conversations.retain(|c| &c.id != id);
        if self.active.as_ref() == Some(id) {
            self.active = None;
        }
        self.flush();
    }

    /// Serialize the collection to the store, best-effort.
    ///
    /// An empty collection is never written.
    pub fn flush(&self) {
        if self.conversations.is_empty() {
            return;
        }
        let serialized = match serde_json::to_string(&self.conversations) {
            Ok(serialized) => serialized,
            Err(err) => {
                warn!(error = %err, "failed to serialize conversations, skipping flush");
                return;
            }
        };
        if let Err(err) = self.store.put(STORAGE_KEY, &serialized) {
            warn!(error = %err, "failed to persist conversations");
        }
    }
}

/// Load the stored collection, treating every failure as "no history".
fn hydrate(store: &dyn StateStore) -> Vec<Conversation> {
    let raw = match store.get(STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(err) => {
            warn!(error = %err, "failed to read stored conversations, starting empty");
            return Vec::new();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(conversations) => conversations,
        Err(err) => {
            warn!(error = %err, "discarding undecodable conversation history");
            Vec::new()
        }
    }
}
