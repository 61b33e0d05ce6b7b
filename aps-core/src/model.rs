//! Conversation and message data model.
//!
//! Messages within a conversation are append-only and strictly ordered by
//! insertion; the only mutations a conversation ever sees are
//! [`Conversation::push`] and an explicit rename. Timestamps are
//! `DateTime<Utc>` in memory and RFC 3339 strings in the persisted blob,
//! whose field names stay camelCase for compatibility with the stored
//! layout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ArtifactId, ConversationId, MessageId};

/// Placeholder title until the first user message arrives.
pub const DEFAULT_TITLE: &str = "New Chat";

/// Character bound for titles derived from the first user message.
const TITLE_MAX_CHARS: usize = 40;

// ============================================================================
// Roles and artifacts
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<aps_chat::Role> for MessageRole {
    fn from(role: aps_chat::Role) -> Self {
        match role {
            aps_chat::Role::User => MessageRole::User,
            aps_chat::Role::Assistant => MessageRole::Assistant,
        }
    }
}

impl From<MessageRole> for aps_chat::Role {
    fn from(role: MessageRole) -> Self {
        match role {
            MessageRole::User => aps_chat::Role::User,
            MessageRole::Assistant => aps_chat::Role::Assistant,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Document,
    Code,
    Table,
}

impl ArtifactKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Document => "document",
            ArtifactKind::Code => "code",
            ArtifactKind::Table => "table",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ArtifactKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "document" => Ok(ArtifactKind::Document),
            "code" => Ok(ArtifactKind::Code),
            "table" => Ok(ArtifactKind::Table),
            _ => Err(()),
        }
    }
}

/// Artifact descriptor attached to an assistant message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    pub id: ArtifactId,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ArtifactKind,
}

/// Wire artifacts carry a free-form kind string; anything unrecognized
/// degrades to a document.
impl From<aps_chat::ArtifactInfo> for ArtifactRef {
    fn from(info: aps_chat::ArtifactInfo) -> Self {
        ArtifactRef {
            id: ArtifactId::from(info.id),
            title: info.title,
            kind: info.kind.parse().unwrap_or(ArtifactKind::Document),
        }
    }
}

// ============================================================================
// Message
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<ArtifactRef>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Message {
            id: MessageId::new(),
            role: MessageRole::User,
            content: content.into(),
            timestamp: Utc::now(),
            artifact: None,
        }
    }

    pub fn assistant(content: impl Into<String>, artifact: Option<ArtifactRef>) -> Self {
        Message {
            id: MessageId::new(),
            role: MessageRole::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
            artifact,
        }
    }
}

// ============================================================================
// Conversation
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: ConversationId,
    pub title: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Create an empty conversation with the placeholder title.
    pub fn new() -> Self {
        let now = Utc::now();
        Conversation {
            id: ConversationId::new(),
            title: DEFAULT_TITLE.to_string(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a message and advance `updated_at`.
    ///
    /// The first user message to land while the title is still the
    /// placeholder derives the title; later messages never touch it.
    pub fn push(&mut self, message: Message) {
        if self.title == DEFAULT_TITLE && message.role == MessageRole::User {
            self.title = derive_title(&message.content);
        }
        self.messages.push(message);
        self.updated_at = Utc::now();
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

/// Truncate to the title bound, appending an ellipsis when truncated.
fn derive_title(content: &str) -> String {
    let mut title: String = content.chars().take(TITLE_MAX_CHARS).collect();
    if content.chars().count() > TITLE_MAX_CHARS {
        title.push_str("...");
    }
    title
}

// ============================================================================
// Date grouping
// ============================================================================

/// Coarse recency bucket for sidebar grouping. Display-only, never
/// persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DateGroup {
    Today,
    Yesterday,
    PreviousWeek,
    Older,
}

impl DateGroup {
    /// Classify an instant by calendar-day difference from `now`.
    ///
    /// Future instants group as Today.
    pub fn classify(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let days = (now.date_naive() - timestamp.date_naive()).num_days();
        match days {
            d if d <= 0 => DateGroup::Today,
            1 => DateGroup::Yesterday,
            2..=6 => DateGroup::PreviousWeek,
            _ => DateGroup::Older,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            DateGroup::Today => "Today",
            DateGroup::Yesterday => "Yesterday",
            DateGroup::PreviousWeek => "Previous 7 Days",
            DateGroup::Older => "Older",
        }
    }
}

impl std::fmt::Display for DateGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn push_preserves_insertion_order() {
        let mut conversation = Conversation::new();
        conversation.push(Message::user("first"));
        conversation.push(Message::assistant("second", None));
        conversation.push(Message::user("third"));

        let contents: Vec<&str> = conversation
            .messages
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, ["first", "second", "third"]);
    }

    #[test]
    fn updated_at_never_precedes_created_at() {
        let mut conversation = Conversation::new();
        assert!(conversation.updated_at >= conversation.created_at);
        let before = conversation.updated_at;
        conversation.push(Message::user("hello"));
        assert!(conversation.updated_at >= before);
        assert!(conversation.updated_at >= conversation.created_at);
    }

    #[test]
    fn title_derives_from_first_user_message() {
        let mut conversation = Conversation::new();
        conversation.push(Message::user("Short question"));
        assert_eq!(conversation.title, "Short question");

        conversation.push(Message::user("A different question entirely"));
        assert_eq!(conversation.title, "Short question");
    }

    #[test]
    fn assistant_message_does_not_derive_title() {
        let mut conversation = Conversation::new();
        conversation.push(Message::assistant("greeting", None));
        assert_eq!(conversation.title, DEFAULT_TITLE);

        conversation.push(Message::user("real question"));
        assert_eq!(conversation.title, "real question");
    }

    #[test]
    fn long_title_is_truncated_with_ellipsis() {
        let content = "x".repeat(41);
        let mut conversation = Conversation::new();
        conversation.push(Message::user(content));
        assert_eq!(conversation.title, format!("{}...", "x".repeat(40)));

        // Exactly at the bound: no ellipsis.
        let mut conversation = Conversation::new();
        conversation.push(Message::user("y".repeat(40)));
        assert_eq!(conversation.title, "y".repeat(40));
    }

    #[test]
    fn title_truncation_respects_char_boundaries() {
        let content = "é".repeat(45);
        let mut conversation = Conversation::new();
        conversation.push(Message::user(content));
        assert_eq!(conversation.title, format!("{}...", "é".repeat(40)));
    }

    #[test]
    fn timestamps_round_trip_through_json() {
        let message = Message::user("hello");
        let json = serde_json::to_string(&message).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back.timestamp, message.timestamp);
    }

    #[test]
    fn conversation_serializes_camel_case_stamps() {
        let conversation = Conversation::new();
        let json = serde_json::to_string(&conversation).unwrap();
        assert!(json.contains("\"createdAt\""));
        assert!(json.contains("\"updatedAt\""));
    }

    #[test]
    fn artifact_ref_degrades_unknown_kind_to_document() {
        let wire = aps_chat::ArtifactInfo {
            id: "a1".to_string(),
            title: "Plan".to_string(),
            kind: "spreadsheet".to_string(),
        };
        let artifact = ArtifactRef::from(wire);
        assert_eq!(artifact.kind, ArtifactKind::Document);
    }

    #[test]
    fn date_groups_by_calendar_day() {
        let now = Utc.with_ymd_and_hms(2026, 8, 25, 9, 0, 0).unwrap();

        // Late last night vs early this morning is a calendar-day edge.
        let today = Utc.with_ymd_and_hms(2026, 8, 25, 0, 30, 0).unwrap();
        let yesterday = Utc.with_ymd_and_hms(2026, 8, 24, 23, 30, 0).unwrap();
        assert_eq!(DateGroup::classify(today, now), DateGroup::Today);
        assert_eq!(DateGroup::classify(yesterday, now), DateGroup::Yesterday);

        assert_eq!(
            DateGroup::classify(now - Duration::days(6), now),
            DateGroup::PreviousWeek
        );
        assert_eq!(
            DateGroup::classify(now - Duration::days(7), now),
            DateGroup::Older
        );
        assert_eq!(
            DateGroup::classify(now + Duration::days(1), now),
            DateGroup::Today
        );
    }
}
