//! Conversation engine for the APS Assistant.
//!
//! This crate provides:
//! - **Model**: `Conversation`, `Message`, artifact references, and the
//!   sidebar `DateGroup` classification
//! - **Persistence**: the `StateStore` trait with `MemoryStateStore` and
//!   `FileStateStore` backends
//! - **Repository**: `ConversationRepository`, sole owner of the
//!   collection and sole writer to the store
//! - **Controller**: `ChatController`, the presentation-facing facade
//!   that drives one send/receive round trip at a time
//! - **Settings**: TOML configuration for the backend endpoint
//!
//! The wire layer (gateway, fallback responder, API types) lives in the
//! `aps-chat` crate.

pub mod controller;
pub mod ids;
pub mod model;
pub mod repository;
pub mod settings;
pub mod store;

pub use controller::{ChatController, ReplyPath, SendOutcome, APOLOGY_MESSAGE};
pub use ids::{ArtifactId, ConversationId, MessageId};
pub use model::{
    ArtifactKind, ArtifactRef, Conversation, DateGroup, Message, MessageRole, DEFAULT_TITLE,
};
pub use repository::{ConversationRepository, STORAGE_KEY};
pub use settings::Settings;
pub use store::{FileStateStore, MemoryStateStore, StateStore};
