//! Chat module
//!
//! Conversations, messages, and the store that owns them.

pub mod grouping;
pub mod models;
pub mod store;

pub use grouping::{consecutive_flags, is_consecutive};
pub use models::{Conversation, ConversationId, Message, MessageDraft, MessageId, Sender};
pub use store::ConversationStore;
