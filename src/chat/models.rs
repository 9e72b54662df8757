//! Chat data models
//!
//! Defines structures for conversations and messages.

use crate::state::AgentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a conversation
pub type ConversationId = String;

/// Store-wide, monotonically increasing message identifier
pub type MessageId = u64;

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// Message typed by the user
    User,
    /// Reply (or failure notice) on behalf of the agent
    Agent,
}

impl Sender {
    /// Convert the sender to its string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Agent => "agent",
        }
    }
}

/// A single message in a conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique identifier for the message
    pub id: MessageId,
    /// Who wrote the message
    pub sender: Sender,
    /// Content of the message
    pub content: String,
    /// When the message was appended
    pub timestamp: DateTime<Utc>,
    /// Name of the agent at the time it replied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name_snapshot: Option<String>,
    /// Set when the message stands in for a failed dispatch
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub error: bool,
}

/// A message before the store has given it an ID and a timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct MessageDraft {
    /// Who wrote the message
    pub sender: Sender,
    /// Content of the message
    pub content: String,
    /// Agent name snapshot for agent messages
    pub agent_name_snapshot: Option<String>,
    /// Failure marker
    pub error: bool,
}

impl MessageDraft {
    /// A message typed by the user
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            content: content.into(),
            agent_name_snapshot: None,
            error: false,
        }
    }

    /// A successful agent reply
    pub fn reply(content: impl Into<String>, agent_name: impl Into<String>) -> Self {
        Self {
            sender: Sender::Agent,
            content: content.into(),
            agent_name_snapshot: Some(agent_name.into()),
            error: false,
        }
    }

    /// The error-flagged notice appended when a dispatch fails
    pub fn failure(content: impl Into<String>, agent_name: impl Into<String>) -> Self {
        Self {
            error: true,
            ..Self::reply(content, agent_name)
        }
    }

    /// Finalize into a message
    pub fn into_message(self, id: MessageId, timestamp: DateTime<Utc>) -> Message {
        Message {
            id,
            sender: self.sender,
            content: self.content,
            timestamp,
            agent_name_snapshot: self.agent_name_snapshot,
            error: self.error,
        }
    }
}

/// A conversation thread between the user and one agent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// Unique identifier for the conversation
    pub id: ConversationId,
    /// Agent this conversation talks to
    pub agent_id: AgentId,
    /// Agent name when the conversation was started
    #[serde(default)]
    pub agent_name: String,
    /// When the conversation was created
    pub created_at: DateTime<Utc>,
    /// When a message was last appended
    pub updated_at: DateTime<Utc>,
    /// Messages in append order
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Conversation {
    /// Create a new, empty conversation
    pub fn new(id: ConversationId, agent_id: AgentId, agent_name: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            agent_id,
            agent_name,
            created_at: now,
            updated_at: now,
            messages: Vec::new(),
        }
    }

    /// Most recent message, if any
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Append a draft, clamping the timestamp so it never moves backwards
    pub(crate) fn push(&mut self, id: MessageId, draft: MessageDraft) -> &Message {
        let timestamp = Utc::now().max(self.updated_at);
        self.updated_at = timestamp;
        self.messages.push(draft.into_message(id, timestamp));
        &self.messages[self.messages.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_draft_is_flagged() {
        let draft = MessageDraft::failure("Something went wrong", "Support Agent");
        assert_eq!(draft.sender, Sender::Agent);
        assert!(draft.error);
        assert_eq!(draft.agent_name_snapshot.as_deref(), Some("Support Agent"));
    }

    #[test]
    fn test_push_clamps_timestamp() {
        let mut conversation =
            Conversation::new("c1".to_string(), "a1".to_string(), "Support".to_string());
        // Pretend the clock ran ahead before it stepped back
        let ahead = Utc::now() + chrono::Duration::seconds(120);
        conversation.updated_at = ahead;

        let message = conversation.push(1, MessageDraft::user("hi")).clone();
        assert_eq!(message.timestamp, ahead);
        assert_eq!(conversation.updated_at, ahead);
        assert!(conversation.updated_at >= conversation.created_at);
    }

    #[test]
    fn test_message_wire_format() {
        let user = MessageDraft::user("hello").into_message(7, Utc::now());
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["sender"], "user");
        assert!(json.get("error").is_none());
        assert!(json.get("agentNameSnapshot").is_none());

        let failed = MessageDraft::failure("oops", "Sales Agent").into_message(8, Utc::now());
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["sender"], "agent");
        assert_eq!(json["error"], true);
        assert_eq!(json["agentNameSnapshot"], "Sales Agent");
    }
}
