//! Conversation store
//!
//! Owns every conversation and the active-conversation pointer.
//! Conversations are kept most-recent-first, in creation order.

use crate::chat::models::{Conversation, ConversationId, Message, MessageDraft, MessageId};
use crate::state::AgentRegistry;
use tracing::debug;
use uuid::Uuid;

/// All conversations of a session
#[derive(Debug, Clone)]
pub struct ConversationStore {
    /// Most recently created first
    conversations: Vec<Conversation>,
    /// Currently selected conversation, if any
    active_id: Option<ConversationId>,
    /// Next message ID to hand out
    next_message_id: MessageId,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            conversations: Vec::new(),
            active_id: None,
            next_message_id: 1,
        }
    }

    /// Rebuild a store from restored conversations (already most-recent-first)
    ///
    /// Message IDs continue after the highest restored one.
    pub fn restore(conversations: Vec<Conversation>, active_id: Option<ConversationId>) -> Self {
        let next_message_id = conversations
            .iter()
            .flat_map(|c| c.messages.iter().map(|m| m.id))
            .max()
            .map_or(1, |max| max + 1);
        Self {
            conversations,
            active_id,
            next_message_id,
        }
    }

    /// Start a conversation with the agent `agent_id`
    ///
    /// Returns None if the agent is not registered. The new conversation is
    /// placed first and becomes the active one.
    pub fn create(&mut self, agent_id: &str, agents: &AgentRegistry) -> Option<&Conversation> {
        let Some(agent) = agents.find(agent_id) else {
            debug!(agent_id = %agent_id, "Cannot start conversation with unknown agent");
            return None;
        };

        let conversation = Conversation::new(
            Uuid::new_v4().to_string(),
            agent.id.clone(),
            agent.name.clone(),
        );
        debug!(
            conversation_id = %conversation.id,
            agent_id = %agent.id,
            "Conversation created"
        );
        self.active_id = Some(conversation.id.clone());
        self.conversations.insert(0, conversation);
        self.conversations.first()
    }

    /// Point the active selection at `id`
    ///
    /// The ID is not checked; callers only pass IDs they got from the store.
    pub fn select(&mut self, id: &str) {
        self.active_id = Some(id.to_string());
    }

    /// Remove a conversation
    /// If it was the active one, the selection is cleared
    pub fn delete(&mut self, id: &str) -> Option<Conversation> {
        let position = self.conversations.iter().position(|c| c.id == id)?;
        let removed = self.conversations.remove(position);
        if self.active_id.as_deref() == Some(id) {
            self.active_id = None;
        }
        debug!(conversation_id = %id, "Conversation deleted");
        Some(removed)
    }

    /// Get a conversation by ID
    pub fn find(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    /// Append a message to a conversation
    /// Returns the stored message, or None if the conversation does not exist
    pub fn append(&mut self, id: &str, draft: MessageDraft) -> Option<Message> {
        let message_id = self.next_message_id;
        let conversation = self.conversations.iter_mut().find(|c| c.id == id)?;
        let message = conversation.push(message_id, draft).clone();
        self.next_message_id += 1;
        Some(message)
    }

    /// All conversations, most recent first
    pub fn list(&self) -> &[Conversation] {
        &self.conversations
    }

    /// ID of the active conversation
    pub fn active_id(&self) -> Option<&ConversationId> {
        self.active_id.as_ref()
    }

    /// The active conversation, if the pointer resolves
    pub fn active(&self) -> Option<&Conversation> {
        self.active_id.as_deref().and_then(|id| self.find(id))
    }

    /// Number of conversations
    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    /// Whether there are no conversations
    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::models::Sender;
    use crate::state::{Agent, AgentProfile};

    fn registry() -> AgentRegistry {
        AgentRegistry::with_agents([
            Agent::with_id(
                "a1".to_string(),
                AgentProfile::new("Support Agent", "https://hooks.test/support-agent"),
            ),
            Agent::with_id(
                "a2".to_string(),
                AgentProfile::new("Sales Agent", "https://hooks.test/sales-agent"),
            ),
        ])
    }

    #[test]
    fn test_create_unknown_agent_returns_none() {
        let mut store = ConversationStore::new();
        assert!(store.create("nope", &registry()).is_none());
        assert!(store.is_empty());
        assert!(store.active_id().is_none());
    }

    #[test]
    fn test_create_prepends_and_activates() {
        let agents = registry();
        let mut store = ConversationStore::new();
        let first = store.create("a1", &agents).unwrap().id.clone();
        let second = store.create("a2", &agents).unwrap().clone();

        assert_eq!(store.list()[0].id, second.id);
        assert_eq!(store.list()[1].id, first);
        assert_eq!(store.active_id(), Some(&second.id));
        assert_eq!(second.agent_name, "Sales Agent");
        assert!(second.messages.is_empty());
    }

    #[test]
    fn test_create_with_inactive_agent() {
        let mut agents = registry();
        agents.toggle_active("a1");
        let mut store = ConversationStore::new();
        assert!(store.create("a1", &agents).is_some());
    }

    #[test]
    fn test_select_is_unconditional() {
        let mut store = ConversationStore::new();
        store.select("whatever");
        assert_eq!(store.active_id().map(String::as_str), Some("whatever"));
        assert!(store.active().is_none());
    }

    #[test]
    fn test_delete_clears_active() {
        let agents = registry();
        let mut store = ConversationStore::new();
        let keep = store.create("a1", &agents).unwrap().id.clone();
        let drop = store.create("a2", &agents).unwrap().id.clone();

        assert!(store.delete(&drop).is_some());
        assert!(store.active_id().is_none());
        assert!(store.find(&drop).is_none());

        store.select(&keep);
        assert!(store.delete("missing").is_none());
        assert_eq!(store.active_id(), Some(&keep));
    }

    #[test]
    fn test_append_assigns_monotonic_ids() {
        let agents = registry();
        let mut store = ConversationStore::new();
        let a = store.create("a1", &agents).unwrap().id.clone();
        let b = store.create("a2", &agents).unwrap().id.clone();

        let m1 = store.append(&a, MessageDraft::user("one")).unwrap();
        let m2 = store.append(&b, MessageDraft::user("two")).unwrap();
        let m3 = store
            .append(&a, MessageDraft::reply("three", "Support Agent"))
            .unwrap();
        assert!(m1.id < m2.id && m2.id < m3.id);

        let conversation = store.find(&a).unwrap();
        assert_eq!(conversation.messages.len(), 2);
        assert_eq!(conversation.messages[1].sender, Sender::Agent);
        assert_eq!(conversation.updated_at, m3.timestamp);
        assert!(conversation
            .messages
            .windows(2)
            .all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn test_append_unknown_conversation() {
        let mut store = ConversationStore::new();
        assert!(store.append("missing", MessageDraft::user("hi")).is_none());
    }

    #[test]
    fn test_restore_continues_message_ids() {
        let agents = registry();
        let mut store = ConversationStore::new();
        let id = store.create("a1", &agents).unwrap().id.clone();
        store.append(&id, MessageDraft::user("one"));
        let last = store.append(&id, MessageDraft::user("two")).unwrap();

        let mut restored = ConversationStore::restore(store.list().to_vec(), None);
        let next = restored.append(&id, MessageDraft::user("three")).unwrap();
        assert_eq!(next.id, last.id + 1);
    }
}
