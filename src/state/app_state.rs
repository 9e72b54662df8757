// Application state management
// One explicit session object owning agents, conversations, and in-flight dispatches

use crate::chat::{Conversation, ConversationId, ConversationStore, Message, MessageDraft};
use crate::state::agent::{Agent, AgentId, AgentPatch, AgentProfile};
use crate::state::persistence::{SessionSnapshot, SNAPSHOT_VERSION};
use crate::state::registry::AgentRegistry;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Session state shared between the HTTP layer and dispatch tasks
pub type SharedState = Arc<RwLock<AppState>>;

/// Generation number identifying one outstanding dispatch
pub type DispatchToken = u64;

/// Main application state
///
/// Constructed once per session and dropped when the session ends. Every
/// mutation goes through the methods below; all of them complete without
/// awaiting, so they are atomic with respect to each other under the lock.
#[derive(Debug)]
pub struct AppState {
    agents: AgentRegistry,
    conversations: ConversationStore,
    /// Conversation ID -> token of the dispatch currently outstanding on it
    in_flight: HashMap<ConversationId, DispatchToken>,
    next_token: DispatchToken,
}

/// Read-only view handed to the presentation layer
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    /// Every agent, in registration order
    pub agents: Vec<Agent>,
    /// IDs of agents a new conversation may be started with
    pub available_agents: Vec<AgentId>,
    /// Every conversation, most recent first
    pub conversations: Vec<Conversation>,
    /// Currently selected conversation
    pub active_conversation_id: Option<ConversationId>,
    /// Conversation ID -> whether a dispatch is outstanding on it
    pub busy: HashMap<ConversationId, bool>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// Create an empty session
    pub fn new() -> Self {
        Self {
            agents: AgentRegistry::new(),
            conversations: ConversationStore::new(),
            in_flight: HashMap::new(),
            next_token: 1,
        }
    }

    /// Create a session whose registry starts with `agents`
    pub fn with_agents(agents: impl IntoIterator<Item = Agent>) -> Self {
        Self {
            agents: AgentRegistry::with_agents(agents),
            ..Self::new()
        }
    }

    /// Wrap into the shared handle used by the dispatcher and the API
    pub fn into_shared(self) -> SharedState {
        Arc::new(RwLock::new(self))
    }

    /// The agent registry
    pub fn agents(&self) -> &AgentRegistry {
        &self.agents
    }

    /// The conversation store
    pub fn conversations(&self) -> &ConversationStore {
        &self.conversations
    }

    /// Register a new agent
    pub fn create_agent(&mut self, profile: AgentProfile) -> Agent {
        self.agents.create(profile)
    }

    /// Add agents whose IDs are not registered yet, returning how many were added
    pub fn seed_agents(&mut self, agents: impl IntoIterator<Item = Agent>) -> usize {
        let mut added = 0;
        for agent in agents {
            if self.agents.insert(agent) {
                added += 1;
            }
        }
        added
    }

    /// Update an agent; unknown IDs are ignored
    pub fn update_agent(&mut self, id: &str, patch: AgentPatch) -> bool {
        self.agents.update(id, patch)
    }

    /// Flip an agent's activation; unknown IDs are ignored
    pub fn toggle_agent_active(&mut self, id: &str) -> Option<bool> {
        self.agents.toggle_active(id)
    }

    /// Start a conversation with an agent and make it active
    pub fn create_conversation(&mut self, agent_id: &str) -> Option<Conversation> {
        self.conversations.create(agent_id, &self.agents).cloned()
    }

    /// Move the active pointer
    pub fn select_conversation(&mut self, id: &str) {
        self.conversations.select(id);
    }

    /// Delete a conversation
    ///
    /// Any dispatch still outstanding on it loses its token, so its
    /// completion will be discarded.
    pub fn delete_conversation(&mut self, id: &str) -> Option<Conversation> {
        if let Some(token) = self.in_flight.remove(id) {
            debug!(
                conversation_id = %id,
                token = token,
                "Deleting conversation with a dispatch in flight"
            );
        }
        self.conversations.delete(id)
    }

    /// Whether a dispatch is outstanding on the conversation
    pub fn is_busy(&self, conversation_id: &str) -> bool {
        self.in_flight.contains_key(conversation_id)
    }

    /// Number of dispatches outstanding across all conversations
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Read-only snapshot for the presentation layer
    pub fn view(&self) -> DashboardView {
        DashboardView {
            agents: self.agents.list().to_vec(),
            available_agents: self.agents.active().map(|a| a.id.clone()).collect(),
            conversations: self.conversations.list().to_vec(),
            active_conversation_id: self.conversations.active_id().cloned(),
            busy: self
                .conversations
                .list()
                .iter()
                .map(|c| (c.id.clone(), self.is_busy(&c.id)))
                .collect(),
        }
    }

    /// Append a user message and mark the conversation busy, in one step
    ///
    /// Returns None, touching nothing, if the conversation is unknown or
    /// already has a dispatch outstanding.
    pub(crate) fn open_dispatch(
        &mut self,
        conversation_id: &str,
        content: &str,
    ) -> Option<(Message, DispatchToken)> {
        if self.is_busy(conversation_id) {
            debug!(conversation_id = %conversation_id, "Dispatch already in flight");
            return None;
        }
        let message = self
            .conversations
            .append(conversation_id, MessageDraft::user(content))?;

        let token = self.next_token;
        self.next_token += 1;
        self.in_flight.insert(conversation_id.to_string(), token);
        Some((message, token))
    }

    /// Record a dispatch result and clear the busy state
    ///
    /// The draft is only appended if `token` is still the conversation's
    /// current token; otherwise the completion is stale and dropped.
    pub(crate) fn close_dispatch(
        &mut self,
        conversation_id: &str,
        token: DispatchToken,
        draft: MessageDraft,
    ) -> Option<Message> {
        if self.in_flight.get(conversation_id) != Some(&token) {
            debug!(
                conversation_id = %conversation_id,
                token = token,
                "Discarding stale dispatch completion"
            );
            return None;
        }
        self.in_flight.remove(conversation_id);
        self.conversations.append(conversation_id, draft)
    }

    /// Serializable snapshot of agents and conversations (busy state excluded)
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            version: SNAPSHOT_VERSION,
            agent_order: self.agents.list().iter().map(|a| a.id.clone()).collect(),
            agents: self
                .agents
                .list()
                .iter()
                .map(|a| (a.id.clone(), a.clone()))
                .collect(),
            conversation_order: self
                .conversations
                .list()
                .iter()
                .map(|c| c.id.clone())
                .collect(),
            conversations: self
                .conversations
                .list()
                .iter()
                .map(|c| (c.id.clone(), c.clone()))
                .collect(),
            active_conversation_id: self.conversations.active_id().cloned(),
        }
    }

    /// Rebuild a session from a snapshot
    ///
    /// Entries missing from the order lists are appended (agents oldest
    /// first, conversations newest first); order entries without data are
    /// dropped.
    pub fn from_snapshot(snapshot: SessionSnapshot) -> Self {
        let SessionSnapshot {
            mut agents,
            agent_order,
            mut conversations,
            conversation_order,
            active_conversation_id,
            ..
        } = snapshot;

        let mut ordered_agents: Vec<Agent> = agent_order
            .iter()
            .filter_map(|id| agents.remove(id))
            .collect();
        let mut leftover_agents: Vec<Agent> = agents.into_values().collect();
        leftover_agents.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        ordered_agents.extend(leftover_agents);

        let mut ordered_conversations: Vec<Conversation> = conversation_order
            .iter()
            .filter_map(|id| conversations.remove(id))
            .collect();
        let mut leftover_conversations: Vec<Conversation> = conversations.into_values().collect();
        leftover_conversations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        ordered_conversations.extend(leftover_conversations);

        Self {
            agents: AgentRegistry::with_agents(ordered_agents),
            conversations: ConversationStore::restore(
                ordered_conversations,
                active_conversation_id,
            ),
            ..Self::new()
        }
    }
}
