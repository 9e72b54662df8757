// Agent registry
// Owns agent profiles in insertion order; agents are deactivated, never removed

use super::agent::{Agent, AgentPatch, AgentProfile};
use tracing::debug;

/// Registry of all agent profiles
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    agents: Vec<Agent>,
}

impl AgentRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding `agents`, keeping the first of any duplicate IDs
    pub fn with_agents(agents: impl IntoIterator<Item = Agent>) -> Self {
        let mut registry = Self::new();
        for agent in agents {
            registry.insert(agent);
        }
        registry
    }

    /// All agents, in insertion order
    pub fn list(&self) -> &[Agent] {
        &self.agents
    }

    /// Agents that may be used to start a new conversation
    pub fn active(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter().filter(|agent| agent.active)
    }

    /// Get an agent by ID
    pub fn find(&self, id: &str) -> Option<&Agent> {
        self.agents.iter().find(|agent| agent.id == id)
    }

    /// Register a new agent from a profile
    /// Assigns a fresh ID and creation time; duplicate names are allowed
    pub fn create(&mut self, profile: AgentProfile) -> Agent {
        let agent = Agent::from_profile(profile);
        debug!(
            agent_id = %agent.id,
            name = %agent.name,
            agent_type = agent.agent_type.display_name(),
            "Agent registered"
        );
        self.agents.push(agent.clone());
        agent
    }

    /// Add a fully-formed agent to the registry
    /// Returns true if the agent was added (false if ID already exists)
    pub fn insert(&mut self, agent: Agent) -> bool {
        if self.find(&agent.id).is_some() {
            false
        } else {
            self.agents.push(agent);
            true
        }
    }

    /// Merge `patch` into the agent with the given ID
    /// Returns true if the agent was found; unknown IDs are ignored
    pub fn update(&mut self, id: &str, patch: AgentPatch) -> bool {
        match self.find_mut(id) {
            Some(agent) => {
                agent.apply(patch);
                true
            }
            None => {
                debug!(agent_id = %id, "Ignoring update for unknown agent");
                false
            }
        }
    }

    /// Flip the agent's `active` flag
    /// Returns the new state, or None if the ID is unknown
    pub fn toggle_active(&mut self, id: &str) -> Option<bool> {
        let agent = self.find_mut(id)?;
        agent.active = !agent.active;
        debug!(agent_id = %id, active = agent.active, "Agent activation toggled");
        Some(agent.active)
    }

    /// Number of registered agents
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|agent| agent.id == id)
    }
}
