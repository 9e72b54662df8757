//! Agent profile module
//!
//! Defines the agent profile, its type, and the create/update payloads
//! accepted by the registry.
//!
//! Agents are external responders: each one forwards conversation messages to
//! an automation webhook (`endpoint_url`) and returns the reply.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an agent
pub type AgentId = String;

/// Agent type enumeration
/// Distinguishes the chief agent from the specialists it delegates to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AgentType {
    /// Main agent that distributes tasks
    General,
    /// Specialist agent servicing one category of request
    #[default]
    #[serde(rename = "agent")]
    Specialist,
}

impl AgentType {
    /// Get a display name for the agent type
    pub fn display_name(&self) -> &'static str {
        match self {
            AgentType::General => "General",
            AgentType::Specialist => "Specialist",
        }
    }
}

/// Agent structure
/// A configured external responder and the endpoint that services it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    /// Unique identifier for the agent
    pub id: AgentId,
    /// Display name of the agent
    pub name: String,
    /// Type of the agent
    #[serde(rename = "type")]
    pub agent_type: AgentType,
    /// Short description shown next to the agent
    pub description: String,
    /// Single glyph (usually an emoji) used as avatar
    pub avatar_glyph: String,
    /// Webhook URL of the automation flow behind this agent
    pub endpoint_url: String,
    /// Whether new conversations may be started with this agent
    pub active: bool,
    /// Accent color, `#RRGGBB`
    pub color_hex: String,
    /// When the agent was registered
    pub created_at: DateTime<Utc>,
}

impl Agent {
    /// Build an agent from a profile, assigning a fresh ID and creation time
    pub fn from_profile(profile: AgentProfile) -> Self {
        Self::with_id(Self::generate_id(), profile)
    }

    /// Build an agent with a caller-chosen ID (seeding and tests)
    pub fn with_id(id: AgentId, profile: AgentProfile) -> Self {
        Self {
            id,
            name: profile.name,
            agent_type: profile.agent_type,
            description: profile.description,
            avatar_glyph: profile.avatar_glyph,
            endpoint_url: profile.endpoint_url,
            active: profile.active,
            color_hex: profile.color_hex,
            created_at: Utc::now(),
        }
    }

    /// Generate a new unique ID for an agent
    /// Uses UUID v4 for uniqueness
    pub fn generate_id() -> AgentId {
        Uuid::new_v4().to_string()
    }

    /// Merge the set fields of `patch` into this agent
    pub fn apply(&mut self, patch: AgentPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(agent_type) = patch.agent_type {
            self.agent_type = agent_type;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(avatar_glyph) = patch.avatar_glyph {
            self.avatar_glyph = avatar_glyph;
        }
        if let Some(endpoint_url) = patch.endpoint_url {
            self.endpoint_url = endpoint_url;
        }
        if let Some(active) = patch.active {
            self.active = active;
        }
        if let Some(color_hex) = patch.color_hex {
            self.color_hex = color_hex;
        }
    }
}

/// Everything needed to register a new agent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentProfile {
    /// Display name
    pub name: String,
    /// Agent type
    #[serde(default, rename = "type")]
    pub agent_type: AgentType,
    /// Short description
    #[serde(default)]
    pub description: String,
    /// Avatar glyph
    #[serde(default = "default_avatar")]
    pub avatar_glyph: String,
    /// Webhook URL
    pub endpoint_url: String,
    /// Initial activation state
    #[serde(default = "default_active")]
    pub active: bool,
    /// Accent color
    #[serde(default = "default_color")]
    pub color_hex: String,
}

impl AgentProfile {
    /// Create a profile with defaults for everything but name and endpoint
    pub fn new(name: impl Into<String>, endpoint_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            agent_type: AgentType::default(),
            description: String::new(),
            avatar_glyph: default_avatar(),
            endpoint_url: endpoint_url.into(),
            active: default_active(),
            color_hex: default_color(),
        }
    }
}

fn default_avatar() -> String {
    "🤖".to_string()
}

fn default_active() -> bool {
    true
}

fn default_color() -> String {
    "#1F2A44".to_string()
}

/// Partial update for an agent; `None` fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentPatch {
    /// New display name
    pub name: Option<String>,
    /// New agent type
    #[serde(rename = "type")]
    pub agent_type: Option<AgentType>,
    /// New description
    pub description: Option<String>,
    /// New avatar glyph
    pub avatar_glyph: Option<String>,
    /// New webhook URL
    pub endpoint_url: Option<String>,
    /// New activation state
    pub active: Option<bool>,
    /// New accent color
    pub color_hex: Option<String>,
}

/// The four agents a fresh dashboard starts with
///
/// `webhook_base_url` is the automation host, e.g. `https://n8n.example.com`;
/// each agent gets its own `/webhook/<flow>` path on it.
pub fn default_agents(webhook_base_url: &str) -> Vec<Agent> {
    let base = webhook_base_url.trim_end_matches('/');
    let seed = [
        (
            "general",
            "Chief Agent",
            AgentType::General,
            "Main agent that distributes tasks",
            "🤖",
            "chef-agent",
            "#1F2A44",
        ),
        (
            "support",
            "Support Agent",
            AgentType::Specialist,
            "Technical assistance and customer support",
            "🛠️",
            "support-agent",
            "#3BBFD6",
        ),
        (
            "sales",
            "Sales Agent",
            AgentType::Specialist,
            "Sales and customer relations",
            "💼",
            "sales-agent",
            "#3DC487",
        ),
        (
            "marketing",
            "Marketing Agent",
            AgentType::Specialist,
            "Marketing strategy and communication",
            "📈",
            "marketing-agent",
            "#A0A6B1",
        ),
    ];

    seed.into_iter()
        .map(|(id, name, agent_type, description, glyph, flow, color)| {
            Agent::with_id(
                id.to_string(),
                AgentProfile {
                    name: name.to_string(),
                    agent_type,
                    description: description.to_string(),
                    avatar_glyph: glyph.to_string(),
                    endpoint_url: format!("{}/webhook/{}", base, flow),
                    active: true,
                    color_hex: color.to_string(),
                },
            )
        })
        .collect()
}
