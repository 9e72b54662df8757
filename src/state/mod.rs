// State management module
// Handles agent registry, session state, and persistence

pub mod agent;
pub mod app_state;
pub mod persistence;
pub mod registry;

pub use agent::{default_agents, Agent, AgentId, AgentPatch, AgentProfile, AgentType};
pub use app_state::{AppState, DashboardView, DispatchToken, SharedState};
pub use persistence::{PersistenceError, SessionSnapshot, SnapshotFile};
pub use registry::AgentRegistry;
