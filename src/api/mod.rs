//! API module
//!
//! HTTP handlers the dashboard front end talks to. They only read views of
//! the session state and call its mutation entry points.

pub mod agents;
pub mod conversations;
pub mod session;

use crate::dispatch::Dispatcher;
use crate::state::SharedState;
use axum::{
    routing::{get, post},
    Router,
};
use std::path::PathBuf;

/// State shared by all handlers
#[derive(Clone)]
pub struct RouterState {
    /// Dispatcher, which also holds the session state
    pub dispatcher: Dispatcher,
    /// Where the session snapshot is saved
    pub snapshot_path: PathBuf,
}

impl RouterState {
    /// Create router state
    pub fn new(dispatcher: Dispatcher, snapshot_path: PathBuf) -> Self {
        Self {
            dispatcher,
            snapshot_path,
        }
    }

    /// The session state
    pub fn app(&self) -> &SharedState {
        self.dispatcher.state()
    }
}

/// Build the API router
pub fn router(state: RouterState) -> Router {
    Router::new()
        .route("/api/health", get(session::health_check))
        .route("/api/dashboard", get(session::dashboard))
        .route("/api/session/save", post(session::save_session))
        // Agent registry
        .route(
            "/api/agents",
            get(agents::list_agents).post(agents::create_agent),
        )
        .route(
            "/api/agents/:id",
            get(agents::get_agent).put(agents::update_agent),
        )
        .route("/api/agents/:id/toggle", post(agents::toggle_agent))
        // Conversations
        .route(
            "/api/conversations",
            get(conversations::list_conversations).post(conversations::create_conversation),
        )
        .route(
            "/api/conversations/:id",
            get(conversations::get_conversation).delete(conversations::delete_conversation),
        )
        .route(
            "/api/conversations/:id/select",
            post(conversations::select_conversation),
        )
        .route(
            "/api/conversations/:id/messages",
            post(conversations::send_message),
        )
        .route("/api/messages", post(conversations::send_to_active))
        .with_state(state)
}
