//! Session API handlers
//!
//! Health check, the dashboard view, and saving the session snapshot.

use crate::api::RouterState;
use crate::error::AppError;
use crate::state::{DashboardView, SnapshotFile};
use axum::{extract::State, response::Json};
use serde::Serialize;
use tracing::info;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Health indicator
    pub status: String,
    /// Crate version
    pub version: String,
}

/// Save response
#[derive(Debug, Serialize)]
pub struct SaveResponse {
    /// Where the snapshot was written
    pub path: String,
    /// Number of agents saved
    pub agents: usize,
    /// Number of conversations saved
    pub conversations: usize,
}

/// GET /api/health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/dashboard - Agents, conversations, selection and busy flags
pub async fn dashboard(State(state): State<RouterState>) -> Json<DashboardView> {
    Json(state.app().read().await.view())
}

/// POST /api/session/save - Write the session snapshot to disk
pub async fn save_session(
    State(state): State<RouterState>,
) -> Result<Json<SaveResponse>, AppError> {
    let snapshot = state.app().read().await.snapshot();
    let path = state.snapshot_path.clone();
    let response = SaveResponse {
        path: path.display().to_string(),
        agents: snapshot.agents.len(),
        conversations: snapshot.conversations.len(),
    };

    tokio::task::spawn_blocking(move || SnapshotFile::save_to_file(&snapshot, &path))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Save task failed: {}", e)))??;

    info!(
        path = %response.path,
        agents = response.agents,
        conversations = response.conversations,
        "Session saved"
    );
    Ok(Json(response))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::dispatch::{DispatchConfig, Dispatcher, WebhookClient};
    use crate::state::{Agent, AgentProfile, AppState};
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Duration;

    /// Router state over an empty session
    pub(crate) fn test_router_state() -> RouterState {
        router_state_with(AppState::new(), std::env::temp_dir().join("unused-session.json"))
    }

    /// Router state over `app`, saving to `snapshot_path`
    pub(crate) fn router_state_with(app: AppState, snapshot_path: PathBuf) -> RouterState {
        let endpoint = WebhookClient::new(Duration::from_secs(5)).unwrap();
        let dispatcher = Dispatcher::new(
            app.into_shared(),
            Arc::new(endpoint),
            DispatchConfig::default(),
        );
        RouterState::new(dispatcher, snapshot_path)
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = health_check().await;
        assert_eq!(response.status, "healthy");
    }

    #[tokio::test]
    async fn test_dashboard_view() {
        let mut app = AppState::with_agents([Agent::with_id(
            "a1".to_string(),
            AgentProfile::new("Support Agent", "https://hooks.test/support-agent"),
        )]);
        let id = app.create_conversation("a1").unwrap().id;
        let state = router_state_with(app, PathBuf::from("unused.json"));

        let view = dashboard(State(state)).await;
        assert_eq!(view.agents.len(), 1);
        assert_eq!(view.available_agents, vec!["a1".to_string()]);
        assert_eq!(view.active_conversation_id.as_ref(), Some(&id));
        assert_eq!(view.busy.get(&id), Some(&false));
    }

    #[tokio::test]
    async fn test_save_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let app = AppState::with_agents([Agent::with_id(
            "a1".to_string(),
            AgentProfile::new("Support Agent", "https://hooks.test/support-agent"),
        )]);
        let state = router_state_with(app, path.clone());

        let response = save_session(State(state)).await.unwrap();
        assert_eq!(response.agents, 1);
        assert_eq!(response.conversations, 0);

        let loaded = SnapshotFile::load_from_file(&path).unwrap();
        assert!(loaded.agents.contains_key("a1"));
    }
}
