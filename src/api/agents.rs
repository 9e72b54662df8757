//! Agent management API handlers
//!
//! Contains HTTP request handlers for the agent registry.

use crate::api::RouterState;
use crate::error::AppError;
use crate::state::{Agent, AgentId, AgentPatch, AgentProfile};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Serialize;

/// Agents list response
#[derive(Debug, Serialize)]
pub struct AgentsListResponse {
    /// List of all agents
    pub agents: Vec<Agent>,
    /// Total number of agents
    pub count: usize,
}

/// GET /api/agents - List all agents
pub async fn list_agents(State(state): State<RouterState>) -> Json<AgentsListResponse> {
    let app = state.app().read().await;
    let agents = app.agents().list().to_vec();
    Json(AgentsListResponse {
        count: agents.len(),
        agents,
    })
}

/// GET /api/agents/:id - Get a specific agent
pub async fn get_agent(
    State(state): State<RouterState>,
    Path(id): Path<AgentId>,
) -> Result<Json<Agent>, AppError> {
    let app = state.app().read().await;
    let agent = app
        .agents()
        .find(&id)
        .ok_or_else(|| AppError::AgentNotFound(id.clone()))?;
    Ok(Json(agent.clone()))
}

/// POST /api/agents - Register a new agent
pub async fn create_agent(
    State(state): State<RouterState>,
    Json(profile): Json<AgentProfile>,
) -> (StatusCode, Json<Agent>) {
    let agent = state.app().write().await.create_agent(profile);
    (StatusCode::CREATED, Json(agent))
}

/// PUT /api/agents/:id - Update an agent
pub async fn update_agent(
    State(state): State<RouterState>,
    Path(id): Path<AgentId>,
    Json(patch): Json<AgentPatch>,
) -> Result<Json<Agent>, AppError> {
    let mut app = state.app().write().await;
    if !app.update_agent(&id, patch) {
        return Err(AppError::AgentNotFound(id));
    }
    let agent = app
        .agents()
        .find(&id)
        .ok_or_else(|| AppError::AgentNotFound(id.clone()))?;
    Ok(Json(agent.clone()))
}

/// POST /api/agents/:id/toggle - Flip an agent's activation
pub async fn toggle_agent(
    State(state): State<RouterState>,
    Path(id): Path<AgentId>,
) -> Result<Json<Agent>, AppError> {
    let mut app = state.app().write().await;
    app.toggle_agent_active(&id)
        .ok_or_else(|| AppError::AgentNotFound(id.clone()))?;
    let agent = app
        .agents()
        .find(&id)
        .ok_or_else(|| AppError::AgentNotFound(id.clone()))?;
    Ok(Json(agent.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::session::tests::test_router_state;

    #[tokio::test]
    async fn test_list_agents_empty() {
        let state = test_router_state();
        let response = list_agents(State(state)).await;
        assert_eq!(response.count, 0);
        assert!(response.agents.is_empty());
    }

    #[tokio::test]
    async fn test_create_agent() {
        let state = test_router_state();
        let profile = AgentProfile::new("Ops Agent", "https://hooks.test/ops-agent");

        let (status, Json(agent)) = create_agent(State(state.clone()), Json(profile)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(agent.name, "Ops Agent");
        assert!(agent.active);

        let list = list_agents(State(state)).await;
        assert_eq!(list.count, 1);
    }

    #[tokio::test]
    async fn test_update_and_toggle_agent() {
        let state = test_router_state();
        let profile = AgentProfile::new("Ops Agent", "https://hooks.test/ops-agent");
        let (_, Json(agent)) = create_agent(State(state.clone()), Json(profile)).await;

        let patch = AgentPatch {
            description: Some("Runs the ops flows".to_string()),
            ..Default::default()
        };
        let Json(updated) = update_agent(State(state.clone()), Path(agent.id.clone()), Json(patch))
            .await
            .unwrap();
        assert_eq!(updated.description, "Runs the ops flows");

        let Json(toggled) = toggle_agent(State(state), Path(agent.id)).await.unwrap();
        assert!(!toggled.active);
    }

    #[tokio::test]
    async fn test_get_agent_not_found() {
        let state = test_router_state();
        let result = get_agent(State(state), Path("nonexistent".to_string())).await;
        match result {
            Err(AppError::AgentNotFound(id)) => assert_eq!(id, "nonexistent"),
            other => panic!("Expected AgentNotFound error, got: {:?}", other.map(|j| j.0)),
        }
    }

    #[tokio::test]
    async fn test_toggle_unknown_agent() {
        let state = test_router_state();
        let result = toggle_agent(State(state), Path("nonexistent".to_string())).await;
        assert!(matches!(result, Err(AppError::AgentNotFound(_))));
    }
}
