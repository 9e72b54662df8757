//! Conversation API handlers
//!
//! Creating, selecting and deleting conversations, and sending messages.

use crate::api::RouterState;
use crate::chat::{consecutive_flags, Conversation, ConversationId, Message};
use crate::error::AppError;
use crate::state::AgentId;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request to start a conversation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConversationRequest {
    /// Agent to talk to
    pub agent_id: AgentId,
}

/// Request to send a message
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    /// Message content
    pub content: String,
}

/// One line of the conversation list
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    /// Conversation unique identifier
    pub id: ConversationId,
    /// Agent the conversation talks to
    pub agent_id: AgentId,
    /// Agent name when the conversation started
    pub agent_name: String,
    /// When the conversation was created
    pub created_at: DateTime<Utc>,
    /// When the conversation last changed
    pub updated_at: DateTime<Utc>,
    /// Number of messages
    pub message_count: usize,
    /// Latest message, for the preview line
    pub last_message: Option<Message>,
    /// Whether a reply is pending
    pub busy: bool,
}

/// Conversation list response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationsListResponse {
    /// Conversations, most recent first
    pub conversations: Vec<ConversationSummary>,
    /// Total number of conversations
    pub count: usize,
    /// Selected conversation
    pub active_conversation_id: Option<ConversationId>,
}

/// A full conversation with presentation hints
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationDetail {
    /// The conversation and its messages
    pub conversation: Conversation,
    /// Per message: whether it continues the previous one
    pub consecutive: Vec<bool>,
    /// Whether a reply is pending
    pub busy: bool,
}

/// Selection response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionResponse {
    /// Selected conversation
    pub active_conversation_id: Option<ConversationId>,
}

/// Send response
#[derive(Debug, Serialize)]
pub struct SendResponse {
    /// Whether the message was taken; blank text, unknown conversations and
    /// conversations already waiting for a reply are not
    pub accepted: bool,
    /// The recorded user message
    pub message: Option<Message>,
}

/// GET /api/conversations - List conversations
pub async fn list_conversations(
    State(state): State<RouterState>,
) -> Json<ConversationsListResponse> {
    let app = state.app().read().await;
    let conversations: Vec<ConversationSummary> = app
        .conversations()
        .list()
        .iter()
        .map(|c| ConversationSummary {
            id: c.id.clone(),
            agent_id: c.agent_id.clone(),
            agent_name: c.agent_name.clone(),
            created_at: c.created_at,
            updated_at: c.updated_at,
            message_count: c.messages.len(),
            last_message: c.last_message().cloned(),
            busy: app.is_busy(&c.id),
        })
        .collect();

    Json(ConversationsListResponse {
        count: conversations.len(),
        conversations,
        active_conversation_id: app.conversations().active_id().cloned(),
    })
}

/// GET /api/conversations/:id - Get a conversation with its messages
pub async fn get_conversation(
    State(state): State<RouterState>,
    Path(id): Path<ConversationId>,
) -> Result<Json<ConversationDetail>, AppError> {
    let app = state.app().read().await;
    let conversation = app
        .conversations()
        .find(&id)
        .ok_or_else(|| AppError::ConversationNotFound(id.clone()))?;

    Ok(Json(ConversationDetail {
        consecutive: consecutive_flags(&conversation.messages),
        busy: app.is_busy(&id),
        conversation: conversation.clone(),
    }))
}

/// POST /api/conversations - Start a conversation with an agent
pub async fn create_conversation(
    State(state): State<RouterState>,
    Json(request): Json<CreateConversationRequest>,
) -> Result<(StatusCode, Json<Conversation>), AppError> {
    let conversation = state
        .app()
        .write()
        .await
        .create_conversation(&request.agent_id)
        .ok_or(AppError::AgentNotFound(request.agent_id))?;
    Ok((StatusCode::CREATED, Json(conversation)))
}

/// DELETE /api/conversations/:id - Delete a conversation
pub async fn delete_conversation(
    State(state): State<RouterState>,
    Path(id): Path<ConversationId>,
) -> Result<Json<Conversation>, AppError> {
    let removed = state
        .app()
        .write()
        .await
        .delete_conversation(&id)
        .ok_or_else(|| AppError::ConversationNotFound(id.clone()))?;
    Ok(Json(removed))
}

/// POST /api/conversations/:id/select - Make a conversation the active one
pub async fn select_conversation(
    State(state): State<RouterState>,
    Path(id): Path<ConversationId>,
) -> Json<SelectionResponse> {
    let mut app = state.app().write().await;
    app.select_conversation(&id);
    Json(SelectionResponse {
        active_conversation_id: app.conversations().active_id().cloned(),
    })
}

/// POST /api/conversations/:id/messages - Send a message to the agent
///
/// Answers as soon as the user message is recorded; the reply shows up in
/// the conversation once the agent's webhook has answered.
pub async fn send_message(
    State(state): State<RouterState>,
    Path(id): Path<ConversationId>,
    Json(request): Json<SendMessageRequest>,
) -> (StatusCode, Json<SendResponse>) {
    let handle = state.dispatcher.send(&id, &request.content).await;
    let response = SendResponse {
        accepted: handle.is_some(),
        message: handle.map(|h| h.user_message().clone()),
    };
    (StatusCode::ACCEPTED, Json(response))
}

/// POST /api/messages - Send a message on the active conversation
pub async fn send_to_active(
    State(state): State<RouterState>,
    Json(request): Json<SendMessageRequest>,
) -> (StatusCode, Json<SendResponse>) {
    let handle = state.dispatcher.send_to_active(&request.content).await;
    let response = SendResponse {
        accepted: handle.is_some(),
        message: handle.map(|h| h.user_message().clone()),
    };
    (StatusCode::ACCEPTED, Json(response))
}
