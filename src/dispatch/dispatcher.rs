//! Message dispatcher
//!
//! Runs the round trip between a conversation and its agent's webhook in two
//! phases:
//!
//! 1. [`Dispatcher::begin`] appends the user message and marks the
//!    conversation busy, under a single write lock.
//! 2. [`Dispatcher::settle`] calls the endpoint without holding the lock,
//!    then appends the reply (or an error-flagged notice) and clears the busy
//!    state, unless the conversation was deleted in the meantime.
//!
//! [`Dispatcher::send`] does phase 1 inline and spawns phase 2, so callers
//! regain control as soon as the user message is recorded.

use crate::chat::{ConversationId, Message, MessageDraft};
use crate::dispatch::error::DispatchError;
use crate::dispatch::webhook::{AgentEndpoint, WebhookRequest};
use crate::state::{AppState, DispatchToken, SharedState};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Text shown in place of a reply when a dispatch fails
pub const DEFAULT_FAILURE_MESSAGE: &str =
    "Sorry, an error occurred while contacting the agent. Please try again.";

/// Dispatch settings
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Upper bound for one endpoint round trip
    pub timeout: Duration,
    /// Content of the error-flagged message appended on failure
    pub failure_message: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            failure_message: DEFAULT_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// A dispatch that finished phase 1 and waits for the endpoint
#[derive(Debug, Clone)]
pub struct PendingDispatch {
    /// Conversation the dispatch belongs to
    pub conversation_id: ConversationId,
    /// In-flight token captured when the dispatch started
    pub token: DispatchToken,
    /// The user message appended in phase 1
    pub user_message: Message,
    /// Agent name, recorded on the reply
    pub agent_name: String,
    /// Where the request goes
    pub endpoint_url: String,
    /// What gets sent
    pub request: WebhookRequest,
}

/// How a dispatch ended
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// The agent replied; the reply was appended
    Replied(Message),
    /// The round trip failed; an error-flagged message was appended
    Failed(Message),
    /// The conversation went away before the result came back
    Discarded,
}

impl DispatchOutcome {
    /// The message appended by this dispatch, if any
    pub fn message(&self) -> Option<&Message> {
        match self {
            DispatchOutcome::Replied(message) | DispatchOutcome::Failed(message) => Some(message),
            DispatchOutcome::Discarded => None,
        }
    }
}

/// Handle to a dispatch whose second phase runs in the background
#[derive(Debug)]
pub struct DispatchHandle {
    user_message: Message,
    conversation_id: ConversationId,
    task: JoinHandle<DispatchOutcome>,
}

impl DispatchHandle {
    /// The user message recorded by phase 1
    pub fn user_message(&self) -> &Message {
        &self.user_message
    }

    /// Conversation the dispatch belongs to
    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    /// Wait for the dispatch to settle
    ///
    /// Dropping the handle instead leaves the dispatch running.
    pub async fn settled(self) -> DispatchOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(
                    conversation_id = %self.conversation_id,
                    error = %e,
                    "Dispatch task did not complete"
                );
                DispatchOutcome::Discarded
            }
        }
    }
}

/// Sends user messages to agents and records their replies
#[derive(Clone)]
pub struct Dispatcher {
    state: SharedState,
    endpoint: Arc<dyn AgentEndpoint>,
    config: DispatchConfig,
}

impl Dispatcher {
    /// Create a dispatcher working on `state` through `endpoint`
    pub fn new(
        state: SharedState,
        endpoint: Arc<dyn AgentEndpoint>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            state,
            endpoint,
            config,
        }
    }

    /// The session state this dispatcher mutates
    pub fn state(&self) -> &SharedState {
        &self.state
    }

    /// Phase 1: validate, append the user message, mark the conversation busy
    ///
    /// Returns None without touching anything when the text is blank, the
    /// conversation or its agent is unknown, or a dispatch is already
    /// outstanding on the conversation.
    pub fn begin(
        state: &mut AppState,
        conversation_id: &str,
        text: &str,
    ) -> Option<PendingDispatch> {
        let content = text.trim();
        if content.is_empty() {
            debug!(conversation_id = %conversation_id, "Ignoring blank message");
            return None;
        }

        let Some(conversation) = state.conversations().find(conversation_id) else {
            debug!(
                conversation_id = %conversation_id,
                "Ignoring message for unknown conversation"
            );
            return None;
        };
        let Some(agent) = state.agents().find(&conversation.agent_id) else {
            debug!(
                conversation_id = %conversation_id,
                agent_id = %conversation.agent_id,
                "Ignoring message for conversation with unknown agent"
            );
            return None;
        };

        let agent_id = agent.id.clone();
        let agent_name = agent.name.clone();
        let endpoint_url = agent.endpoint_url.clone();

        let (user_message, token) = state.open_dispatch(conversation_id, content)?;

        Some(PendingDispatch {
            conversation_id: conversation_id.to_string(),
            token,
            request: WebhookRequest {
                message: text.to_string(),
                chat_id: conversation_id.to_string(),
                agent_id,
                timestamp: Utc::now(),
            },
            user_message,
            agent_name,
            endpoint_url,
        })
    }

    /// Phase 2: call the endpoint, then record the result and clear busy
    ///
    /// Never fails: endpoint errors become an error-flagged message.
    pub async fn settle(&self, pending: PendingDispatch) -> DispatchOutcome {
        let started = std::time::Instant::now();
        let result = self.call_endpoint(&pending).await;

        let draft = match &result {
            Ok(reply) => MessageDraft::reply(reply.clone(), pending.agent_name.clone()),
            Err(e) => {
                warn!(
                    conversation_id = %pending.conversation_id,
                    endpoint = %pending.endpoint_url,
                    error = %e,
                    "Dispatch failed"
                );
                MessageDraft::failure(
                    self.config.failure_message.clone(),
                    pending.agent_name.clone(),
                )
            }
        };

        let recorded = {
            let mut state = self.state.write().await;
            state.close_dispatch(&pending.conversation_id, pending.token, draft)
        };

        match recorded {
            Some(message) => {
                info!(
                    conversation_id = %pending.conversation_id,
                    message_id = message.id,
                    sender = message.sender.as_str(),
                    error = message.error,
                    duration_ms = started.elapsed().as_millis(),
                    "Dispatch settled"
                );
                if result.is_ok() {
                    DispatchOutcome::Replied(message)
                } else {
                    DispatchOutcome::Failed(message)
                }
            }
            None => DispatchOutcome::Discarded,
        }
    }

    /// Send `text` on a conversation
    ///
    /// Returns once the user message is recorded; the reply arrives in the
    /// background. Returns None for invalid input, with nothing changed.
    pub async fn send(&self, conversation_id: &str, text: &str) -> Option<DispatchHandle> {
        let pending = {
            let mut state = self.state.write().await;
            Self::begin(&mut state, conversation_id, text)?
        };
        Some(self.spawn_settle(pending))
    }

    /// Send `text` on whichever conversation is active
    ///
    /// Returns None when nothing is selected, or for the same reasons as
    /// [`Dispatcher::send`].
    pub async fn send_to_active(&self, text: &str) -> Option<DispatchHandle> {
        let pending = {
            let mut state = self.state.write().await;
            let conversation_id = state.conversations().active_id()?.clone();
            Self::begin(&mut state, &conversation_id, text)?
        };
        Some(self.spawn_settle(pending))
    }

    fn spawn_settle(&self, pending: PendingDispatch) -> DispatchHandle {
        debug!(
            conversation_id = %pending.conversation_id,
            token = pending.token,
            "Dispatch started"
        );

        let user_message = pending.user_message.clone();
        let conversation_id = pending.conversation_id.clone();
        let dispatcher = self.clone();
        let task = tokio::spawn(async move { dispatcher.settle(pending).await });

        DispatchHandle {
            user_message,
            conversation_id,
            task,
        }
    }

    /// Send `text` and wait for the dispatch to settle
    pub async fn send_and_wait(
        &self,
        conversation_id: &str,
        text: &str,
    ) -> Option<DispatchOutcome> {
        let handle = self.send(conversation_id, text).await?;
        Some(handle.settled().await)
    }

    /// The endpoint runs on its own task; a panic in it becomes `EndpointPanicked`
    async fn call_endpoint(&self, pending: &PendingDispatch) -> Result<String, DispatchError> {
        let endpoint = Arc::clone(&self.endpoint);
        let endpoint_url = pending.endpoint_url.clone();
        let request = pending.request.clone();
        let mut call =
            tokio::spawn(async move { endpoint.deliver(&endpoint_url, &request).await });

        match tokio::time::timeout(self.config.timeout, &mut call).await {
            Ok(Ok(result)) => Ok(result?.into_result()?.message),
            Ok(Err(join_error)) => Err(DispatchError::EndpointPanicked(join_error.to_string())),
            Err(_) => {
                call.abort();
                Err(DispatchError::Timeout(self.config.timeout))
            }
        }
    }
}
