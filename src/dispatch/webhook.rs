//! Webhook client
//!
//! HTTP transport for dispatches. Each agent is backed by an automation flow
//! (an n8n webhook) that receives the user's message and answers with the
//! agent's reply.

use crate::dispatch::error::DispatchError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Payload POSTed to an agent's endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRequest {
    /// Text the user submitted
    pub message: String,
    /// Conversation the message belongs to
    pub chat_id: String,
    /// Agent the conversation is bound to
    pub agent_id: String,
    /// When the dispatch started
    pub timestamp: DateTime<Utc>,
}

/// Body an agent's endpoint answers with
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WebhookReply {
    /// The agent's reply text
    pub message: String,
    /// Whether the flow handled the message
    pub success: bool,
    /// When the flow produced the reply
    pub timestamp: DateTime<Utc>,
}

impl WebhookReply {
    /// Treat `success: false` as an error
    pub fn into_result(self) -> Result<Self, DispatchError> {
        if self.success {
            Ok(self)
        } else {
            Err(DispatchError::Rejected(self.message))
        }
    }
}

/// Something that can deliver a user message to an agent and bring back its reply
#[async_trait]
pub trait AgentEndpoint: Send + Sync {
    /// Deliver `request` to the agent listening at `endpoint_url`
    async fn deliver(
        &self,
        endpoint_url: &str,
        request: &WebhookRequest,
    ) -> Result<WebhookReply, DispatchError>;
}

/// Real HTTP endpoint backed by a shared reqwest client (connection pooling)
#[derive(Debug, Clone)]
pub struct WebhookClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl WebhookClient {
    /// Build a client whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DispatchError::Client(e.to_string()))?;
        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl AgentEndpoint for WebhookClient {
    async fn deliver(
        &self,
        endpoint_url: &str,
        request: &WebhookRequest,
    ) -> Result<WebhookReply, DispatchError> {
        tracing::debug!(
            url = %endpoint_url,
            chat_id = %request.chat_id,
            agent_id = %request.agent_id,
            message_len = request.message.len(),
            "Calling agent webhook"
        );

        let response = self
            .client
            .post(endpoint_url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DispatchError::Timeout(self.timeout)
                } else {
                    DispatchError::Network(e.to_string())
                }
            })?;

        // Check HTTP status
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());
            return Err(DispatchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| DispatchError::Network(format!("failed to read body: {}", e)))?;

        let reply: WebhookReply = serde_json::from_str(&body)
            .map_err(|e| DispatchError::MalformedReply(format!("{} - body: {}", e, body)))?;

        tracing::debug!(
            chat_id = %request.chat_id,
            success = reply.success,
            reply_len = reply.message.len(),
            "Agent webhook answered"
        );

        Ok(reply)
    }
}
