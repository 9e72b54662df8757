//! Dispatch-specific error types
//!
//! Errors that can occur while delivering a message to an agent's webhook.
//! None of them reach the caller of `send`: the dispatcher turns each one
//! into an error-flagged message in the conversation.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during a dispatch round trip
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The request never got a response (connection refused, DNS, reset)
    #[error("Network error: {0}")]
    Network(String),

    /// The endpoint did not answer within the configured limit
    #[error("Dispatch timed out after {0:?}")]
    Timeout(Duration),

    /// The endpoint answered with a non-success HTTP status
    #[error("Endpoint returned status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, for the logs
        body: String,
    },

    /// The response body was not a valid reply
    #[error("Malformed reply: {0}")]
    MalformedReply(String),

    /// The endpoint answered but reported `success: false`
    #[error("Agent rejected the message: {0}")]
    Rejected(String),

    /// The endpoint implementation panicked mid-call
    #[error("Endpoint panicked: {0}")]
    EndpointPanicked(String),

    /// The HTTP client could not be built
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}
