//! Message dispatch module
//!
//! Delivers user messages to agent webhooks and records the replies.
//! Handles the busy state of each conversation, timeouts, failures, and
//! completions arriving after their conversation was deleted.

pub mod dispatcher;
pub mod error;
pub mod webhook;

pub use dispatcher::{
    DispatchConfig, DispatchHandle, DispatchOutcome, Dispatcher, PendingDispatch,
    DEFAULT_FAILURE_MESSAGE,
};
pub use error::DispatchError;
pub use webhook::{AgentEndpoint, WebhookClient, WebhookReply, WebhookRequest};
