//! Agent Dashboard Library
//!
//! Session core for a dashboard that chats with automation agents reachable
//! over HTTP webhooks. The binary in `src/main.rs` serves it over a REST API.

pub mod api;
pub mod chat;
pub mod config;
pub mod dispatch;
pub mod error;
/// Application state management
///
/// Handles the agent registry, the session object, and snapshot persistence.
pub mod state;
