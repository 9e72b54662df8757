//! Application configuration
//!
//! Centralized configuration management with environment variable support
//! and sensible defaults.

use crate::dispatch::{DispatchConfig, DEFAULT_FAILURE_MESSAGE};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Persistence configuration
    pub persistence: PersistenceConfig,
    /// Dispatch configuration
    pub dispatch: DispatchSettings,
    /// Agent seeding configuration
    pub agents: AgentSettings,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind the server to
    pub port: u16,
    /// Host address to bind to
    pub host: String,
}

/// Persistence configuration
#[derive(Debug, Clone)]
pub struct PersistenceConfig {
    /// Directory holding the session snapshot
    pub data_dir: String,
}

/// Dispatch configuration
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    /// Timeout for one webhook round trip (in seconds)
    pub timeout_secs: u64,
    /// Text appended when a dispatch fails
    pub failure_message: String,
}

/// Agent seeding configuration
#[derive(Debug, Clone)]
pub struct AgentSettings {
    /// Host of the automation webhooks behind the default agents
    pub webhook_base_url: String,
    /// Whether an empty registry is seeded with the default agents
    pub seed_defaults: bool,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080),
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            },
            persistence: PersistenceConfig {
                data_dir: env::var("DATA_DIR").unwrap_or_else(|_| {
                    // Default to ~/.agent-dashboard or current directory
                    if let Some(home) = env::var_os("HOME") {
                        format!("{}/.agent-dashboard", home.to_string_lossy())
                    } else {
                        ".agent-dashboard".to_string()
                    }
                }),
            },
            dispatch: DispatchSettings {
                timeout_secs: env::var("DISPATCH_TIMEOUT_SECS")
                    .ok()
                    .and_then(|t| t.parse().ok())
                    .filter(|t| *t > 0)
                    .unwrap_or(30),
                failure_message: env::var("DISPATCH_FAILURE_MESSAGE")
                    .ok()
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string()),
            },
            agents: AgentSettings {
                webhook_base_url: env::var("WEBHOOK_BASE_URL")
                    .unwrap_or_else(|_| "https://n8n.example.com".to_string()),
                seed_defaults: env::var("SEED_DEFAULT_AGENTS")
                    .map(|v| !matches!(v.to_lowercase().as_str(), "0" | "false" | "no"))
                    .unwrap_or(true),
            },
        }
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Path of the session snapshot file
    pub fn snapshot_path(&self) -> PathBuf {
        crate::state::SnapshotFile::path_in(&self.persistence.data_dir)
    }

    /// Settings for the dispatcher
    pub fn dispatch_config(&self) -> DispatchConfig {
        DispatchConfig {
            timeout: Duration::from_secs(self.dispatch.timeout_secs),
            failure_message: self.dispatch.failure_message.clone(),
        }
    }
}
