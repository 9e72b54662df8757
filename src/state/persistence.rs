// Session persistence module
// Flat snapshot of agents and conversations, and saving/loading it to/from files

use crate::chat::{Conversation, ConversationId};
use crate::state::agent::{Agent, AgentId};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Error types for persistence operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// File I/O error
    #[error("IO Error: {0}")]
    IoError(String),
    /// JSON serialization/deserialization error
    #[error("JSON Error: {0}")]
    JsonError(String),
    /// Invalid data format
    #[error("Invalid Data: {0}")]
    InvalidData(String),
}

/// Serializable state of a session, keyed by agent ID and conversation ID
///
/// Maps carry the data; the order lists carry registration order for agents
/// and most-recent-first order for conversations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Version of the snapshot format (for future migration support)
    pub version: u32,
    /// Map of agent ID to agent data
    pub agents: HashMap<AgentId, Agent>,
    /// Agent IDs in registration order
    #[serde(default)]
    pub agent_order: Vec<AgentId>,
    /// Map of conversation ID to conversation data
    pub conversations: HashMap<ConversationId, Conversation>,
    /// Conversation IDs, most recent first
    #[serde(default)]
    pub conversation_order: Vec<ConversationId>,
    /// Selected conversation
    #[serde(default)]
    pub active_conversation_id: Option<ConversationId>,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            agents: HashMap::new(),
            agent_order: Vec::new(),
            conversations: HashMap::new(),
            conversation_order: Vec::new(),
            active_conversation_id: None,
        }
    }
}

/// Snapshot file operations
pub struct SnapshotFile;

impl SnapshotFile {
    /// Save a snapshot to a JSON file
    ///
    /// Creates the parent directory if needed.
    ///
    /// # Arguments
    /// * `snapshot` - Snapshot to save
    /// * `path` - Path to the JSON file
    pub fn save_to_file<P: AsRef<Path>>(
        snapshot: &SessionSnapshot,
        path: P,
    ) -> Result<(), PersistenceError> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).map_err(|e| PersistenceError::IoError(e.to_string()))?;
        }

        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|e| PersistenceError::JsonError(e.to_string()))?;

        fs::write(path.as_ref(), json).map_err(|e| PersistenceError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Load a snapshot from a JSON file
    ///
    /// A missing file yields an empty snapshot.
    ///
    /// # Arguments
    /// * `path` - Path to the JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<SessionSnapshot, PersistenceError> {
        if !path.as_ref().exists() {
            return Ok(SessionSnapshot::default());
        }

        let json = fs::read_to_string(path.as_ref())
            .map_err(|e| PersistenceError::IoError(e.to_string()))?;

        let snapshot: SessionSnapshot =
            serde_json::from_str(&json).map_err(|e| PersistenceError::JsonError(e.to_string()))?;

        // Validate version (for future migration support)
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(PersistenceError::InvalidData(format!(
                "Unsupported snapshot version: {}",
                snapshot.version
            )));
        }

        Ok(snapshot)
    }

    /// Load a snapshot, moving an unreadable file out of the way
    ///
    /// A file that exists but fails to load is renamed with a `.corrupt-<time>`
    /// suffix and an empty snapshot is returned, so the next save cannot
    /// overwrite it. Errors only if that rename fails.
    pub fn load_or_set_aside<P: AsRef<Path>>(
        path: P,
    ) -> Result<SessionSnapshot, PersistenceError> {
        let path = path.as_ref();
        match Self::load_from_file(path) {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                let aside = Self::set_aside(path)?;
                warn!(
                    path = %path.display(),
                    moved_to = %aside.display(),
                    error = %e,
                    "Unreadable session file set aside"
                );
                Ok(SessionSnapshot::default())
            }
        }
    }

    /// Rename `path` to `<name>.corrupt-<UTC timestamp>` next to it
    pub fn set_aside<P: AsRef<Path>>(path: P) -> Result<PathBuf, PersistenceError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                PersistenceError::InvalidData(format!("No file name in {}", path.display()))
            })?;
        let aside = path.with_file_name(format!(
            "{}.corrupt-{}",
            name,
            Utc::now().format("%Y%m%dT%H%M%S%.3fZ")
        ));
        fs::rename(path, &aside).map_err(|e| PersistenceError::IoError(e.to_string()))?;
        Ok(aside)
    }

    /// Path of the session file inside `data_dir`
    pub fn path_in(data_dir: &str) -> PathBuf {
        PathBuf::from(data_dir).join("session.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{AgentProfile, AppState};
    use tempfile::{tempdir, NamedTempFile};

    fn populated_state() -> AppState {
        let mut state = AppState::with_agents([Agent::with_id(
            "a1".to_string(),
            AgentProfile::new("Support Agent", "https://hooks.test/support-agent"),
        )]);
        state.create_conversation("a1");
        state
    }

    #[test]
    fn test_snapshot_serialization() {
        let snapshot = populated_state().snapshot();
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["version"], 1);
        assert!(json["agents"]["a1"].is_object());
        assert_eq!(json["agentOrder"][0], "a1");
        assert!(json["activeConversationId"].is_string());
    }

    #[test]
    fn test_save_and_load_from_file() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path();

        let snapshot = populated_state().snapshot();
        SnapshotFile::save_to_file(&snapshot, path).unwrap();

        let loaded = SnapshotFile::load_from_file(path).unwrap();
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let dir = tempdir().unwrap();
        let path = SnapshotFile::path_in(&dir.path().join("nested").to_string_lossy());

        SnapshotFile::save_to_file(&SessionSnapshot::default(), &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_load_from_nonexistent_file() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_path_buf();
        std::fs::remove_file(&path).unwrap();

        let snapshot = SnapshotFile::load_from_file(&path).unwrap();
        assert!(snapshot.agents.is_empty());
        assert!(snapshot.conversations.is_empty());
    }

    #[test]
    fn test_load_rejects_unknown_version() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(
            temp_file.path(),
            r#"{"version": 7, "agents": {}, "conversations": {}}"#,
        )
        .unwrap();

        let result = SnapshotFile::load_from_file(temp_file.path());
        assert!(matches!(result, Err(PersistenceError::InvalidData(_))));
    }

    #[test]
    fn test_load_invalid_json() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "not json").unwrap();

        let result = SnapshotFile::load_from_file(temp_file.path());
        assert!(matches!(result, Err(PersistenceError::JsonError(_))));
    }

    #[test]
    fn test_unreadable_file_is_set_aside() {
        let dir = tempdir().unwrap();
        let path = SnapshotFile::path_in(&dir.path().to_string_lossy());
        std::fs::write(&path, r#"{"version": 7, "agents": {}, "conversations": {}}"#).unwrap();

        let snapshot = SnapshotFile::load_or_set_aside(&path).unwrap();
        assert!(snapshot.agents.is_empty());
        assert!(!path.exists());

        let kept: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(kept.len(), 1);
        assert!(kept[0].starts_with("session.json.corrupt-"));
        let original = std::fs::read_to_string(dir.path().join(&kept[0])).unwrap();
        assert!(original.contains("\"version\": 7"));

        // Saving afterwards leaves the set-aside copy alone
        SnapshotFile::save_to_file(&populated_state().snapshot(), &path).unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_readable_file_is_left_in_place() {
        let dir = tempdir().unwrap();
        let path = SnapshotFile::path_in(&dir.path().to_string_lossy());
        let snapshot = populated_state().snapshot();
        SnapshotFile::save_to_file(&snapshot, &path).unwrap();

        assert_eq!(SnapshotFile::load_or_set_aside(&path).unwrap(), snapshot);
        assert!(path.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_missing_file_loads_empty_without_set_aside() {
        let dir = tempdir().unwrap();
        let path = SnapshotFile::path_in(&dir.path().to_string_lossy());

        let snapshot = SnapshotFile::load_or_set_aside(&path).unwrap();
        assert!(snapshot.conversations.is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
