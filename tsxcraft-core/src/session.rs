//! # Sessions
//!
//! A session owns everything one styling run works on:
//! - the **virtual file store** the agents read and write
//! - the **scratch pad** handing diffs from the analyser to the styling agent
//! - the orchestrator's **todo list**
//! - the orchestrator's **conversation** and run metadata
//!
//! Sessions are plain values passed by `&mut`. Persisting one across
//! invocations is the host's choice, through a [`SessionBackend`].

use crate::error::{self, Result};
use crate::files::VirtualFs;
use crate::provider::ChatMessage;
use crate::scratch_pad::ScratchPad;
use crate::todos::TodoList;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Session metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// Session identifier
    pub id: String,
    /// Original task description
    pub task: String,
    /// When the session was created
    pub created_at: u64,
    /// When the session was last updated
    pub updated_at: u64,
    /// Number of LLM calls made
    pub llm_calls: usize,
    /// Number of tool calls executed
    #[serde(default)]
    pub tool_calls: usize,
    /// Current status
    pub status: SessionStatus,
}

/// Session status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SessionStatus {
    /// Session is active and can be continued
    Active,
    /// Session completed successfully
    Completed,
    /// Session failed with an error
    Failed,
}

/// All state for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub metadata: SessionMetadata,
    #[serde(default)]
    pub files: VirtualFs,
    #[serde(default)]
    pub scratch_pad: ScratchPad,
    #[serde(default)]
    pub todos: TodoList,
    /// Orchestrator conversation, system prompt excluded
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

impl Session {
    /// Create a new session
    pub fn new(id: impl Into<String>, task: impl Into<String>) -> Self {
        let now = current_timestamp();
        Self {
            metadata: SessionMetadata {
                id: id.into(),
                task: task.into(),
                created_at: now,
                updated_at: now,
                llm_calls: 0,
                tool_calls: 0,
                status: SessionStatus::Active,
            },
            files: VirtualFs::new(),
            scratch_pad: ScratchPad::new(),
            todos: TodoList::new(),
            messages: Vec::new(),
        }
    }

    /// Generate a unique session ID
    pub fn generate_id() -> String {
        use std::sync::atomic::{AtomicU32, Ordering};
        use std::time::{SystemTime, UNIX_EPOCH};
        static COUNTER: AtomicU32 = AtomicU32::new(0);

        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
        format!("session_{:x}{:02x}", ts, seq % 256)
    }

    pub fn id(&self) -> &str {
        &self.metadata.id
    }

    /// Update metadata timestamps
    pub fn touch(&mut self) {
        self.metadata.updated_at = current_timestamp();
    }

    pub fn record_llm_call(&mut self) {
        self.metadata.llm_calls += 1;
        self.touch();
    }

    pub fn record_tool_call(&mut self) {
        self.metadata.tool_calls += 1;
        self.touch();
    }

    pub fn set_status(&mut self, status: SessionStatus) {
        self.metadata.status = status;
        self.touch();
    }
}

/// Session IDs become directory names
fn validate_id(session_id: &str) -> Result<()> {
    let bad = session_id.is_empty()
        || session_id == "."
        || session_id == ".."
        || session_id.contains(['/', '\\', ':', '*', '?', '"', '<', '>', '|']);
    if bad {
        return Err(error::invalid_argument(format!("invalid session id '{}'", session_id))
            .with_operation("session::validate_id"));
    }
    Ok(())
}

// =============================================================================
// Session Backend Trait
// =============================================================================

/// Trait for session storage backends
pub trait SessionBackend: Send + Sync {
    /// Create a new session and persist it
    fn create_session(&self, task: &str) -> Result<Session> {
        let session = Session::new(Session::generate_id(), task);
        self.save_session(&session)?;
        Ok(session)
    }

    /// Save the whole session
    fn save_session(&self, session: &Session) -> Result<()>;

    /// Load a session by ID
    fn load_session(&self, session_id: &str) -> Result<Session>;

    /// List all session IDs, sorted
    fn list_sessions(&self) -> Result<Vec<String>>;

    /// Delete a session
    fn delete_session(&self, session_id: &str) -> Result<()>;

    /// Get session metadata
    fn get_session_info(&self, session_id: &str) -> Result<SessionMetadata> {
        let session = self.load_session(session_id)?;
        Ok(session.metadata)
    }

    /// Check if a session exists
    fn session_exists(&self, session_id: &str) -> bool {
        self.load_session(session_id).is_ok()
    }

    /// Get backend name for debugging
    fn backend_name(&self) -> &'static str;
}

// =============================================================================
// File-based Backend (JSON files)
// =============================================================================

/// File-based session storage using JSON files
///
/// Structure:
/// ```text
/// {base_path}/
///   {session_id}/
///     session.json
/// ```
pub struct FileBackend {
    base_path: PathBuf,
}

impl FileBackend {
    /// Create a new file backend
    pub fn new(base_path: impl AsRef<Path>) -> Result<Self> {
        let base_path = base_path.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_path)
            .map_err(|e| error::io_error(format!("Failed to create session directory: {}", e)))?;
        Ok(Self { base_path })
    }

    fn session_dir(&self, session_id: &str) -> PathBuf {
        self.base_path.join(session_id)
    }

    fn session_path(&self, session_id: &str) -> PathBuf {
        self.session_dir(session_id).join("session.json")
    }
}

impl SessionBackend for FileBackend {
    fn save_session(&self, session: &Session) -> Result<()> {
        validate_id(session.id())?;
        let session_dir = self.session_dir(session.id());

        std::fs::create_dir_all(&session_dir)
            .map_err(|e| error::io_error(format!("Failed to create session dir: {}", e)))?;

        let json = serde_json::to_string_pretty(session)
            .map_err(|e| error::serialization_error(e.to_string()))?;
        std::fs::write(self.session_path(session.id()), json)
            .map_err(|e| error::io_error(format!("Failed to write session: {}", e)))?;

        tracing::debug!(session = session.id(), "session saved");
        Ok(())
    }

    fn load_session(&self, session_id: &str) -> Result<Session> {
        validate_id(session_id)?;
        let path = self.session_path(session_id);

        let json = match std::fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(error::storage_not_found(session_id));
            }
            Err(e) => {
                return Err(error::io_error(format!("Failed to read session {}: {}", session_id, e)));
            }
        };

        serde_json::from_str(&json)
            .map_err(|e| error::parse_error(format!("Failed to parse session {}: {}", session_id, e)))
    }

    fn list_sessions(&self) -> Result<Vec<String>> {
        let mut sessions = Vec::new();

        let entries = std::fs::read_dir(&self.base_path)
            .map_err(|e| error::io_error(format!("Failed to read sessions dir: {}", e)))?;

        for entry in entries.flatten() {
            if !entry.path().join("session.json").is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                sessions.push(name.to_string());
            }
        }

        sessions.sort();
        Ok(sessions)
    }

    fn delete_session(&self, session_id: &str) -> Result<()> {
        validate_id(session_id)?;
        let session_dir = self.session_dir(session_id);
        if !session_dir.exists() {
            return Err(error::storage_not_found(session_id));
        }
        std::fs::remove_dir_all(&session_dir)
            .map_err(|e| error::io_error(format!("Failed to delete session {}: {}", session_id, e)))?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

// =============================================================================
// In-Memory Backend (for testing)
// =============================================================================

/// In-memory session storage
#[derive(Default)]
pub struct MemoryBackend {
    sessions: std::sync::RwLock<HashMap<String, Session>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> error::Error {
    error::storage_failed("session store lock poisoned")
}

impl SessionBackend for MemoryBackend {
    fn save_session(&self, session: &Session) -> Result<()> {
        let mut sessions = self.sessions.write().map_err(|_| poisoned())?;
        sessions.insert(session.id().to_string(), session.clone());
        Ok(())
    }

    fn load_session(&self, session_id: &str) -> Result<Session> {
        let sessions = self.sessions.read().map_err(|_| poisoned())?;
        sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| error::storage_not_found(session_id))
    }

    fn list_sessions(&self) -> Result<Vec<String>> {
        let sessions = self.sessions.read().map_err(|_| poisoned())?;
        let mut ids: Vec<String> = sessions.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    fn delete_session(&self, session_id: &str) -> Result<()> {
        let mut sessions = self.sessions.write().map_err(|_| poisoned())?;
        sessions
            .remove(session_id)
            .map(|_| ())
            .ok_or_else(|| error::storage_not_found(session_id))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

// =============================================================================
// SessionManager (wrapper with backend)
// =============================================================================

/// Manages session persistence with pluggable backends
pub struct SessionManager {
    backend: Box<dyn SessionBackend>,
}

impl SessionManager {
    /// Create a new session manager with the given backend
    pub fn with_backend(backend: impl SessionBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// Create a session manager with file backend (default)
    pub fn new(base_path: impl AsRef<Path>) -> Result<Self> {
        let backend = FileBackend::new(base_path)?;
        Ok(Self::with_backend(backend))
    }

    /// Create a session manager with in-memory backend
    pub fn in_memory() -> Self {
        Self::with_backend(MemoryBackend::new())
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }

    pub fn create_session(&self, task: impl Into<String>) -> Result<Session> {
        self.backend.create_session(&task.into())
    }

    pub fn save_session(&self, session: &Session) -> Result<()> {
        self.backend.save_session(session)
    }

    pub fn load_session(&self, session_id: &str) -> Result<Session> {
        self.backend.load_session(session_id)
    }

    /// Load an existing session, or start a fresh one under the given ID
    pub fn load_or_create(&self, session_id: &str, task: impl Into<String>) -> Result<Session> {
        match self.backend.load_session(session_id) {
            Ok(session) => Ok(session),
            Err(e) if e.kind() == error::ErrorKind::StorageNotFound => {
                validate_id(session_id)?;
                Ok(Session::new(session_id, task))
            }
            Err(e) => Err(e),
        }
    }

    pub fn list_sessions(&self) -> Result<Vec<String>> {
        self.backend.list_sessions()
    }

    pub fn delete_session(&self, session_id: &str) -> Result<()> {
        self.backend.delete_session(session_id)
    }

    pub fn get_session_info(&self, session_id: &str) -> Result<SessionMetadata> {
        self.backend.get_session_info(session_id)
    }

    pub fn session_exists(&self, session_id: &str) -> bool {
        self.backend.session_exists(session_id)
    }
}

fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::scratch_pad::DiffEntry;
    use crate::todos::{Todo, TodoStatus};
    use tempfile::TempDir;

    fn populated(manager: &SessionManager) -> Session {
        let mut session = manager.create_session("Restyle the price badge").unwrap();
        session.files.write("components/Price.tsx", "export const Price = () => <span />;\n");
        session.scratch_pad.write([
            DiffEntry::note("components/Price.tsx", "Add text-lg font-semibold"),
            DiffEntry::note("components/Badge.tsx", "New wrapper").with_snippets("<span>", "<em>"),
        ]);
        session.todos.write(vec![Todo::new("Analyse", TodoStatus::Completed)]);
        session.messages.push(ChatMessage::user("go"));
        session.record_llm_call();
        session
    }

    #[test]
    fn test_session_creation() {
        let session = Session::new("test_session", "Test task");
        assert_eq!(session.metadata.id, "test_session");
        assert_eq!(session.metadata.task, "Test task");
        assert_eq!(session.metadata.status, SessionStatus::Active);
        assert!(session.files.is_empty());
        assert!(session.scratch_pad.is_empty());
    }

    #[test]
    fn test_generated_ids_differ() {
        assert_ne!(Session::generate_id(), Session::generate_id());
    }

    #[test]
    fn test_file_backend_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let manager = SessionManager::new(temp_dir.path()).unwrap();
        assert_eq!(manager.backend_name(), "file");

        let session = populated(&manager);
        manager.save_session(&session).unwrap();

        let loaded = manager.load_session(session.id()).unwrap();
        assert_eq!(loaded.files, session.files);
        assert_eq!(loaded.scratch_pad, session.scratch_pad);
        assert_eq!(loaded.todos, session.todos);
        assert_eq!(loaded.messages, session.messages);
        assert_eq!(loaded.metadata.llm_calls, 1);
        assert_eq!(loaded.scratch_pad.entries()[0].path, "components/Price.tsx");

        assert!(temp_dir.path().join(session.id()).join("session.json").is_file());
        assert_eq!(manager.list_sessions().unwrap(), vec![session.id().to_string()]);
    }

    #[test]
    fn test_missing_session() {
        let temp_dir = TempDir::new().unwrap();
        let manager = SessionManager::new(temp_dir.path()).unwrap();

        let err = manager.load_session("nope").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StorageNotFound);
        assert!(!manager.session_exists("nope"));

        let fresh = manager.load_or_create("nope", "task").unwrap();
        assert_eq!(fresh.id(), "nope");
    }

    #[test]
    fn test_rejects_path_like_ids() {
        let temp_dir = TempDir::new().unwrap();
        let manager = SessionManager::new(temp_dir.path()).unwrap();
        let err = manager.load_session("../etc").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_memory_backend() {
        let manager = SessionManager::in_memory();
        assert_eq!(manager.backend_name(), "memory");

        let mut session = populated(&manager);
        session.set_status(SessionStatus::Completed);
        manager.save_session(&session).unwrap();

        let info = manager.get_session_info(session.id()).unwrap();
        assert_eq!(info.status, SessionStatus::Completed);

        let loaded = manager.load_session(session.id()).unwrap();
        assert_eq!(loaded.files.get("components/Price.tsx"), session.files.get("components/Price.tsx"));

        assert!(manager.list_sessions().unwrap().contains(&session.metadata.id));

        manager.delete_session(session.id()).unwrap();
        assert!(manager.load_session(session.id()).is_err());
        assert!(manager.delete_session(session.id()).is_err());
    }
}
