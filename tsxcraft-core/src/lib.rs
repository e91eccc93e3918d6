//! # tsxcraft core
//!
//! State and plumbing shared by the styling agents.
//!
//! ## Core Concepts
//! - **Virtual file store**: session-scoped TSX files with paginated reads
//! - **Scratch pad**: diff ledger handed from the analyser to the styling agent
//! - **Todo list**: the orchestrator's plan
//! - **Session**: owns all of the above, persisted through pluggable backends
//! - **Tools**: JSON-schema operations the models call against a session
//! - **Provider**: trait-based LLM communication (OpenAI, Anthropic)
//! - **Models**: friendly names resolved to a connected provider

pub mod error;
pub mod files;
pub mod models;
pub mod provider;
pub mod request;
pub mod scratch_pad;
pub mod session;
pub mod todos;
pub mod tools;

pub use error::{Error, ErrorKind, ErrorStatus, Result};
pub use files::{FileView, VirtualFs, DEFAULT_READ_LIMIT};
pub use models::{ChatModel, ModelRegistry, ModelSpec, TEMPERATURE};
pub use provider::{
    AnthropicProvider, ChatMessage, CompletionRequest, CompletionResponse, FinishReason,
    LlmProvider, OpenAIProvider, ProviderConfig, ProviderError, ProviderType, Role, ToolCall,
    ToolChoice, ToolDefinition, Usage, UsageTracker,
};
pub use request::{FileAction, StylingRequest};
pub use scratch_pad::{DiffCheck, DiffEntry, DiffInput, ScratchPad, WriteMode};
pub use session::{
    FileBackend, MemoryBackend, Session, SessionBackend, SessionManager, SessionMetadata,
    SessionStatus,
};
pub use todos::{Todo, TodoList, TodoStatus};
pub use tools::{Subagent, TaskRequest, ToolName, ToolOutput};
