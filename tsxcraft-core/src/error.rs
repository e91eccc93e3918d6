//! tsxcraft-core error helpers
//!
//! Re-exports tsxcraft-error and provides store- and harness-specific conveniences.

pub use tsxcraft_error::{Error, ErrorKind, ErrorStatus, Result};

// =============================================================================
// Store constructors
// =============================================================================

/// Create a FileNotFound error
pub fn file_not_found(path: impl Into<String>) -> Error {
    Error::file_not_found(path)
}

/// Create an OffsetOutOfRange error
pub fn offset_out_of_range(offset: usize, line_count: usize) -> Error {
    Error::offset_out_of_range(offset, line_count)
}

/// Create an InvalidArgument error
pub fn invalid_argument(message: impl Into<String>) -> Error {
    Error::invalid_argument(message)
}

// =============================================================================
// Tool constructors
// =============================================================================

/// Create a ToolUnknown error
pub fn tool_unknown(name: impl Into<String>) -> Error {
    Error::tool_unknown(name)
}

/// Create a ToolArgumentsInvalid error
pub fn tool_arguments_invalid(tool: impl Into<String>, reason: impl Into<String>) -> Error {
    let tool = tool.into();
    Error::new(
        ErrorKind::ToolArgumentsInvalid,
        format!("invalid arguments for '{}': {}", tool, reason.into()),
    )
    .with_context("tool", tool)
}

/// Create a SubagentUnknown error
pub fn subagent_unknown(name: impl Into<String>) -> Error {
    let name = name.into();
    Error::new(ErrorKind::SubagentUnknown, format!("unknown subagent '{}'", name))
        .with_context("subagent", name)
}

// =============================================================================
// Model / provider constructors
// =============================================================================

/// Create a ModelUnknown error
pub fn model_unknown(name: impl Into<String>, message: impl Into<String>) -> Error {
    Error::model_unknown(name, message)
}

/// Create a ConfigInvalid error
pub fn config_invalid(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::ConfigInvalid, message)
}

/// Create a ProviderUnavailable error
pub fn provider_unavailable(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::ProviderUnavailable, message)
}

/// Create an InferenceFailed error
pub fn inference_failed(reason: impl Into<String>) -> Error {
    Error::inference_failed(reason)
}

/// Create a StepLimitExceeded error
pub fn step_limit_exceeded(role: impl Into<String>, max: usize) -> Error {
    Error::new(
        ErrorKind::StepLimitExceeded,
        format!("agent did not finish within {} steps", max),
    )
    .with_context("role", role)
    .with_context("max_steps", max.to_string())
}

// =============================================================================
// Storage constructors
// =============================================================================

/// Create an IoError error
pub fn io_error(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::IoFailed, message)
}

/// Create a SerializationError error
pub fn serialization_error(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::SerializationFailed, message)
}

/// Create a ParseError error
pub fn parse_error(message: impl Into<String>) -> Error {
    Error::parse_failed(message)
}

/// Create a StorageNotFound error
pub fn storage_not_found(key: impl Into<String>) -> Error {
    let key = key.into();
    Error::new(ErrorKind::StorageNotFound, format!("session '{}' not found", key))
        .with_context("session", key)
}

/// Create a StorageFailed error
pub fn storage_failed(reason: impl Into<String>) -> Error {
    Error::new(ErrorKind::StorageFailed, reason)
}
