//! Error kinds for tsxcraft operations

use std::fmt;

/// The kind of error that occurred.
///
/// This enum categorizes errors to help users write clear error handling logic.
/// Users can match on ErrorKind to decide how to handle specific error cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    // =========================================================================
    // General errors
    // =========================================================================
    /// An unexpected error occurred - catch-all for unhandled cases
    Unexpected,

    /// Invalid configuration or parameters
    ConfigInvalid,

    /// Invalid argument passed to function
    InvalidArgument,

    // =========================================================================
    // Virtual file store errors
    // =========================================================================
    /// The requested path is not in the virtual file store
    FileNotFound,

    /// Read offset is at or past the end of the file
    OffsetOutOfRange,

    // =========================================================================
    // Tool errors
    // =========================================================================
    /// The model asked for a tool that does not exist for its role
    ToolUnknown,

    /// Tool arguments did not match the tool's schema
    ToolArgumentsInvalid,

    /// The requested sub-agent does not exist
    SubagentUnknown,

    // =========================================================================
    // Inference/LLM errors
    // =========================================================================
    /// Model name is not in the registry
    ModelUnknown,

    /// LLM inference failed
    InferenceFailed,

    /// Provider not available (missing key, client setup failed)
    ProviderUnavailable,

    /// Rate limit exceeded
    RateLimited,

    /// The agent loop ran out of steps
    StepLimitExceeded,

    // =========================================================================
    // Session storage errors
    // =========================================================================
    /// Session not found
    StorageNotFound,

    /// Storage operation failed
    StorageFailed,

    /// Serialization/deserialization failed
    SerializationFailed,

    // =========================================================================
    // IO errors
    // =========================================================================
    /// IO operation failed
    IoFailed,

    /// Permission denied
    PermissionDenied,

    /// Network error
    NetworkFailed,

    // =========================================================================
    // Parse errors
    // =========================================================================
    /// Failed to parse input
    ParseFailed,
}

impl ErrorKind {
    /// Returns the error kind as a static string
    pub fn as_str(&self) -> &'static str {
        match self {
            // General
            ErrorKind::Unexpected => "Unexpected",
            ErrorKind::ConfigInvalid => "ConfigInvalid",
            ErrorKind::InvalidArgument => "InvalidArgument",

            // Files
            ErrorKind::FileNotFound => "FileNotFound",
            ErrorKind::OffsetOutOfRange => "OffsetOutOfRange",

            // Tools
            ErrorKind::ToolUnknown => "ToolUnknown",
            ErrorKind::ToolArgumentsInvalid => "ToolArgumentsInvalid",
            ErrorKind::SubagentUnknown => "SubagentUnknown",

            // Inference
            ErrorKind::ModelUnknown => "ModelUnknown",
            ErrorKind::InferenceFailed => "InferenceFailed",
            ErrorKind::ProviderUnavailable => "ProviderUnavailable",
            ErrorKind::RateLimited => "RateLimited",
            ErrorKind::StepLimitExceeded => "StepLimitExceeded",

            // Storage
            ErrorKind::StorageNotFound => "StorageNotFound",
            ErrorKind::StorageFailed => "StorageFailed",
            ErrorKind::SerializationFailed => "SerializationFailed",

            // IO
            ErrorKind::IoFailed => "IoFailed",
            ErrorKind::PermissionDenied => "PermissionDenied",
            ErrorKind::NetworkFailed => "NetworkFailed",

            // Parse
            ErrorKind::ParseFailed => "ParseFailed",
        }
    }

    /// Check if this error kind is retryable by default
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorKind::InferenceFailed | ErrorKind::NetworkFailed | ErrorKind::RateLimited
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::FileNotFound.to_string(), "FileNotFound");
        assert_eq!(ErrorKind::OffsetOutOfRange.to_string(), "OffsetOutOfRange");
    }

    #[test]
    fn test_is_retryable() {
        assert!(ErrorKind::NetworkFailed.is_retryable());
        assert!(ErrorKind::RateLimited.is_retryable());
        assert!(!ErrorKind::FileNotFound.is_retryable());
        assert!(!ErrorKind::ModelUnknown.is_retryable());
    }
}
