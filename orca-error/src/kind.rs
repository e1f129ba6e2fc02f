//! Error kinds for orca operations

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

    /// The requested feature or operation is not supported
    Unsupported,

    /// Invalid configuration or parameters
    ConfigInvalid,

    /// Invalid argument passed to function
    InvalidArgument,

    // =========================================================================
    // Code generation / execution errors
    // =========================================================================
    /// Model response contained no fenced python code
    NoCodeBlocks,

    /// Generated code exited with a non-zero status
    ExecutionFailed,

    /// Generated code ran past the configured execution timeout
    ExecutionTimeout,

    /// The repair loop spent its whole budget without a clean run
    AttemptsExhausted,

    // =========================================================================
    // Inference/LLM errors
    // =========================================================================
    /// LLM inference failed
    InferenceFailed,

    /// Provider not available
    ProviderUnavailable,

    /// Rate limit or quota exceeded
    RateLimited,

    /// Missing or rejected API key
    AuthenticationFailed,

    /// Model does not exist or is not accessible
    ModelNotFound,

    // =========================================================================
    // JSON-RPC errors
    // =========================================================================
    /// Request body is not a valid JSON-RPC request
    MalformedRequest,

    /// Unknown JSON-RPC method or tool name
    MethodNotFound,

    // =========================================================================
    // IO errors
    // =========================================================================
    /// File not found
    FileNotFound,

    /// Permission denied
    PermissionDenied,

    /// IO operation failed
    IoFailed,

    /// Network error
    NetworkFailed,

    // =========================================================================
    // Parse errors
    // =========================================================================
    /// Failed to parse input
    ParseFailed,

    /// Serialization/deserialization failed
    SerializationFailed,
}

impl ErrorKind {
    /// Returns the error kind as a static string
    pub fn as_str(&self) -> &'static str {
        match self {
            // General
            ErrorKind::Unexpected => "Unexpected",
            ErrorKind::Unsupported => "Unsupported",
            ErrorKind::ConfigInvalid => "ConfigInvalid",
            ErrorKind::InvalidArgument => "InvalidArgument",

            // Code generation / execution
            ErrorKind::NoCodeBlocks => "NoCodeBlocks",
            ErrorKind::ExecutionFailed => "ExecutionFailed",
            ErrorKind::ExecutionTimeout => "ExecutionTimeout",
            ErrorKind::AttemptsExhausted => "AttemptsExhausted",

            // Inference
            ErrorKind::InferenceFailed => "InferenceFailed",
            ErrorKind::ProviderUnavailable => "ProviderUnavailable",
            ErrorKind::RateLimited => "RateLimited",
            ErrorKind::AuthenticationFailed => "AuthenticationFailed",
            ErrorKind::ModelNotFound => "ModelNotFound",

            // JSON-RPC
            ErrorKind::MalformedRequest => "MalformedRequest",
            ErrorKind::MethodNotFound => "MethodNotFound",

            // IO
            ErrorKind::FileNotFound => "FileNotFound",
            ErrorKind::PermissionDenied => "PermissionDenied",
            ErrorKind::IoFailed => "IoFailed",
            ErrorKind::NetworkFailed => "NetworkFailed",

            // Parse
            ErrorKind::ParseFailed => "ParseFailed",
            ErrorKind::SerializationFailed => "SerializationFailed",
        }
    }

    /// Check if this error kind is retryable by default
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorKind::InferenceFailed
                | ErrorKind::NetworkFailed
                | ErrorKind::RateLimited
                | ErrorKind::ProviderUnavailable
        )
    }

    /// Failures the repair loop absorbs by asking the model for a fix
    pub fn is_repairable(&self) -> bool {
        matches!(
            self,
            ErrorKind::NoCodeBlocks | ErrorKind::ExecutionFailed | ErrorKind::ExecutionTimeout
        )
    }

    /// Errors that originate at the model provider seam
    pub fn is_provider(&self) -> bool {
        matches!(
            self,
            ErrorKind::InferenceFailed
                | ErrorKind::ProviderUnavailable
                | ErrorKind::RateLimited
                | ErrorKind::AuthenticationFailed
                | ErrorKind::ModelNotFound
                | ErrorKind::NetworkFailed
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
