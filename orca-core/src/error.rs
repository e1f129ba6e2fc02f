//! Error types for orca-core
//!
//! Re-exports orca-error and adds conveniences for the provider seam.

pub use orca_error::{Error, ErrorKind, ErrorStatus, Result};

/// Create an InferenceFailed error for an empty model reply
pub fn empty_reply(provider: &str, model: impl Into<String>) -> Error {
    Error::inference_failed("No content in response")
        .with_operation("provider::query")
        .with_context("provider", provider.to_string())
        .with_context("model", model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_reply() {
        let err = empty_reply("openai", "gpt-4");
        assert_eq!(err.kind(), ErrorKind::InferenceFailed);
        assert_eq!(err.operation(), "provider::query");
        assert!(err.is_retryable());
    }
}
