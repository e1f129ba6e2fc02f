//! Client configuration
//!
//! Everything the agent needs from the environment is read once into a
//! [`ClientConfig`] and passed explicitly to whoever builds providers or
//! executors.

use crate::error::{Error, Result};

pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_OLLAMA_BASE: &str = "http://localhost:11434";
pub const DEFAULT_INTERPRETER: &str = "python3";
pub const DEFAULT_EXEC_TIMEOUT_SECS: u64 = 600;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 300;

/// How generated code is run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Interpreter binary the code file is handed to
    pub interpreter: String,
    /// Wall-clock limit per execution, `None` for unbounded
    pub timeout_secs: Option<u64>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            interpreter: DEFAULT_INTERPRETER.into(),
            timeout_secs: Some(DEFAULT_EXEC_TIMEOUT_SECS),
        }
    }
}

impl ExecutorConfig {
    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    pub fn with_timeout(mut self, secs: Option<u64>) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Credentials, endpoints and defaults for one process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub openai_api_key: Option<String>,
    pub openai_api_base: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub anthropic_api_base: Option<String>,
    pub gemini_api_key: Option<String>,
    pub gemini_api_base: Option<String>,
    pub ollama_api_base: String,
    pub default_model: String,
    pub http_timeout_secs: u64,
    pub executor: ExecutorConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_api_base: None,
            anthropic_api_key: None,
            anthropic_api_base: None,
            gemini_api_key: None,
            gemini_api_base: None,
            ollama_api_base: DEFAULT_OLLAMA_BASE.into(),
            default_model: DEFAULT_MODEL.into(),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            executor: ExecutorConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let timeout_secs = match get("ORCA_EXEC_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(0) => None,
                Ok(secs) => Some(secs),
                Err(e) => {
                    return Err(Error::config_invalid(format!(
                        "ORCA_EXEC_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                        raw
                    ))
                    .with_operation("ClientConfig::from_lookup")
                    .with_context("key", "ORCA_EXEC_TIMEOUT_SECS")
                    .set_source(e))
                }
            },
            None => defaults.executor.timeout_secs,
        };

        Ok(Self {
            openai_api_key: get("OPENAI_API_KEY"),
            openai_api_base: get("OPENAI_API_BASE"),
            anthropic_api_key: get("CLAUDE_API_KEY").or_else(|| get("ANTHROPIC_API_KEY")),
            anthropic_api_base: get("ANTHROPIC_API_BASE"),
            gemini_api_key: get("GEMINI_API_KEY"),
            gemini_api_base: get("GEMINI_API_BASE"),
            ollama_api_base: get("OLLAMA_API_BASE").unwrap_or(defaults.ollama_api_base),
            default_model: get("DEFAULT_MODEL").unwrap_or(defaults.default_model),
            http_timeout_secs: defaults.http_timeout_secs,
            executor: ExecutorConfig {
                interpreter: get("ORCA_PYTHON").unwrap_or(defaults.executor.interpreter),
                timeout_secs,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.default_model, "gpt-4");
        assert_eq!(config.ollama_api_base, "http://localhost:11434");
        assert_eq!(config.executor.interpreter, "python3");
        assert_eq!(config.executor.timeout_secs, Some(600));
    }

    #[test]
    fn test_reads_keys_and_endpoints() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-1"),
            ("OPENAI_API_BASE", ""),
            ("ANTHROPIC_API_KEY", "sk-ant"),
            ("DEFAULT_MODEL", "claude-3-5-sonnet"),
            ("ORCA_PYTHON", "/opt/venv/bin/python"),
            ("ORCA_EXEC_TIMEOUT_SECS", "0"),
        ]))
        .unwrap();

        assert_eq!(config.openai_api_key.as_deref(), Some("sk-1"));
        assert_eq!(config.openai_api_base, None);
        assert_eq!(config.anthropic_api_key.as_deref(), Some("sk-ant"));
        assert_eq!(config.default_model, "claude-3-5-sonnet");
        assert_eq!(config.executor.interpreter, "/opt/venv/bin/python");
        assert_eq!(config.executor.timeout_secs, None);
    }

    #[test]
    fn test_claude_key_wins_over_anthropic_key() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("CLAUDE_API_KEY", "claude"),
            ("ANTHROPIC_API_KEY", "anthropic"),
        ]))
        .unwrap();
        assert_eq!(config.anthropic_api_key.as_deref(), Some("claude"));
    }

    #[test]
    fn test_bad_timeout_is_config_invalid() {
        let err = ClientConfig::from_lookup(lookup(&[("ORCA_EXEC_TIMEOUT_SECS", "ten")]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
        assert!(err.message().contains("ten"));
    }
}
