//! # orca-core
//!
//! Building blocks of the operations-research code agent.
//!
//! ## Core Concepts
//! - **Provider**: Trait-based LLM communication (OpenAI-compatible, Anthropic, Gemini, Ollama)
//! - **Extract**: Fenced `python` blocks pulled out of a model reply
//! - **Executor**: Generated code run in a separate interpreter process
//! - **Objective**: Objective value read from solver output
//! - **Judge**: Run results scored against a reference answer

pub mod config;
pub mod error;
pub mod executor;
pub mod extract;
pub mod judge;
pub mod objective;
pub mod provider;

pub use config::{ClientConfig, ExecutorConfig};
pub use error::{Error, ErrorKind, ErrorStatus, Result};
pub use executor::{run_response, CodeRunner, ExecutionOutcome, PythonExecutor};
pub use extract::extract_code_blocks;
pub use judge::{is_number_string, judge, judge_with_tolerance, Verdict, DEFAULT_TOLERANCE};
pub use objective::{extract_objective, ObjectiveResult};
pub use provider::{
    exchange, query, AnthropicProvider, AnyProvider, ChatMessage, CompletionRequest,
    CompletionResponse, FinishReason, GeminiProvider, LlmProvider, OllamaProvider, OpenAIProvider,
    ProviderConfig, ProviderError, ProviderSelector, ProviderType, Reply, Role, Usage,
    UsageTracker, DEFAULT_TEMPERATURE,
};
