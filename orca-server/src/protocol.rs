//! JSON-RPC 2.0 message types

use orca_core::{Error, ErrorKind};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const JSONRPC_VERSION: &str = "2.0";

pub const INVALID_PARAMS: i64 = -32602;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INTERNAL_ERROR: i64 = -32603;

pub const SOLVE_TOOL: &str = "get_operation_research_problem_answer";
pub const HEALTH_TOOL: &str = "health_check";

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub id: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

impl JsonRpcError {
    /// Map a crate error onto a JSON-RPC error object
    pub fn from_error(err: &Error) -> Self {
        match err.kind() {
            ErrorKind::MethodNotFound => Self {
                code: METHOD_NOT_FOUND,
                message: err.message().to_string(),
            },
            ErrorKind::MalformedRequest | ErrorKind::InvalidArgument => Self {
                code: INVALID_PARAMS,
                message: format!("Invalid params: {}", err.message()),
            },
            _ => Self::internal(err.message()),
        }
    }

    pub fn internal(message: impl std::fmt::Display) -> Self {
        Self {
            code: INTERNAL_ERROR,
            message: format!("Internal error: {}", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: Value,
}

impl JsonRpcResponse {
    pub fn result(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.into(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn error(id: Value, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.into(),
            result: None,
            error: Some(error),
            id,
        }
    }
}

/// `tools/call` parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolCallParams {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arguments: Value,
}

/// Arguments of the solve tool
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SolveArguments {
    #[serde(default)]
    pub user_question: String,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub max_attempts: Option<usize>,
}

/// Descriptions returned by `tools/list`
pub fn tool_list() -> Value {
    json!([
        {
            "name": SOLVE_TOOL,
            "description": "Use the agent to solve the optimization problem",
            "parameters": {
                "user_question": {"type": "string", "description": "The user's question"},
                "model_name": {"type": "string", "description": "LLM model name to use"},
                "max_attempts": {"type": "integer", "description": "Maximum number of attempts"}
            }
        },
        {
            "name": HEALTH_TOOL,
            "description": "Simple health check to verify the server is running",
            "parameters": {}
        }
    ])
}
