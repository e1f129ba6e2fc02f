//! HTTP handlers

use crate::protocol::{
    tool_list, JsonRpcError, JsonRpcRequest, JsonRpcResponse, SolveArguments, ToolCallParams,
    HEALTH_TOOL, SOLVE_TOOL,
};
use crate::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use orca_agent::{Agent, AgentConfig};
use orca_core::{AnyProvider, Error, ErrorKind, PythonExecutor, Result};
use serde_json::{json, Value};
use tracing::{error, info};

pub const SERVER_NAME: &str = "orca";
pub const HEALTH_MESSAGE: &str = "orca server is running and healthy!";

const DEFAULT_MAX_ATTEMPTS: usize = 3;

pub async fn banner() -> String {
    format!("{} server is running. Use JSON-RPC for API calls.", SERVER_NAME)
}

pub async fn health() -> &'static str {
    HEALTH_MESSAGE
}

/// JSON-RPC entry point shared by `POST /` and `POST /tools/call`
pub async fn jsonrpc(State(state): State<AppState>, body: Bytes) -> Json<JsonRpcResponse> {
    let request: JsonRpcRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            error!(error = %e, "unparsable request");
            return Json(JsonRpcResponse::error(json!(0), JsonRpcError::internal(e)));
        }
    };

    let id = request.id.clone();
    let response = match dispatch(&state, request).await {
        Ok(result) => JsonRpcResponse::result(id, result),
        Err(e) => JsonRpcResponse::error(id, JsonRpcError::from_error(&e)),
    };
    Json(response)
}

async fn dispatch(state: &AppState, request: JsonRpcRequest) -> Result<Value> {
    let method = request.method.unwrap_or_default();
    match method.as_str() {
        "ping" => Ok(json!("pong")),
        "tools/list" => Ok(tool_list()),
        "tools/call" => {
            let params: ToolCallParams = parse_params(request.params)?;
            let name = params.name.unwrap_or_default();
            match name.as_str() {
                SOLVE_TOOL => {
                    let args: SolveArguments = parse_params(params.arguments)?;
                    solve_tool(state, args).await
                }
                HEALTH_TOOL => Ok(json!(HEALTH_MESSAGE)),
                _ => Err(Error::method_not_found(name)),
            }
        }
        _ => Err(Error::method_not_found(method)),
    }
}

fn parse_params<T: serde::de::DeserializeOwned + Default>(params: Value) -> Result<T> {
    if params.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(params).map_err(|e| {
        Error::malformed_request(e.to_string())
            .with_operation("server::parse_params")
            .set_source(e)
    })
}

async fn solve_tool(state: &AppState, args: SolveArguments) -> Result<Value> {
    if args.user_question.trim().is_empty() {
        return Err(Error::malformed_request("user_question is required"));
    }

    let model = args
        .model_name
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| state.client.default_model.clone());
    let max_attempts = args.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS);
    let preview: String = args.user_question.chars().take(50).collect();
    info!(%model, max_attempts, "processing problem: {}...", preview);

    let run = async {
        let provider = AnyProvider::for_model(&state.client, &model)?;
        let agent = Agent::new(
            provider,
            PythonExecutor::new(&state.client.executor),
            AgentConfig::for_model(model.clone()).with_max_attempts(max_attempts),
        );
        agent.solve(&args.user_question).await
    };

    match run.await {
        Ok(report) => {
            info!(success = report.success, "problem processed");
            Ok(json!({
                "success": report.success,
                "objective": report.value(),
                "answer": report.render(),
                "trace": report.trace,
            }))
        }
        Err(e) => {
            error!(error = %e, "agent run failed");
            Ok(json!({
                "success": false,
                "error": friendly_error(&e, &model),
            }))
        }
    }
}

/// Rewrite a failed run into advice the caller can act on.
pub fn friendly_error(err: &Error, model: &str) -> String {
    let message = err.message();
    if message.contains("API key") || err.kind() == ErrorKind::AuthenticationFailed {
        "Error: Invalid API key. Please check your .env file and ensure the API key is correctly set."
            .to_string()
    } else if message.contains("model_not_found")
        || message.contains("does not exist")
        || err.kind() == ErrorKind::ModelNotFound
    {
        format!(
            "Error: Model '{}' not found or you don't have access to it. Try using a different model.",
            model
        )
    } else if message.contains("quota")
        || message.contains("exceeded")
        || err.kind() == ErrorKind::RateLimited
    {
        "Error: API rate limit exceeded or insufficient quota. Please check your billing details or try again later."
            .to_string()
    } else {
        format!("Error processing the optimization problem: {}", message)
    }
}
