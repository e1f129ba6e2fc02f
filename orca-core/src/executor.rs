//! Sandboxed execution of generated code
//!
//! Each code block is written to its own temporary `.py` file and run by the
//! configured interpreter in a separate process. The file is removed when the
//! run ends, whatever the outcome.

use crate::config::ExecutorConfig;
use crate::error::Error;
use crate::extract::extract_code_blocks;
use crate::objective::{extract_objective, ObjectiveResult};
use serde::Serialize;
use std::future::Future;
use std::io::Write;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Result of running one code block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    Success { stdout: String },
    Failure { stderr: String },
}

impl ExecutionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Objective reported by a successful run; `None` for failures
    pub fn objective(&self) -> Option<ObjectiveResult> {
        match self {
            Self::Success { stdout } => Some(extract_objective(stdout)),
            Self::Failure { .. } => None,
        }
    }

    fn from_error(err: Error) -> Self {
        Self::Failure {
            stderr: err.message().to_string(),
        }
    }
}

/// Runs one block of generated code
pub trait CodeRunner: Send + Sync {
    fn run(&self, code: &str) -> impl Future<Output = ExecutionOutcome> + Send;
}

/// Extract the code blocks of a model response and run the first one.
///
/// A response without code is reported as a failure so the caller can ask
/// the model to try again.
pub async fn run_response<R: CodeRunner>(runner: &R, response: &str) -> ExecutionOutcome {
    let blocks = extract_code_blocks(response);
    match blocks.first() {
        Some(code) => {
            if blocks.len() > 1 {
                debug!(blocks = blocks.len(), "running first of several code blocks");
            }
            runner.run(code).await
        }
        None => ExecutionOutcome::from_error(Error::no_code_blocks()),
    }
}

/// Runs code with a local Python interpreter
#[derive(Debug, Clone)]
pub struct PythonExecutor {
    interpreter: String,
    timeout: Option<Duration>,
}

impl PythonExecutor {
    pub fn new(config: &ExecutorConfig) -> Self {
        Self {
            interpreter: config.interpreter.clone(),
            timeout: config.timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn interpreter(&self) -> &str {
        &self.interpreter
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Run an existing script file and classify the result by exit status.
    pub async fn run_file(&self, path: &Path) -> ExecutionOutcome {
        let mut command = Command::new(&self.interpreter);
        command
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(interpreter = %self.interpreter, error = %e, "failed to start interpreter");
                return ExecutionOutcome::from_error(
                    Error::execution_failed(format!(
                        "failed to start interpreter '{}': {}",
                        self.interpreter, e
                    ))
                    .with_operation("PythonExecutor::run_file")
                    .set_source(e),
                );
            }
        };

        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(output) => output,
                Err(_) => {
                    // Dropping the wait future drops the child, which kills it.
                    warn!(secs = limit.as_secs(), "execution timed out");
                    return ExecutionOutcome::from_error(Error::execution_timeout(limit.as_secs()));
                }
            },
            None => child.wait_with_output().await,
        };

        match output {
            Ok(output) if output.status.success() => ExecutionOutcome::Success {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            },
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
                debug!(status = %output.status, "execution failed");
                ExecutionOutcome::Failure { stderr }
            }
            Err(e) => ExecutionOutcome::from_error(
                Error::execution_failed(format!("failed to collect process output: {}", e))
                    .set_source(e),
            ),
        }
    }
}

impl CodeRunner for PythonExecutor {
    async fn run(&self, code: &str) -> ExecutionOutcome {
        let file = tempfile::Builder::new()
            .prefix("orca-")
            .suffix(".py")
            .tempfile()
            .and_then(|mut file| {
                file.write_all(code.as_bytes())?;
                file.flush()?;
                Ok(file)
            });

        let path = match file {
            Ok(file) => file.into_temp_path(),
            Err(e) => {
                return ExecutionOutcome::from_error(
                    Error::execution_failed(format!("failed to write code file: {}", e))
                        .set_source(e),
                )
            }
        };

        // The file lives until `path` is dropped at the end of this scope.
        self.run_file(&path).await
    }
}
