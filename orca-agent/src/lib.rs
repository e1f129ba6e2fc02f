//! # orca-agent
//!
//! The agent turns an operations-research question into solver code:
//! 1. The LLM formulates a mathematical model of the problem
//! 2. The LLM audits and corrects its own formulation
//! 3. The LLM writes Gurobi code, which is run and repaired until it executes
//! 4. A run without a numeric objective gets an infeasibility diagnosis
//! 5. A run that never executes gets a full rebuild
//!
//! The LLM writes the code, the interpreter checks it.

mod agent;
mod config;
pub mod eval;
pub mod prompts;
mod repair;
pub mod trace;

pub use agent::{Agent, AgentReport};
pub use config::{AgentConfig, RetryBudgets};
pub use eval::{evaluate, load_dataset, DatasetRecord, EvalMode, EvalSummary};
pub use repair::{LoopOutcome, LoopResult, RepairLoop};
pub use trace::{EscalationStage, StageEvent, TraceRecorder};
