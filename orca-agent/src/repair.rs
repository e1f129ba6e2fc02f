//! Generate-run-repair loop
//!
//! The model is queried for code, the first code block of the reply is run,
//! and on failure the error text is fed back for another attempt. Repairs
//! accumulate on a working copy of the conversation; the caller's
//! conversation only gains the final generation.

use crate::prompts;
use crate::trace::{EscalationStage, StageEvent, TraceRecorder};
use orca_core::error::Result;
use orca_core::provider::{exchange, ChatMessage, FinishReason, LlmProvider};
use orca_core::{run_response, CodeRunner, ExecutionOutcome, ObjectiveResult};
use tracing::{debug, info, warn};

/// How a repair loop ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoopOutcome {
    /// Code ran to completion; the objective may still be non-numeric
    Solved(ObjectiveResult),
    /// Every attempt failed
    Exhausted,
}

impl LoopOutcome {
    pub fn is_solved(&self) -> bool {
        matches!(self, Self::Solved(_))
    }

    pub fn objective(&self) -> Option<ObjectiveResult> {
        match self {
            Self::Solved(objective) => Some(*objective),
            Self::Exhausted => None,
        }
    }
}

/// Everything a finished loop hands back
#[derive(Debug, Clone)]
pub struct LoopResult {
    pub outcome: LoopOutcome,
    /// Caller's conversation plus the final generation
    pub conversation: Vec<ChatMessage>,
    /// Conversation including every failed attempt and repair request
    pub working: Vec<ChatMessage>,
    /// Number of executions performed
    pub attempts: usize,
}

/// Drives the loop for one stage
pub struct RepairLoop<'a, P, R> {
    provider: &'a P,
    runner: &'a R,
    temperature: f32,
    stage: EscalationStage,
}

impl<'a, P: LlmProvider, R: CodeRunner> RepairLoop<'a, P, R> {
    pub fn new(provider: &'a P, runner: &'a R, temperature: f32, stage: EscalationStage) -> Self {
        Self {
            provider,
            runner,
            temperature,
            stage,
        }
    }

    /// Run at most `max_attempts` generate-then-execute cycles.
    ///
    /// Provider errors abort the loop. With a zero budget the loop ends
    /// exhausted without querying the model.
    pub async fn run(
        &self,
        mut conversation: Vec<ChatMessage>,
        max_attempts: usize,
        recorder: &mut TraceRecorder,
    ) -> Result<LoopResult> {
        let mut working = conversation.clone();
        if max_attempts == 0 {
            warn!(stage = %self.stage, "no attempts budgeted");
            return Ok(LoopResult {
                outcome: LoopOutcome::Exhausted,
                conversation,
                working,
                attempts: 0,
            });
        }

        let (mut generation, mut finish_reason) = self.generate(&working, recorder).await?;

        for attempt in 0..max_attempts {
            recorder.record(StageEvent::Generation {
                stage: self.stage,
                attempt,
                text: generation.clone(),
                finish_reason,
            });

            let outcome = run_response(self.runner, &generation).await;
            recorder.record(StageEvent::Execution {
                stage: self.stage,
                attempt,
                outcome: outcome.clone(),
            });

            match &outcome {
                ExecutionOutcome::Success { .. } => {
                    let objective = outcome.objective().unwrap_or(ObjectiveResult::Unparsed);
                    info!(stage = %self.stage, attempt, %objective, "code executed");
                    conversation.push(ChatMessage::assistant(generation));
                    return Ok(LoopResult {
                        outcome: LoopOutcome::Solved(objective),
                        conversation,
                        working,
                        attempts: attempt + 1,
                    });
                }
                ExecutionOutcome::Failure { stderr } => {
                    warn!(stage = %self.stage, attempt, "attempt failed");
                    debug!(%stderr, "execution error");
                    working.push(ChatMessage::assistant(generation.clone()));

                    if attempt + 1 == max_attempts {
                        break;
                    }

                    working.push(ChatMessage::user(prompts::repair(stderr)));
                    (generation, finish_reason) = self.generate(&working, recorder).await?;
                }
            }
        }

        warn!(stage = %self.stage, max_attempts, "attempts exhausted");
        conversation.push(ChatMessage::assistant(generation));
        Ok(LoopResult {
            outcome: LoopOutcome::Exhausted,
            conversation,
            working,
            attempts: max_attempts,
        })
    }

    /// Query the model for code. A reply without text is an empty generation,
    /// which fails to run like any reply without a code block.
    async fn generate(
        &self,
        conversation: &[ChatMessage],
        recorder: &mut TraceRecorder,
    ) -> Result<(String, FinishReason)> {
        let reply = exchange(self.provider, conversation, self.temperature)
            .await
            .map_err(|e| e.with_context("stage", self.stage.as_str()))?;
        recorder.track(&reply.usage);

        let text = reply.text.unwrap_or_else(|| {
            warn!(stage = %self.stage, finish_reason = ?reply.finish_reason, "empty reply");
            String::new()
        });
        debug!(
            stage = %self.stage,
            chars = text.len(),
            finish_reason = ?reply.finish_reason,
            "received generation"
        );
        Ok((text, reply.finish_reason))
    }
}
