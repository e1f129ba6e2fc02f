//! Agent implementation - orchestrates the formulate, code and repair stages

use crate::config::AgentConfig;
use crate::prompts;
use crate::repair::{LoopOutcome, LoopResult, RepairLoop};
use crate::trace::{render, EscalationStage, StageEvent, TraceRecorder};
use orca_core::error::Result;
use orca_core::provider::{exchange, query, ChatMessage, LlmProvider, UsageTracker};
use orca_core::{run_response, CodeRunner, ObjectiveResult};
use serde::Serialize;
use tracing::{info, warn};

/// Result from an agent run
#[derive(Debug, Clone, Serialize)]
pub struct AgentReport {
    /// The code of the last stage that ran executed successfully
    pub success: bool,
    /// Objective of the last successful execution
    pub objective: Option<ObjectiveResult>,
    /// Last stage that ran
    pub final_stage: EscalationStage,
    pub trace: Vec<StageEvent>,
    pub usage: UsageTracker,
}

impl AgentReport {
    /// Result in the form the judge compares: the number, or `None`.
    pub fn result_text(&self) -> String {
        match self.objective {
            Some(objective) if self.success => objective.to_string(),
            _ => "None".to_string(),
        }
    }

    /// Numeric objective, if the run produced one
    pub fn value(&self) -> Option<f64> {
        self.objective.and_then(|o| o.value())
    }

    /// Human-readable account of the run
    pub fn render(&self) -> String {
        let mut out = render(&self.trace);
        if self.success {
            out.push_str(&format!(
                "Successfully executed code, optimal solution value: {}\n",
                self.result_text()
            ));
        } else {
            out.push_str("Failed to execute code.\n");
        }
        out
    }
}

/// The agent orchestrator
///
/// Owns a provider and a code runner; each call to [`Agent::solve`] works on
/// its own conversation.
pub struct Agent<P, R> {
    provider: P,
    runner: R,
    config: AgentConfig,
}

impl<P: LlmProvider, R: CodeRunner> Agent<P, R> {
    pub fn new(provider: P, runner: R, config: AgentConfig) -> Self {
        Self {
            provider,
            runner,
            config,
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Solve a problem with the staged pipeline.
    ///
    /// Stage 1 formulates, audits and generates code. A run without a numeric
    /// objective moves on to the infeasibility repair; a first stage that ran
    /// out of attempts moves on to the syntax rebuild. At most one of the two
    /// follow-up stages runs and its result replaces the first one.
    pub async fn solve(&self, question: &str) -> Result<AgentReport> {
        let mut recorder = TraceRecorder::new();
        let budgets = self.config.budgets;

        info!(model = %self.config.model, "stage {}", EscalationStage::InitialModel);
        recorder.record(StageEvent::StageStarted {
            stage: EscalationStage::InitialModel,
        });

        let mut conversation = vec![
            ChatMessage::system(prompts::FORMULATION_SYSTEM),
            ChatMessage::user(question),
        ];

        let formulation = self.ask(&conversation, &mut recorder).await?;
        recorder.record(StageEvent::Formulation {
            text: formulation.clone(),
        });
        conversation.push(ChatMessage::assistant(formulation));
        conversation.push(ChatMessage::user(prompts::AUDIT));

        let audited = self.ask(&conversation, &mut recorder).await?;
        recorder.record(StageEvent::AuditedFormulation {
            text: audited.clone(),
        });
        conversation.push(ChatMessage::assistant(audited));
        conversation.push(ChatMessage::user(prompts::CODE_GENERATION));

        let first = self
            .stage(EscalationStage::InitialModel, conversation, budgets.initial, &mut recorder)
            .await?;

        let (stage, instruction, budget) = match first.outcome {
            LoopOutcome::Solved(objective) if objective.is_numeric() => {
                return Ok(self.report(EscalationStage::InitialModel, &first, recorder));
            }
            LoopOutcome::Solved(_) => {
                warn!("no numeric objective, diagnosing infeasibility");
                (
                    EscalationStage::InfeasibilityRepair,
                    prompts::INFEASIBILITY_REPAIR,
                    budgets.infeasibility,
                )
            }
            LoopOutcome::Exhausted => {
                warn!("attempts exhausted, rebuilding code");
                (EscalationStage::SyntaxRepair, prompts::SYNTAX_REBUILD, budgets.syntax)
            }
        };

        recorder.record(StageEvent::StageStarted { stage });
        let mut conversation = first.conversation;
        conversation.push(ChatMessage::user(instruction));

        let last = self.stage(stage, conversation, budget, &mut recorder).await?;
        Ok(self.report(stage, &last, recorder))
    }

    /// Single-shot variant: one generation, one execution, no repair.
    pub async fn solve_simple(&self, question: &str) -> Result<AgentReport> {
        let mut recorder = TraceRecorder::new();
        let stage = EscalationStage::InitialModel;
        recorder.record(StageEvent::StageStarted { stage });

        let conversation = vec![
            ChatMessage::system(prompts::SIMPLE_SYSTEM),
            ChatMessage::user(question),
        ];
        let reply = exchange(&self.provider, &conversation, self.config.temperature).await?;
        recorder.track(&reply.usage);
        let generation = reply.text.unwrap_or_default();
        recorder.record(StageEvent::Generation {
            stage,
            attempt: 0,
            text: generation.clone(),
            finish_reason: reply.finish_reason,
        });

        let outcome = run_response(&self.runner, &generation).await;
        let success = outcome.is_success();
        let objective = outcome.objective();
        recorder.record(StageEvent::Execution {
            stage,
            attempt: 0,
            outcome,
        });
        recorder.record(StageEvent::StageFinished {
            stage,
            success,
            objective,
        });
        info!(success, "simple run finished");

        let (trace, usage) = recorder.into_parts();
        Ok(AgentReport {
            success,
            objective,
            final_stage: stage,
            trace,
            usage,
        })
    }

    async fn ask(&self, conversation: &[ChatMessage], recorder: &mut TraceRecorder) -> Result<String> {
        let (text, usage) = query(&self.provider, conversation, self.config.temperature).await?;
        recorder.track(&usage);
        Ok(text)
    }

    async fn stage(
        &self,
        stage: EscalationStage,
        conversation: Vec<ChatMessage>,
        budget: usize,
        recorder: &mut TraceRecorder,
    ) -> Result<LoopResult> {
        let result = RepairLoop::new(&self.provider, &self.runner, self.config.temperature, stage)
            .run(conversation, budget, recorder)
            .await?;

        let objective = result.outcome.objective();
        recorder.record(StageEvent::StageFinished {
            stage,
            success: result.outcome.is_solved(),
            objective,
        });
        info!(%stage, solved = result.outcome.is_solved(), attempts = result.attempts, "stage finished");
        Ok(result)
    }

    fn report(&self, stage: EscalationStage, result: &LoopResult, recorder: TraceRecorder) -> AgentReport {
        let (trace, usage) = recorder.into_parts();
        AgentReport {
            success: result.outcome.is_solved(),
            objective: result.outcome.objective(),
            final_stage: stage,
            trace,
            usage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryBudgets;
    use crate::repair::testing::*;
    use orca_core::provider::{FinishReason, ProviderError, Role};
    use orca_core::ErrorKind;

    fn agent(
        replies: Vec<String>,
        outcomes: Vec<orca_core::ExecutionOutcome>,
    ) -> Agent<ScriptedProvider, ScriptedRunner> {
        Agent::new(
            ScriptedProvider::new(replies),
            ScriptedRunner::new(outcomes),
            AgentConfig::default(),
        )
    }

    fn started_stages(report: &AgentReport) -> Vec<EscalationStage> {
        report
            .trace
            .iter()
            .filter_map(|e| match e {
                StageEvent::StageStarted { stage } => Some(*stage),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_numeric_first_stage_stops() {
        let agent = agent(
            vec!["model".into(), "audited".into(), code("solve()")],
            vec![ok("Best objective 45.0")],
        );
        let report = agent.solve("maximize profit").await.unwrap();

        assert!(report.success);
        assert_eq!(report.value(), Some(45.0));
        assert_eq!(report.result_text(), "45.0");
        assert_eq!(report.final_stage, EscalationStage::InitialModel);
        assert_eq!(started_stages(&report), vec![EscalationStage::InitialModel]);
        assert_eq!(report.usage.total_calls, 3);

        // formulation, audit and code generation see a growing conversation
        let seen = agent.provider().seen.lock().unwrap();
        assert_eq!(seen[0].len(), 2);
        assert_eq!(seen[1].len(), 4);
        assert_eq!(seen[1][3].content, prompts::AUDIT);
        assert_eq!(seen[2].len(), 6);
        assert_eq!(seen[2][5].content, prompts::CODE_GENERATION);
    }

    #[tokio::test]
    async fn test_solved_without_number_goes_to_infeasibility_repair() {
        let agent = agent(
            vec![
                "model".into(),
                "audited".into(),
                code("infeasible()"),
                code("diagnosed()"),
            ],
            vec![ok("Model is infeasible"), ok("Best objective 12.5")],
        );
        let report = agent.solve("q").await.unwrap();

        assert_eq!(
            started_stages(&report),
            vec![EscalationStage::InitialModel, EscalationStage::InfeasibilityRepair]
        );
        assert_eq!(report.final_stage, EscalationStage::InfeasibilityRepair);
        assert_eq!(report.value(), Some(12.5));

        let seen = agent.provider().seen.lock().unwrap();
        let last = seen.last().unwrap();
        assert_eq!(last[6].role, Role::Assistant);
        assert_eq!(last[6].content, code("infeasible()"));
        assert_eq!(last[7].content, prompts::INFEASIBILITY_REPAIR);
    }

    #[tokio::test]
    async fn test_infeasibility_repair_result_supersedes() {
        let agent = agent(
            vec![
                "model".into(),
                "audited".into(),
                code("a()"),
                code("b()"),
            ],
            vec![ok("no objective printed"), fail("still broken")],
        );
        let report = agent.solve("q").await.unwrap();

        assert!(!report.success);
        assert_eq!(report.objective, None);
        assert_eq!(report.result_text(), "None");
        // budget of one: no repair query after the failure
        assert_eq!(agent.provider().calls(), 4);
    }

    #[tokio::test]
    async fn test_exhausted_first_stage_goes_to_syntax_repair() {
        let agent = agent(
            vec![
                "model".into(),
                "audited".into(),
                code("e1"),
                code("e2"),
                code("e3"),
                code("rebuilt"),
            ],
            vec![fail("x"), fail("y"), fail("z"), ok("Optimal objective 9")],
        );
        let report = agent.solve("q").await.unwrap();

        assert_eq!(
            started_stages(&report),
            vec![EscalationStage::InitialModel, EscalationStage::SyntaxRepair]
        );
        assert!(report.success);
        assert_eq!(report.value(), Some(9.0));

        // the rebuild request follows the last failed generation
        let seen = agent.provider().seen.lock().unwrap();
        let last = seen.last().unwrap();
        assert_eq!(last.len(), 8);
        assert_eq!(last[6].content, code("e3"));
        assert_eq!(last[7].content, prompts::SYNTAX_REBUILD);
    }

    #[tokio::test]
    async fn test_custom_budgets() {
        let agent = Agent::new(
            ScriptedProvider::new(vec![
                "model".to_string(),
                "audited".into(),
                code("e1"),
            ]),
            ScriptedRunner::new(vec![fail("x")]),
            AgentConfig::default().with_budgets(RetryBudgets {
                initial: 1,
                infeasibility: 1,
                syntax: 0,
            }),
        );
        let report = agent.solve("q").await.unwrap();

        assert!(!report.success);
        assert_eq!(report.final_stage, EscalationStage::SyntaxRepair);
        assert_eq!(agent.provider().calls(), 3);
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let agent = Agent::new(
            ScriptedProvider::failing(ProviderError::ModelNotFound("gpt-5".into())),
            ScriptedRunner::new(vec![]),
            AgentConfig::for_model("gpt-5"),
        );
        let err = agent.solve("q").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ModelNotFound);
        assert!(err.message().contains("does not exist"));
    }

    #[tokio::test]
    async fn test_simple_variant_runs_once() {
        let agent = agent(vec![code("solve()")], vec![fail("ImportError: gurobipy")]);
        let report = agent.solve_simple("q").await.unwrap();

        assert!(!report.success);
        assert_eq!(agent.provider().calls(), 1);
        assert_eq!(agent.runner.count(), 1);
        assert!(report.render().ends_with("Failed to execute code.\n"));

        let seen = agent.provider().seen.lock().unwrap();
        assert_eq!(seen[0][0].content, prompts::SIMPLE_SYSTEM);
    }

    #[tokio::test]
    async fn test_simple_variant_empty_reply_fails_run() {
        let agent = Agent::new(
            ScriptedProvider::scripted([Ok((None, FinishReason::ContentFilter))]),
            ScriptedRunner::new(vec![]),
            AgentConfig::default(),
        );
        let report = agent.solve_simple("q").await.unwrap();

        assert!(!report.success);
        assert_eq!(report.result_text(), "None");
        assert_eq!(agent.runner.count(), 0);
        assert!(report.trace.iter().any(|e| matches!(
            e,
            StageEvent::Execution {
                outcome: orca_core::ExecutionOutcome::Failure { stderr },
                ..
            } if stderr.contains("No Python code blocks found")
        )));
    }

    #[tokio::test]
    async fn test_report_render_mentions_value() {
        let agent = agent(vec![code("solve()")], vec![ok("Best objective 3")]);
        let report = agent.solve_simple("q").await.unwrap();
        assert!(report
            .render()
            .contains("Successfully executed code, optimal solution value: 3.0"));
    }
}
