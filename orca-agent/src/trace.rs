//! Stage trace of an agent run
//!
//! Every generation, execution and stage transition is recorded as a
//! [`StageEvent`]. The trace is part of the run report and can be rendered
//! as a readable transcript.

use orca_core::provider::{FinishReason, Usage, UsageTracker};
use orca_core::{ExecutionOutcome, ObjectiveResult};
use serde::Serialize;
use std::fmt;

/// Escalation stages, in the order they can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationStage {
    InitialModel,
    InfeasibilityRepair,
    SyntaxRepair,
}

impl EscalationStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InitialModel => "initial_model",
            Self::InfeasibilityRepair => "infeasibility_repair",
            Self::SyntaxRepair => "syntax_repair",
        }
    }
}

impl fmt::Display for EscalationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step of an agent run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StageEvent {
    /// A stage was entered
    StageStarted { stage: EscalationStage },
    /// Mathematical formulation of the problem
    Formulation { text: String },
    /// Formulation after the audit turn
    AuditedFormulation { text: String },
    /// Model reply expected to carry code
    Generation {
        stage: EscalationStage,
        attempt: usize,
        text: String,
        /// `length` hints at code cut off by the token limit
        finish_reason: FinishReason,
    },
    /// Result of running the generated code
    Execution {
        stage: EscalationStage,
        attempt: usize,
        outcome: ExecutionOutcome,
    },
    /// A stage ended
    StageFinished {
        stage: EscalationStage,
        success: bool,
        objective: Option<ObjectiveResult>,
    },
}

/// Collects events and token usage while a run progresses
#[derive(Debug, Default)]
pub struct TraceRecorder {
    events: Vec<StageEvent>,
    usage: UsageTracker,
}

impl TraceRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: StageEvent) {
        self.events.push(event);
    }

    pub fn track(&mut self, usage: &Usage) {
        self.usage.track(usage);
    }

    pub fn events(&self) -> &[StageEvent] {
        &self.events
    }

    pub fn into_parts(self) -> (Vec<StageEvent>, UsageTracker) {
        (self.events, self.usage)
    }
}

/// Render events as a readable transcript.
pub fn render(events: &[StageEvent]) -> String {
    let mut out = String::new();
    for event in events {
        match event {
            StageEvent::StageStarted { stage } => match stage {
                EscalationStage::InitialModel => {}
                EscalationStage::InfeasibilityRepair => {
                    out.push_str("!![No available solution warning]!!\n\n")
                }
                EscalationStage::SyntaxRepair => {
                    out.push_str("!![Max attempt debug error warning]!!\n\n")
                }
            },
            StageEvent::Formulation { text } => {
                out.push_str(&format!("[Mathematical Model]:\n{}\n\n", text))
            }
            StageEvent::AuditedFormulation { text } => {
                out.push_str(&format!("[Validated Mathematical Model]:\n{}\n\n", text))
            }
            StageEvent::Generation {
                attempt,
                text,
                finish_reason,
                ..
            } => {
                if *attempt == 0 {
                    out.push_str(&format!("[Python Gurobi Code]:\n{}\n\n", text));
                } else {
                    out.push_str(&format!("[Fixed Code, attempt {}]:\n{}\n\n", attempt + 1, text));
                }
                if *finish_reason == FinishReason::Length {
                    out.push_str("(reply stopped at the token limit)\n\n");
                }
            }
            StageEvent::Execution {
                attempt, outcome, ..
            } => match outcome {
                ExecutionOutcome::Success { stdout } => {
                    out.push_str(&format!("[Execution Output]:\n{}\n", stdout));
                    if let Some(ObjectiveResult::Value(v)) = outcome.objective() {
                        out.push_str(&format!(
                            "Optimal solution value (Best objective): {:?}\n",
                            v
                        ));
                    }
                    out.push('\n');
                }
                ExecutionOutcome::Failure { stderr } => {
                    out.push_str(&format!(
                        "Attempt {} failed:\n{}\n\n",
                        attempt + 1,
                        stderr.trim_end()
                    ));
                }
            },
            StageEvent::StageFinished {
                success, objective, ..
            } => {
                let result = objective
                    .map(|o| o.to_string())
                    .unwrap_or_else(|| "None".into());
                out.push_str(&format!("[Stage result: {}, {}]\n\n", success, result));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_transcript() {
        let events = vec![
            StageEvent::StageStarted {
                stage: EscalationStage::InitialModel,
            },
            StageEvent::Formulation {
                text: "max 3x".into(),
            },
            StageEvent::Generation {
                stage: EscalationStage::InitialModel,
                attempt: 0,
                text: "```python\nprint(1)\n```".into(),
                finish_reason: FinishReason::Stop,
            },
            StageEvent::Execution {
                stage: EscalationStage::InitialModel,
                attempt: 0,
                outcome: ExecutionOutcome::Failure {
                    stderr: "SyntaxError\n".into(),
                },
            },
            StageEvent::StageFinished {
                stage: EscalationStage::InitialModel,
                success: true,
                objective: Some(ObjectiveResult::Value(45.0)),
            },
        ];

        let text = render(&events);
        assert!(text.starts_with("[Mathematical Model]:\nmax 3x"));
        assert!(text.contains("Attempt 1 failed:\nSyntaxError\n"));
        assert!(text.ends_with("[Stage result: true, 45.0]\n\n"));
    }

    #[test]
    fn test_render_marks_truncated_reply() {
        let text = render(&[StageEvent::Generation {
            stage: EscalationStage::InitialModel,
            attempt: 1,
            text: "```python\nm = Model(".into(),
            finish_reason: FinishReason::Length,
        }]);
        assert!(text.starts_with("[Fixed Code, attempt 2]:"));
        assert!(text.contains("token limit"));

        let event = StageEvent::Generation {
            stage: EscalationStage::InitialModel,
            attempt: 0,
            text: String::new(),
            finish_reason: FinishReason::ContentFilter,
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap()["finish_reason"],
            "content_filter"
        );
        assert!(!render(&[event]).contains("token limit"));
    }

    #[test]
    fn test_escalation_warnings() {
        let text = render(&[StageEvent::StageStarted {
            stage: EscalationStage::InfeasibilityRepair,
        }]);
        assert!(text.contains("No available solution"));
    }

    #[test]
    fn test_event_serialization() {
        let event = StageEvent::Execution {
            stage: EscalationStage::SyntaxRepair,
            attempt: 1,
            outcome: ExecutionOutcome::Success {
                stdout: "ok".into(),
            },
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            serde_json::json!({
                "event": "execution",
                "stage": "syntax_repair",
                "attempt": 1,
                "outcome": {"status": "success", "stdout": "ok"}
            })
        );
    }

    #[test]
    fn test_recorder_tracks_usage() {
        let mut recorder = TraceRecorder::new();
        recorder.track(&Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        });
        recorder.record(StageEvent::Formulation { text: "m".into() });
        let (events, usage) = recorder.into_parts();
        assert_eq!(events.len(), 1);
        assert_eq!(usage.total_tokens(), 15);
    }
}
