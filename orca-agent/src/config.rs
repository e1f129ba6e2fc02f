//! Agent configuration

use orca_core::config::DEFAULT_MODEL;
use orca_core::provider::DEFAULT_TEMPERATURE;
use serde::{Deserialize, Serialize};

/// Attempt budgets of the three escalation stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryBudgets {
    /// Attempts for the first code generation
    pub initial: usize,
    /// Attempts after a run finished without a numeric objective
    pub infeasibility: usize,
    /// Attempts for the rebuild after the first stage ran out of attempts
    pub syntax: usize,
}

impl Default for RetryBudgets {
    fn default() -> Self {
        Self {
            initial: 3,
            infeasibility: 1,
            syntax: 2,
        }
    }
}

/// Configuration for the agent
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    /// Model identifier, resolved to a provider by the caller
    pub model: String,
    /// Sampling temperature for every query
    pub temperature: f32,
    pub budgets: RetryBudgets,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            budgets: RetryBudgets::default(),
        }
    }
}

impl AgentConfig {
    pub fn for_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    /// Override the first-stage attempt budget
    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.budgets.initial = attempts;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_budgets(mut self, budgets: RetryBudgets) -> Self {
        self.budgets = budgets;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AgentConfig::default();
        assert_eq!(config.model, "gpt-4");
        assert_eq!(config.temperature, 0.2);
        assert_eq!(
            config.budgets,
            RetryBudgets {
                initial: 3,
                infeasibility: 1,
                syntax: 2
            }
        );
    }

    #[test]
    fn test_max_attempts_only_touches_initial_budget() {
        let config = AgentConfig::for_model("claude-3-5-sonnet").with_max_attempts(5);
        assert_eq!(config.model, "claude-3-5-sonnet");
        assert_eq!(config.budgets.initial, 5);
        assert_eq!(config.budgets.infeasibility, 1);
        assert_eq!(config.budgets.syntax, 2);
    }
}
