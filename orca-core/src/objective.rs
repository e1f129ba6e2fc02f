//! Objective value extraction from solver output

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

const INFEASIBLE_MARKER: &str = "Model is infeasible";

static BEST_OBJECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Best objective\s+([\d.e+-]+)").expect("valid pattern"));

static OPTIMAL_OBJECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Optimal objective\s+([\d.e+-]+)").expect("valid pattern"));

/// What a successful run reported about its objective
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ObjectiveResult {
    Value(f64),
    Infeasible,
    Unparsed,
}

impl ObjectiveResult {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(*v),
            _ => None,
        }
    }
}

/// Numbers render as themselves, everything else as `None`
impl fmt::Display for ObjectiveResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{:?}", v),
            Self::Infeasible | Self::Unparsed => f.write_str("None"),
        }
    }
}

/// Scan solver stdout for the objective value.
///
/// An infeasibility report wins over any objective line.
pub fn extract_objective(stdout: &str) -> ObjectiveResult {
    if stdout.contains(INFEASIBLE_MARKER) {
        return ObjectiveResult::Infeasible;
    }

    let captured = BEST_OBJECTIVE
        .captures(stdout)
        .or_else(|| OPTIMAL_OBJECTIVE.captures(stdout))
        .and_then(|caps| caps.get(1));

    match captured.map(|m| m.as_str().parse::<f64>()) {
        Some(Ok(value)) => ObjectiveResult::Value(value),
        _ => ObjectiveResult::Unparsed,
    }
}
