//! Dataset evaluation
//!
//! A dataset is a JSON object mapping an index to a question and its
//! reference answer. Records are solved one at a time, in file order.

use crate::agent::{Agent, AgentReport};
use orca_core::error::{Error, Result};
use orca_core::judge::{judge, Verdict};
use orca_core::provider::LlmProvider;
use orca_core::CodeRunner;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{info, warn};

/// One dataset entry
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DatasetRecord {
    pub question: String,
    /// Reference objective; `null` for problems without a solution
    #[serde(default)]
    pub answer: Option<serde_json::Value>,
}

impl DatasetRecord {
    /// Reference answer as the judge expects it
    pub fn ground_truth(&self) -> Option<String> {
        match &self.answer {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        }
    }
}

/// Parse a dataset, keeping the order of the file.
pub fn parse_dataset(json: &str) -> Result<Vec<(String, DatasetRecord)>> {
    let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json).map_err(|e| {
        Error::parse_failed(format!("dataset is not a JSON object: {}", e))
            .with_operation("eval::parse_dataset")
            .set_source(e)
    })?;

    map.into_iter()
        .map(|(index, value)| {
            let record = serde_json::from_value(value).map_err(|e| {
                Error::parse_failed(format!("record {} is malformed: {}", index, e))
                    .with_operation("eval::parse_dataset")
                    .with_context("index", index.clone())
                    .set_source(e)
            })?;
            Ok((index, record))
        })
        .collect()
}

pub fn load_dataset(path: impl AsRef<Path>) -> Result<Vec<(String, DatasetRecord)>> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|e| {
        Error::from(e)
            .with_operation("eval::load_dataset")
            .with_context("path", path.display().to_string())
    })?;
    parse_dataset(&json)
}

/// Which pipeline solves each record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalMode {
    /// Staged agent with audit and repair
    Agent,
    /// Single generation, single execution
    Simple,
}

/// Per-record evaluation result
#[derive(Debug, Clone, Serialize)]
pub struct RecordResult {
    pub index: String,
    pub result: String,
    pub ground_truth: Option<String>,
    pub verdict: Verdict,
}

/// Totals over a dataset
#[derive(Debug, Clone, Default, Serialize)]
pub struct EvalSummary {
    pub total: usize,
    pub passed: usize,
    pub correct: usize,
    /// Indices that either failed to run or gave a wrong answer
    pub failures: Vec<String>,
    pub records: Vec<RecordResult>,
}

impl EvalSummary {
    pub fn add(&mut self, record: RecordResult) {
        self.total += 1;
        if record.verdict.ran {
            self.passed += 1;
        }
        if record.verdict.correct {
            self.correct += 1;
        }
        if !record.verdict.ran || !record.verdict.correct {
            self.failures.push(record.index.clone());
        }
        self.records.push(record);
    }
}

impl fmt::Display for EvalSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "[Total {}] run pass: {}, solve correct: {}",
            self.total, self.passed, self.correct
        )?;
        write!(
            f,
            "[Total fails {}] error datas: [{}]",
            self.failures.len(),
            self.failures.join(", ")
        )
    }
}

/// Judge one finished run against its record
pub fn score(index: &str, record: &DatasetRecord, report: &AgentReport) -> RecordResult {
    let result = report.result_text();
    let ground_truth = record.ground_truth();
    let verdict = judge(report.success, &result, ground_truth.as_deref());
    RecordResult {
        index: index.to_string(),
        result,
        ground_truth,
        verdict,
    }
}

/// Solve every record in order and accumulate the verdicts.
///
/// Provider errors stop the evaluation.
pub async fn evaluate<P, R>(
    agent: &Agent<P, R>,
    dataset: &[(String, DatasetRecord)],
    mode: EvalMode,
) -> Result<EvalSummary>
where
    P: LlmProvider,
    R: CodeRunner,
{
    let mut summary = EvalSummary::default();
    for (index, record) in dataset {
        info!(%index, "evaluating record");
        let report = match mode {
            EvalMode::Agent => agent.solve(&record.question).await,
            EvalMode::Simple => agent.solve_simple(&record.question).await,
        }
        .map_err(|e| e.with_context("index", index.clone()))?;

        let scored = score(index, record, &report);
        if !scored.verdict.correct {
            warn!(
                %index,
                result = %scored.result,
                ground_truth = scored.ground_truth.as_deref().unwrap_or("None"),
                ran = scored.verdict.ran,
                "record not solved correctly"
            );
        }
        summary.add(scored);
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgentConfig;
    use crate::repair::testing::*;
    use orca_core::ErrorKind;

    const DATASET: &str = r#"{
        "10": {"question": "second in numeric order, first in file", "answer": 45.0},
        "2": {"question": "infeasible problem", "answer": null},
        "3": {"question": "string answer", "answer": "7"}
    }"#;

    #[test]
    fn test_dataset_keeps_file_order() {
        let dataset = parse_dataset(DATASET).unwrap();
        let indices: Vec<&str> = dataset.iter().map(|(i, _)| i.as_str()).collect();
        assert_eq!(indices, vec!["10", "2", "3"]);
        assert_eq!(dataset[0].1.ground_truth().as_deref(), Some("45.0"));
        assert_eq!(dataset[1].1.ground_truth(), None);
        assert_eq!(dataset[2].1.ground_truth().as_deref(), Some("7"));
    }

    #[test]
    fn test_malformed_dataset() {
        let err = parse_dataset("[1, 2]").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseFailed);

        let err = parse_dataset(r#"{"0": {"answer": 1}}"#).unwrap_err();
        assert!(err.message().contains("record 0"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_dataset("/nonexistent/orca/dataset.json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileNotFound);
    }

    #[test]
    fn test_summary_display() {
        let mut summary = EvalSummary::default();
        for (index, ran, correct) in [("0", true, true), ("1", true, false), ("2", false, false)] {
            summary.add(RecordResult {
                index: index.into(),
                result: "None".into(),
                ground_truth: None,
                verdict: Verdict { ran, correct },
            });
        }
        assert_eq!(
            summary.to_string(),
            "[Total 3] run pass: 2, solve correct: 1\n[Total fails 2] error datas: [1, 2]"
        );
    }

    #[tokio::test]
    async fn test_evaluate_simple_mode() {
        let dataset = parse_dataset(DATASET).unwrap();
        let agent = Agent::new(
            ScriptedProvider::new(vec![code("a"), code("b"), code("c")]),
            ScriptedRunner::new(vec![
                ok("Best objective 45.02"),
                ok("Model is infeasible"),
                fail("boom"),
            ]),
            AgentConfig::default(),
        );

        let summary = evaluate(&agent, &dataset, EvalMode::Simple).await.unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.correct, 2);
        assert_eq!(summary.failures, vec!["3".to_string()]);
        assert_eq!(summary.records[1].result, "None");
    }
}
