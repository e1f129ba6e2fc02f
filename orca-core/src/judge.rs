//! Scoring of agent results against a reference answer

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Absolute difference below which a numeric answer counts as correct
pub const DEFAULT_TOLERANCE: f64 = 0.1;

static PLAIN_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-+]?\d+(\.\d+)?$").expect("valid pattern"));

/// Outcome of judging one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Verdict {
    /// The generated code executed successfully
    pub ran: bool,
    /// The reported answer matches the reference
    pub correct: bool,
}

/// True for plain integers and decimals such as `-12` or `45.0`.
pub fn is_number_string(s: &str) -> bool {
    PLAIN_NUMBER.is_match(s)
}

pub fn judge(success: bool, result: &str, ground_truth: Option<&str>) -> Verdict {
    judge_with_tolerance(success, result, ground_truth, DEFAULT_TOLERANCE)
}

/// Judge a run with an explicit tolerance.
///
/// `"None"` as a result is correct only when there is no reference answer
/// (absent or the literal `"None"`).
pub fn judge_with_tolerance(
    success: bool,
    result: &str,
    ground_truth: Option<&str>,
    tolerance: f64,
) -> Verdict {
    if !success {
        return Verdict::default();
    }

    let truth = ground_truth.map(str::trim).filter(|t| *t != "None");
    let correct = if is_number_string(result) {
        match (result.parse::<f64>(), truth.map(str::parse::<f64>)) {
            (Ok(value), Some(Ok(expected))) => (value - expected).abs() < tolerance,
            _ => false,
        }
    } else {
        result == "None" && truth.is_none()
    };

    Verdict { ran: true, correct }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_strings() {
        assert!(is_number_string("45"));
        assert!(is_number_string("-45.25"));
        assert!(is_number_string("+3"));
        assert!(!is_number_string("4.5e+01"));
        assert!(!is_number_string("None"));
        assert!(!is_number_string("45."));
        assert!(!is_number_string(""));
    }

    #[test]
    fn test_within_tolerance() {
        assert_eq!(
            judge(true, "45.0", Some("45.05")),
            Verdict {
                ran: true,
                correct: true
            }
        );
    }

    #[test]
    fn test_outside_tolerance() {
        assert_eq!(
            judge(true, "45.0", Some("46.0")),
            Verdict {
                ran: true,
                correct: false
            }
        );
        // the bound is exclusive
        assert!(!judge_with_tolerance(true, "1", Some("2"), 1.0).correct);
    }

    #[test]
    fn test_none_matches_missing_reference() {
        assert_eq!(
            judge(true, "None", Some("None")),
            Verdict {
                ran: true,
                correct: true
            }
        );
        assert!(judge(true, "None", None).correct);
        assert!(!judge(true, "None", Some("12")).correct);
    }

    #[test]
    fn test_failed_run_is_never_correct() {
        assert_eq!(judge(false, "45.0", Some("45.0")), Verdict::default());
        assert_eq!(judge(false, "None", None), Verdict::default());
    }

    #[test]
    fn test_number_against_missing_reference() {
        assert!(!judge(true, "45.0", None).correct);
        assert!(!judge(true, "45.0", Some("None")).correct);
        assert!(!judge(true, "45.0", Some("forty-five")).correct);
    }

    #[test]
    fn test_reference_in_exponent_notation() {
        assert!(judge(true, "1200", Some("1.2e3")).correct);
    }
}
