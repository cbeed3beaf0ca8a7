//! Verdict engine: compares actual calls against a test case

use super::case::TestCase;
use super::recorder::ActualCall;
use serde::{Deserialize, Serialize};

/// Outcome of one test case under one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseResult {
    /// Test case id
    pub id: String,

    pub passed: bool,

    /// Why the case failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Calls the model made, when useful for diagnosis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_calls: Option<Vec<ActualCall>>,
}

impl CaseResult {
    pub fn pass(id: impl Into<String>, actual_calls: Option<Vec<ActualCall>>) -> Self {
        Self {
            id: id.into(),
            passed: true,
            reason: None,
            actual_calls,
        }
    }

    pub fn fail(
        id: impl Into<String>,
        reason: impl Into<String>,
        actual_calls: Option<Vec<ActualCall>>,
    ) -> Self {
        Self {
            id: id.into(),
            passed: false,
            reason: Some(reason.into()),
            actual_calls,
        }
    }
}

/// Judge one run of `case`.
///
/// Pure: the same inputs always produce the same result.
pub fn evaluate(case: &TestCase, actual_calls: &[ActualCall]) -> CaseResult {
    if case.allow_no_tool && actual_calls.is_empty() {
        return CaseResult::pass(&case.id, None);
    }

    let attach = || Some(actual_calls.to_vec());

    if actual_calls.len() != case.expected_calls.len() {
        return CaseResult::fail(
            &case.id,
            format!(
                "Expected {} tool calls, got {}",
                case.expected_calls.len(),
                actual_calls.len()
            ),
            attach(),
        );
    }

    for expected in &case.expected_calls {
        let Some(actual) = actual_calls.iter().find(|c| c.tool_name == expected.tool_name) else {
            return CaseResult::fail(
                &case.id,
                format!("Expected call to tool '{}' not found", expected.tool_name),
                attach(),
            );
        };

        if let Err(failures) = expected.args_matcher.check(&actual.args) {
            return CaseResult::fail(
                &case.id,
                format!("Arguments mismatch for tool '{}': {}", expected.tool_name, failures),
                attach(),
            );
        }
    }

    // Zero expected and zero actual with allow_no_tool unset lands here too.
    CaseResult::pass(&case.id, (!actual_calls.is_empty()).then(|| actual_calls.to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::matcher::{ArgsMatcher, FieldMatcher};
    use serde_json::json;

    fn weather_case() -> TestCase {
        TestCase::new("weather", "weather on 2025-07-13?").expect(
            "weatherInSfTool",
            ArgsMatcher::object().field("date", FieldMatcher::literal("2025-07-13")),
        )
    }

    #[test]
    fn test_pass_attaches_calls() {
        let calls = vec![ActualCall::new("weatherInSfTool", json!({"date": "2025-07-13"}))];
        let result = evaluate(&weather_case(), &calls);
        assert!(result.passed);
        assert!(result.reason.is_none());
        assert_eq!(result.actual_calls, Some(calls));
    }

    #[test]
    fn test_count_mismatch_checked_first() {
        let calls = vec![
            ActualCall::new("searchTool", json!({})),
            ActualCall::new("searchTool", json!({})),
        ];
        let result = evaluate(&weather_case(), &calls);
        assert!(!result.passed);
        assert_eq!(result.reason.as_deref(), Some("Expected 1 tool calls, got 2"));
        assert_eq!(result.actual_calls.map(|c| c.len()), Some(2));
    }

    #[test]
    fn test_missing_tool() {
        let calls = vec![ActualCall::new("searchTool", json!({"query": "weather"}))];
        let result = evaluate(&weather_case(), &calls);
        assert_eq!(
            result.reason.as_deref(),
            Some("Expected call to tool 'weatherInSfTool' not found")
        );
        assert!(result.actual_calls.is_some());
    }

    #[test]
    fn test_argument_mismatch_is_field_level() {
        let calls = vec![ActualCall::new("weatherInSfTool", json!({"date": "2025-07-14"}))];
        let result = evaluate(&weather_case(), &calls);
        assert_eq!(
            result.reason.as_deref(),
            Some(
                "Arguments mismatch for tool 'weatherInSfTool': \
                 date: expected literal \"2025-07-13\", received \"2025-07-14\""
            )
        );
    }

    #[test]
    fn test_matching_is_by_name_not_position() {
        let case = TestCase::new("two", "p")
            .expect("a", ArgsMatcher::object())
            .expect("b", ArgsMatcher::object());
        let calls = vec![ActualCall::new("b", json!({})), ActualCall::new("a", json!({}))];
        assert!(evaluate(&case, &calls).passed);
    }

    #[test]
    fn test_first_call_by_name_is_used() {
        let case = TestCase::new("dup", "p")
            .expect("a", ArgsMatcher::object().field("n", FieldMatcher::literal(1)))
            .expect("b", ArgsMatcher::object());
        let calls = vec![
            ActualCall::new("a", json!({"n": 2})),
            ActualCall::new("b", json!({})),
        ];
        assert!(!evaluate(&case, &calls).passed);
    }

    #[test]
    fn test_duplicate_expectations_may_bind_same_call() {
        let case = TestCase::new("same", "p")
            .expect("a", ArgsMatcher::object())
            .expect("a", ArgsMatcher::object());
        let calls = vec![ActualCall::new("a", json!({})), ActualCall::new("z", json!({}))];
        assert!(evaluate(&case, &calls).passed);
    }

    #[test]
    fn test_allow_no_tool_with_expectations() {
        let case = weather_case().allow_no_tool();
        let result = evaluate(&case, &[]);
        assert!(result.passed);
        assert!(result.actual_calls.is_none());

        let calls = vec![ActualCall::new("weatherInSfTool", json!({"date": "2025-07-13"}))];
        assert!(evaluate(&case, &calls).passed);
    }

    #[test]
    fn test_empty_expectations_without_allow_no_tool() {
        let case = TestCase::new("empty", "p");
        let result = evaluate(&case, &[]);
        assert!(result.passed);
        assert!(result.actual_calls.is_none());
    }

    #[test]
    fn test_serialization_shape() {
        let passed = serde_json::to_value(CaseResult::pass("a", None)).unwrap();
        assert_eq!(passed, json!({"id": "a", "passed": true}));

        let failed = serde_json::to_value(CaseResult::fail(
            "b",
            "Expected 0 tool calls, got 1",
            Some(vec![ActualCall::new("searchTool", json!({"query": "sky"}))]),
        ))
        .unwrap();
        assert_eq!(
            failed,
            json!({
                "id": "b",
                "passed": false,
                "reason": "Expected 0 tool calls, got 1",
                "actualCalls": [{"toolName": "searchTool", "args": {"query": "sky"}}]
            })
        );
    }
}
