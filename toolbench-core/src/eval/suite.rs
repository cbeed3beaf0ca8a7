//! Built-in test suite
//!
//! The suite is a process-wide constant: built on first access and never
//! mutated, so concurrent cases share it by reference.

use super::case::TestCase;
use super::matcher::{ArgsMatcher, FieldMatcher};
use crate::error::{BenchError, Result};
use crate::tools::ToolRegistry;
use once_cell::sync::Lazy;
use std::collections::HashSet;

static BUILTIN_SUITE: Lazy<Vec<TestCase>> = Lazy::new(build_suite);

/// The ten built-in cases, in evaluation order
pub fn builtin_suite() -> &'static [TestCase] {
    &BUILTIN_SUITE
}

fn build_suite() -> Vec<TestCase> {
    vec![
        TestCase::new(
            "file-save-simple",
            "Save the text 'Hello world' into a file called notes.txt in /tmp.",
        )
        .expect(
            "fileTool",
            ArgsMatcher::object()
                .field("name", FieldMatcher::literal("notes.txt"))
                .field("path", FieldMatcher::literal("/tmp"))
                .field("content", FieldMatcher::string().contains("Hello world")),
        ),
        TestCase::new(
            "weather-fixed-date",
            "What will the weather be in San Francisco on 2025-07-13? Just tell me.",
        )
        .expect(
            "weatherInSfTool",
            ArgsMatcher::object().field("date", FieldMatcher::literal("2025-07-13")),
        ),
        TestCase::new("search-ai-news", "Search the web for the latest AI news in 2025.").expect(
            "searchTool",
            ArgsMatcher::object().field("query", FieldMatcher::string().contains_all(&["AI", "2025"])),
        ),
        TestCase::new("control-no-tool-needed", "Why is the sky blue?").allow_no_tool(),
        TestCase::new(
            "weather-and-save",
            "Get tomorrow's (2025-07-14) weather in SF and store it in /tmp/weather.txt.",
        )
        .expect(
            "weatherInSfTool",
            ArgsMatcher::object().field("date", FieldMatcher::literal("2025-07-14")),
        )
        .expect(
            "fileTool",
            ArgsMatcher::object()
                .field("name", FieldMatcher::literal("weather.txt"))
                .field("path", FieldMatcher::literal("/tmp"))
                .field("content", FieldMatcher::string().min_len(11)),
        ),
        TestCase::new(
            "list-weekdays-no-tool",
            "List the days of the week in order, nothing else.",
        )
        .allow_no_tool(),
        TestCase::new(
            "calculator-simple-math",
            "What is 15 * (23 + 7) / 5? Use a tool if needed.",
        )
        .expect(
            "calculatorTool",
            ArgsMatcher::object().field(
                "expression",
                FieldMatcher::string().contains_all(&["15", "*", "23", "7", "/5"]),
            ),
        ),
        TestCase::new("control-no-tool-simple-math", "What is 2 + 2? Answer directly.")
            .allow_no_tool(),
        TestCase::new(
            "weather-invalid-date",
            "What will the weather be in San Francisco on 2025-13-01? Just tell me.",
        )
        .expect(
            "weatherInSfTool",
            ArgsMatcher::object().field("date", FieldMatcher::literal("2025-13-01")),
        ),
        TestCase::new(
            "search-and-save",
            "Search for top AI trends in 2025 and save the summary to /tmp/ai-trends.txt.",
        )
        .expect(
            "searchTool",
            ArgsMatcher::object().field(
                "query",
                FieldMatcher::string().contains_all(&["AI", "trends", "2025"]),
            ),
        )
        .expect(
            "fileTool",
            ArgsMatcher::object()
                .field("name", FieldMatcher::literal("ai-trends.txt"))
                .field("path", FieldMatcher::literal("/tmp"))
                .field("content", FieldMatcher::string().min_len(20)),
        ),
    ]
}

/// Check that a suite is well-formed against the tools the models will see.
///
/// # Errors
///
/// Returns `BenchError::Suite` for an empty suite, duplicate or blank ids, or an
/// expected call naming a tool missing from `registry`.
pub fn validate_suite(cases: &[TestCase], registry: &ToolRegistry) -> Result<()> {
    if cases.is_empty() {
        return Err(BenchError::Suite("Suite contains no test cases".to_string()));
    }

    let mut seen = HashSet::new();
    for case in cases {
        if case.id.trim().is_empty() {
            return Err(BenchError::Suite("Test case id cannot be empty".to_string()));
        }
        if !seen.insert(case.id.as_str()) {
            return Err(BenchError::Suite(format!("Duplicate test case id: {}", case.id)));
        }
        if let Some(call) = case
            .expected_calls
            .iter()
            .find(|c| !registry.contains(&c.tool_name))
        {
            return Err(BenchError::Suite(format!(
                "Test case '{}' expects unknown tool '{}'",
                case.id, call.tool_name
            )));
        }
    }
    Ok(())
}

/// Restrict a suite to the given ids, keeping suite order.
///
/// An empty `ids` selects every case.
///
/// # Errors
///
/// Returns `BenchError::Configuration` for an id not present in `cases`.
pub fn select_cases(cases: &[TestCase], ids: &[String]) -> Result<Vec<TestCase>> {
    if ids.is_empty() {
        return Ok(cases.to_vec());
    }
    if let Some(unknown) = ids.iter().find(|id| !cases.iter().any(|c| &c.id == *id)) {
        return Err(BenchError::Configuration(format!("Unknown test case: {}", unknown)));
    }
    Ok(cases
        .iter()
        .filter(|c| ids.contains(&c.id))
        .cloned()
        .collect())
}
