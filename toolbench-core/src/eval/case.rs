//! Test case definitions

use super::matcher::ArgsMatcher;

/// A tool call a passing run must exhibit
#[derive(Debug, Clone)]
pub struct ExpectedCall {
    /// Name of the tool the model must call
    pub tool_name: String,

    /// Predicate over the call's argument object
    pub args_matcher: ArgsMatcher,
}

impl ExpectedCall {
    pub fn new(tool_name: impl Into<String>, args_matcher: ArgsMatcher) -> Self {
        Self {
            tool_name: tool_name.into(),
            args_matcher,
        }
    }
}

/// One prompt and its expected tool-invocation outcome.
///
/// When `allow_no_tool` is set, a run with zero tool calls passes regardless of
/// `expected_calls`. Otherwise the number of actual calls must equal the number
/// of expected calls, and each expected call is matched against the first
/// actual call with the same tool name.
#[derive(Debug, Clone)]
pub struct TestCase {
    /// Unique identifier
    pub id: String,

    /// User prompt sent to the model
    pub prompt: String,

    /// Expected calls; matched by tool name, not position
    pub expected_calls: Vec<ExpectedCall>,

    /// Zero tool calls is an automatic pass
    pub allow_no_tool: bool,
}

impl TestCase {
    pub fn new(id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            expected_calls: Vec::new(),
            allow_no_tool: false,
        }
    }

    /// Add an expected call
    pub fn expect(mut self, tool_name: impl Into<String>, args_matcher: ArgsMatcher) -> Self {
        self.expected_calls.push(ExpectedCall::new(tool_name, args_matcher));
        self
    }

    /// Accept a run in which the model calls no tool
    pub fn allow_no_tool(mut self) -> Self {
        self.allow_no_tool = true;
        self
    }
}
