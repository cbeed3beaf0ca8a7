//! Normalizes a model invocation into the calls it actually made

use super::invoke::Invocation;
use crate::llm::ToolCallRequest;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool call a model produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActualCall {
    pub tool_name: String,
    pub args: Value,
}

impl ActualCall {
    pub fn new(tool_name: impl Into<String>, args: Value) -> Self {
        Self {
            tool_name: tool_name.into(),
            args,
        }
    }
}

impl From<&ToolCallRequest> for ActualCall {
    fn from(call: &ToolCallRequest) -> Self {
        Self::new(call.name.clone(), call.arguments.clone())
    }
}

/// Every call the model made, in emission order.
///
/// Duplicates, unknown tools and calls with undecodable arguments are all kept.
pub fn record(invocation: &Invocation) -> Vec<ActualCall> {
    invocation.tool_calls.iter().map(ActualCall::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(id: &str, name: &str, arguments: Value) -> ToolCallRequest {
        ToolCallRequest {
            id: id.to_string(),
            name: name.to_string(),
            arguments,
        }
    }

    #[test]
    fn test_record_keeps_everything_in_order() {
        let invocation = Invocation {
            tool_calls: vec![
                call("1", "searchTool", json!({"query": "AI"})),
                call("2", "searchTool", json!({"query": "AI"})),
                call("3", "teleportTool", json!({})),
                call("4", "fileTool", Value::String("{broken".to_string())),
            ],
            text: String::new(),
            steps: 1,
        };

        let calls = record(&invocation);
        let names: Vec<&str> = calls.iter().map(|c| c.tool_name.as_str()).collect();
        assert_eq!(names, vec!["searchTool", "searchTool", "teleportTool", "fileTool"]);
        assert_eq!(calls[3].args, json!("{broken"));
    }

    #[test]
    fn test_actual_call_serializes_camel_case() {
        let value = serde_json::to_value(ActualCall::new("fileTool", json!({"name": "a"}))).unwrap();
        assert_eq!(value, json!({"toolName": "fileTool", "args": {"name": "a"}}));
    }
}
