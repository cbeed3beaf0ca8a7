//! Tool trait and metadata definitions
//!
//! Tools are the capabilities a model may choose to invoke. The harness only
//! judges *which* tool was called and *with what arguments*; execution exists
//! so the model can finish its turn with realistic follow-on text.

use super::result::{ToolError, ValidationError};
use crate::llm::ToolDefinition;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Tool metadata presented to the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolMetadata {
    /// Tool name (unique identifier)
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// What the tool returns
    pub returns: String,
}

impl ToolMetadata {
    /// Create new metadata with required fields
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            returns: "Tool-specific result".to_string(),
        }
    }

    /// Set return description
    pub fn with_returns(mut self, returns: impl Into<String>) -> Self {
        self.returns = returns.into();
        self
    }
}

/// JSON Schema for tool parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    /// JSON Schema for input parameters
    pub parameters: Value,
}

impl ToolSchema {
    /// Create a schema from a JSON Schema value
    pub fn new(parameters: Value) -> Self {
        Self { parameters }
    }

    /// Object schema whose properties are all required strings, with no extras allowed
    pub fn required_strings(fields: &[&str]) -> Self {
        let properties: serde_json::Map<String, Value> = fields
            .iter()
            .map(|f| (f.to_string(), serde_json::json!({ "type": "string" })))
            .collect();
        Self::new(serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": fields,
            "additionalProperties": false
        }))
    }

    /// Validate arguments against the JSON Schema.
    ///
    /// Each violation is keyed by the instance path it was found at (`$` for the
    /// argument object itself). An unusable schema skips validation with a warning.
    pub fn validate(&self, args: &Value) -> Result<(), Vec<ValidationError>> {
        let validator = match jsonschema::validator_for(&self.parameters) {
            Ok(validator) => validator,
            Err(e) => {
                tracing::warn!(error = %e, "invalid tool schema, skipping validation");
                return Ok(());
            }
        };

        let errors: Vec<ValidationError> = validator
            .iter_errors(args)
            .map(|e| ValidationError::new(field_path(&e.instance_path.to_string()), e.to_string()))
            .collect();
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// `/a/0/b` style pointer to a `a.0.b` field path
fn field_path(pointer: &str) -> String {
    let trimmed = pointer.trim_start_matches('/');
    if trimmed.is_empty() {
        "$".to_string()
    } else {
        trimmed.replace('/', ".")
    }
}

/// Core tool trait
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get tool metadata
    fn metadata(&self) -> &ToolMetadata;

    /// Get tool name (convenience method)
    fn name(&self) -> &str {
        &self.metadata().name
    }

    /// Get tool description (convenience method)
    fn description(&self) -> &str {
        &self.metadata().description
    }

    /// Get the JSON schema for this tool's parameters
    fn schema(&self) -> ToolSchema;

    /// Validate input arguments before execution
    fn validate(&self, args: &Value) -> Result<(), Vec<ValidationError>> {
        self.schema().validate(args)
    }

    /// Definition sent to the model
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.schema().parameters,
        }
    }

    /// Execute the tool with already-validated arguments
    async fn execute(&self, args: Value) -> Result<Value, ToolError>;
}

/// Type alias for boxed tools
pub type BoxedTool = Arc<dyn Tool>;

#[cfg(test)]
mod tool_tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_strings_schema() {
        let schema = ToolSchema::required_strings(&["name", "path"]);
        assert_eq!(schema.parameters["required"], json!(["name", "path"]));
        assert_eq!(schema.parameters["properties"]["name"]["type"], "string");
        assert_eq!(schema.parameters["additionalProperties"], false);
    }

    #[test]
    fn test_validate_accepts_matching_args() {
        let schema = ToolSchema::required_strings(&["date"]);
        assert!(schema.validate(&json!({"date": "2025-07-13"})).is_ok());
    }

    #[test]
    fn test_validate_reports_each_problem() {
        let schema = ToolSchema::required_strings(&["name", "path"]);
        let errors = schema
            .validate(&json!({"name": 3, "extra": true}))
            .unwrap_err();

        assert_eq!(errors.len(), 3);
        let at = |field: &str| -> Vec<&str> {
            errors
                .iter()
                .filter(|e| e.field == field)
                .map(|e| e.message.as_str())
                .collect()
        };
        assert!(at("name").iter().any(|m| m.contains("\"string\"")));
        assert!(at("$").iter().any(|m| m.contains("\"path\" is a required property")));
        assert!(at("$").iter().any(|m| m.contains("'extra'")));
    }

    #[test]
    fn test_validate_rejects_non_object() {
        let schema = ToolSchema::required_strings(&["query"]);
        let errors = schema.validate(&json!("AI news")).unwrap_err();
        assert_eq!(errors[0].field, "$");
        assert!(errors[0].message.contains("\"object\""));
    }

    #[test]
    fn test_validate_honours_richer_keywords() {
        let schema = ToolSchema::new(json!({
            "type": "object",
            "properties": {
                "unit": {"type": "string", "enum": ["celsius", "fahrenheit"]},
                "location": {
                    "type": "object",
                    "properties": {"city": {"type": "string", "minLength": 1}},
                    "required": ["city"]
                }
            },
            "required": ["unit", "location"]
        }));

        assert!(schema
            .validate(&json!({"unit": "celsius", "location": {"city": "SF"}}))
            .is_ok());

        let errors = schema
            .validate(&json!({"unit": "kelvin", "location": {"city": ""}}))
            .unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"unit"));
        assert!(fields.contains(&"location.city"));
    }

    #[test]
    fn test_invalid_schema_skips_validation() {
        let schema = ToolSchema::new(json!({
            "type": 12,
            "properties": {"x": {"type": "string", "pattern": "("}}
        }));
        assert!(schema.validate(&json!({"anything": true})).is_ok());
    }

    #[test]
    fn test_field_path() {
        assert_eq!(field_path(""), "$");
        assert_eq!(field_path("/date"), "date");
        assert_eq!(field_path("/items/0/name"), "items.0.name");
    }
}
