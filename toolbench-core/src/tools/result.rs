//! Tool error model
//!
//! Tool failures never affect verdicts. They are reported back to the model as
//! text so it can produce its follow-on answer.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Structured tool error with taxonomy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("[{kind:?}] {message}")]
pub struct ToolError {
    /// Error kind
    pub kind: ToolErrorKind,

    /// Human-readable error message
    pub message: String,

    /// Additional context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl ToolError {
    /// Create a new tool error
    pub fn new(kind: ToolErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: None,
        }
    }

    /// Add context
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }

    /// Create a validation error
    pub fn validation(errors: Vec<ValidationError>) -> Self {
        Self {
            kind: ToolErrorKind::Validation,
            message: format!(
                "Validation failed: {}",
                errors
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; ")
            ),
            context: serde_json::to_value(&errors).ok(),
        }
    }

    /// Create a not-found error
    pub fn not_found(tool: &str) -> Self {
        Self::new(ToolErrorKind::NotFound, format!("Tool '{}' not found", tool))
    }

    /// Create an invalid-input error (arguments well-formed but unusable)
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ToolErrorKind::InvalidInput, message)
    }

    /// Render the error as the JSON payload fed back to the model
    pub fn to_payload(&self) -> Value {
        serde_json::json!({
            "success": false,
            "error": self.message,
        })
    }
}

/// Error kind taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    /// Arguments do not satisfy the tool schema
    Validation,

    /// Arguments satisfy the schema but cannot be used (bad date, division by zero)
    InvalidInput,

    /// The model called a tool that is not registered
    NotFound,

    /// Internal tool error
    Internal,
}

/// Validation error for a specific field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Field path (e.g., "date")
    pub field: String,

    /// Error message
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}
