//! Tool registry for registration, lookup and execution
//!
//! The registry is built once at startup and shared read-only across all
//! concurrently running test cases.

use super::builtins::{CalculatorTool, FileTool, SearchTool, WeatherInSfTool};
use super::result::ToolError;
use super::tool::Tool;
use crate::llm::ToolDefinition;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Error type for registry operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    /// Tool with this name already exists
    #[error("Tool '{0}' is already registered")]
    DuplicateTool(String),
}

/// Name-indexed set of tools, kept in registration order
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the four bundled tools
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        let tools: [Arc<dyn Tool>; 4] = [
            Arc::new(FileTool::new()),
            Arc::new(WeatherInSfTool::new()),
            Arc::new(SearchTool::new()),
            Arc::new(CalculatorTool::new()),
        ];
        for tool in tools {
            registry.insert(tool);
        }
        registry
    }

    /// Register a tool
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateTool` if the name is taken.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            return Err(RegistryError::DuplicateTool(name));
        }
        self.insert(tool);
        Ok(())
    }

    fn insert(&mut self, tool: Arc<dyn Tool>) {
        self.index.insert(tool.name().to_string(), self.tools.len());
        self.tools.push(tool);
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.index.get(name).map(|&i| self.tools[i].clone())
    }

    /// Check if a tool is registered
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Registered tool names, in registration order
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Definitions of every tool, as sent to the model
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    /// Validate and execute a tool call
    ///
    /// # Errors
    ///
    /// Returns a `ToolError` for unknown tools, invalid arguments or tool failures.
    pub async fn execute(&self, name: &str, args: Value) -> Result<Value, ToolError> {
        let tool = self.get(name).ok_or_else(|| ToolError::not_found(name))?;
        tool.validate(&args).map_err(ToolError::validation)?;
        tool.execute(args).await
    }
}
