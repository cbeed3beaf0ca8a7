//! Tool system offered to candidate models
//!
//! - `Tool` trait with metadata and a JSON parameter schema
//! - `ToolRegistry` for lookup, definitions and validated execution
//! - Bundled fake tools: file save, SF weather, web search, calculator
//!
//! # Example
//!
//! ```rust,no_run
//! use toolbench_core::tools::ToolRegistry;
//!
//! # async fn demo() {
//! let registry = ToolRegistry::builtin();
//! let definitions = registry.definitions();
//! let result = registry
//!     .execute("calculatorTool", serde_json::json!({"expression": "2 + 2"}))
//!     .await;
//! # }
//! ```

mod builtins;
mod registry;
mod result;
mod tool;

pub use builtins::{
    CalculatorTool, FileTool, MAX_EXPRESSION_DEPTH, SearchTool, WeatherInSfTool, evaluate_expression,
};
pub use registry::{RegistryError, ToolRegistry};
pub use result::{ToolError, ToolErrorKind, ValidationError};
pub use tool::{BoxedTool, Tool, ToolMetadata, ToolSchema};
