//! # Toolbench - Tool-Calling Conformance for LLMs
//!
//! Toolbench checks whether language models decide correctly *when* to call a
//! tool and *with what arguments*. A fixed suite of prompts is sent to every
//! candidate model with the same tool set; the calls each model makes are
//! compared against structural expectations and summarized per model.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use toolbench_core::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = BenchConfig::load()?;
//!     let models = config
//!         .models
//!         .iter()
//!         .map(|m| CandidateModel::from_config(&config.llm, m))
//!         .collect::<Result<Vec<_>>>()?;
//!
//!     let runner = EvalRunner::new(builtin_suite().to_vec(), Arc::new(ToolRegistry::builtin()))?
//!         .with_options(RunOptions::from_config(&config));
//!
//!     let mut reporters: Vec<Box<dyn Reporter>> = vec![
//!         Box::new(ConsoleReporter::stdout()),
//!         Box::new(JsonFileReporter::new(&config.run.output_dir)),
//!     ];
//!     runner.run_all(&models, &mut reporters).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Expectations**: [`eval::TestCase`] with [`eval::ArgsMatcher`] per expected call
//! - **Recording**: every call a model made, unfiltered ([`eval::record`])
//! - **Verdicts**: count, presence and argument checks ([`eval::evaluate`])
//! - **Orchestration**: concurrent cases, sequential models ([`eval::EvalRunner`])
//! - **Aggregation**: per-model pass counts ([`eval::Aggregate`])
//!
//! ## Feature Flags
//!
//! - `llm-openrouter` (default): OpenRouter and other OpenAI-compatible endpoints

pub mod config;
pub mod error;
pub mod eval;
pub mod llm;
pub mod tools;

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{
        BenchConfig, LLMProvider as LLMProviderType, LLMProviderConfig, ModelConfig, RunConfig,
    };
    pub use crate::error::{BenchError, Result};
    pub use crate::eval::{
        ActualCall, Aggregate, ArgsMatcher, CandidateModel, CaseResult, ConsoleReporter,
        EvalRunner, ExpectedCall, FieldMatcher, JsonFileReporter, ModelSummary, Reporter,
        RunOptions, TestCase, builtin_suite, evaluate, summarize,
    };
    pub use crate::llm::{
        LLMProvider, LLMProviderFactory, LLMRequest, LLMResponse, Message, MessageRole,
        ToolCallRequest, ToolDefinition,
    };
    pub use crate::tools::{Tool, ToolError, ToolMetadata, ToolRegistry, ToolSchema};
}
