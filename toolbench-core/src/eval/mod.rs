//! Tool-calling conformance evaluation
//!
//! This module provides the evaluation engine:
//! - Test cases with structural argument matchers
//! - Recording of the calls a model actually made
//! - Verdicts with field-level diagnostics
//! - Concurrent per-model runs with per-case failure containment
//! - Per-model summaries and the cross-model aggregate
//!
//! # Architecture
//!
//! ```text
//! TestCase ──────────────────────────┐
//!                                    ▼
//! LLMProvider ─► invoke_with_tools ─► record ─► evaluate ─► CaseResult
//!                                                              │
//!                               summarize ◄────────────────────┘
//!                                   │
//!                          Reporter / Aggregate
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use toolbench_core::eval::{CandidateModel, ConsoleReporter, EvalRunner, Reporter, builtin_suite};
//! use toolbench_core::llm::providers::OpenRouterProvider;
//! use toolbench_core::tools::ToolRegistry;
//!
//! # async fn demo() -> toolbench_core::error::Result<()> {
//! let runner = EvalRunner::new(builtin_suite().to_vec(), Arc::new(ToolRegistry::builtin()))?;
//! let provider = Arc::new(OpenRouterProvider::from_env("openai/o4-mini")?);
//! let models = vec![CandidateModel::new("o4-mini", provider)];
//!
//! let mut reporters: Vec<Box<dyn Reporter>> = vec![Box::new(ConsoleReporter::stdout())];
//! let aggregate = runner.run_all(&models, &mut reporters).await?;
//! # Ok(())
//! # }
//! ```

mod case;
mod invoke;
mod matcher;
mod recorder;
mod report;
mod runner;
mod scripted;
mod suite;
mod summary;
mod verdict;

pub use case::{ExpectedCall, TestCase};
pub use invoke::{Invocation, InvokeOptions, invoke_with_tools};
pub use matcher::{ArgsMatcher, FieldMatcher, MatchFailure, MatchFailures, Refinement};
pub use recorder::{ActualCall, record};
pub use report::{ConsoleReporter, JsonFileReporter, Reporter, format_case_line, format_summary_line};
pub use runner::{CandidateModel, EvalRunner, RunOptions};
pub use scripted::{ScriptedProvider, ScriptedStep};
pub use suite::{builtin_suite, select_cases, validate_suite};
pub use summary::{Aggregate, ModelSummary, summarize};
pub use verdict::{CaseResult, evaluate};
