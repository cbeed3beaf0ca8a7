//! Run orchestration
//!
//! Within one model every case runs concurrently as its own task. A failing
//! or panicking case becomes a failed [`CaseResult`] and never disturbs its
//! siblings. Models run one after another, each reported before the next
//! starts.

use super::case::TestCase;
use super::invoke::{InvokeOptions, invoke_with_tools};
use super::recorder::record;
use super::report::Reporter;
use super::suite::validate_suite;
use super::summary::{Aggregate, summarize};
use super::verdict::{CaseResult, evaluate};
use crate::config::{BenchConfig, LLMProviderConfig, ModelConfig};
use crate::error::Result;
use crate::llm::{LLMProvider, LLMProviderFactory};
use crate::tools::ToolRegistry;
use futures::future::join_all;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// A model under evaluation
#[derive(Clone)]
pub struct CandidateModel {
    /// Unique name, used as the report key
    pub name: String,

    pub provider: Arc<dyn LLMProvider>,

    /// Informational only
    pub reasoning: bool,

    /// Merged into every request for this model
    pub provider_options: Option<Value>,
}

impl CandidateModel {
    pub fn new(name: impl Into<String>, provider: Arc<dyn LLMProvider>) -> Self {
        Self {
            name: name.into(),
            provider,
            reasoning: false,
            provider_options: None,
        }
    }

    pub fn with_reasoning(mut self, reasoning: bool) -> Self {
        self.reasoning = reasoning;
        self
    }

    pub fn with_provider_options(mut self, options: Option<Value>) -> Self {
        self.provider_options = options;
        self
    }

    /// Build the provider for a configured model
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the provider cannot be created.
    pub fn from_config(llm: &LLMProviderConfig, model: &ModelConfig) -> Result<Self> {
        let provider = LLMProviderFactory::create(llm, model)?;
        Ok(Self::new(&model.name, provider)
            .with_reasoning(model.reasoning)
            .with_provider_options(model.provider_options.clone()))
    }
}

impl std::fmt::Debug for CandidateModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandidateModel")
            .field("name", &self.name)
            .field("provider", &self.provider.model_info())
            .field("reasoning", &self.reasoning)
            .finish()
    }
}

/// Settings shared by every case of a run
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub system_prompt: String,
    pub max_steps: usize,
    pub temperature: Option<f32>,
    pub max_tokens: Option<usize>,
}

impl Default for RunOptions {
    fn default() -> Self {
        let invoke = InvokeOptions::default();
        Self {
            system_prompt: invoke.system_prompt,
            max_steps: invoke.max_steps,
            temperature: invoke.temperature,
            max_tokens: invoke.max_tokens,
        }
    }
}

impl RunOptions {
    pub fn from_config(config: &BenchConfig) -> Self {
        Self {
            system_prompt: config.run.system_prompt.clone(),
            max_steps: config.run.max_steps,
            temperature: config.llm.temperature,
            max_tokens: config.llm.max_tokens,
        }
    }

    fn for_model(&self, model: &CandidateModel) -> InvokeOptions {
        InvokeOptions {
            system_prompt: self.system_prompt.clone(),
            max_steps: self.max_steps,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            provider_options: model.provider_options.clone(),
        }
    }
}

/// Runs a fixed suite against candidate models
pub struct EvalRunner {
    suite: Arc<[TestCase]>,
    registry: Arc<ToolRegistry>,
    options: RunOptions,
}

impl EvalRunner {
    /// Create a runner after checking the suite against the registry
    ///
    /// # Errors
    ///
    /// Returns `BenchError::Suite` if the suite is malformed.
    pub fn new(suite: Vec<TestCase>, registry: Arc<ToolRegistry>) -> Result<Self> {
        validate_suite(&suite, &registry)?;
        Ok(Self {
            suite: suite.into(),
            registry,
            options: RunOptions::default(),
        })
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    pub fn suite(&self) -> &[TestCase] {
        &self.suite
    }

    /// Run every case against `model`, returning results in suite order.
    ///
    /// Never fails: invocation errors and panics are folded into the results.
    pub async fn run_model(&self, model: &CandidateModel) -> Vec<CaseResult> {
        let options = Arc::new(self.options.for_model(model));

        let handles: Vec<_> = (0..self.suite.len())
            .map(|index| {
                let suite = Arc::clone(&self.suite);
                let registry = Arc::clone(&self.registry);
                let provider = Arc::clone(&model.provider);
                let options = Arc::clone(&options);
                tokio::spawn(async move {
                    run_case(provider.as_ref(), &registry, &options, &suite[index]).await
                })
            })
            .collect();

        join_all(handles)
            .await
            .into_iter()
            .zip(self.suite.iter())
            .map(|(joined, case)| match joined {
                Ok(result) => result,
                Err(e) => {
                    warn!(model = %model.name, case = %case.id, error = %e, "Case task failed");
                    CaseResult::fail(&case.id, format!("Task panicked: {}", e), None)
                }
            })
            .collect()
    }

    /// Run all models in order, reporting each batch before starting the next.
    ///
    /// # Errors
    ///
    /// Returns the first reporter error. Case failures are never errors.
    pub async fn run_all(
        &self,
        models: &[CandidateModel],
        reporters: &mut [Box<dyn Reporter>],
    ) -> Result<Aggregate> {
        let mut aggregate = Aggregate::new();

        for model in models {
            info!(
                model = %model.name,
                cases = self.suite.len(),
                reasoning = model.reasoning,
                "Evaluating model"
            );
            let start = Instant::now();
            let results = self.run_model(model).await;
            let summary = summarize(&results);
            info!(
                model = %model.name,
                passed = summary.passed,
                total = summary.total,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Model finished"
            );

            for reporter in reporters.iter_mut() {
                reporter.report_model(&model.name, &results, &summary)?;
            }
            aggregate.insert(&model.name, summary);
        }

        for reporter in reporters.iter_mut() {
            reporter.report_aggregate(&aggregate)?;
        }
        Ok(aggregate)
    }
}

async fn run_case(
    provider: &dyn LLMProvider,
    registry: &ToolRegistry,
    options: &InvokeOptions,
    case: &TestCase,
) -> CaseResult {
    match invoke_with_tools(provider, registry, options, &case.prompt).await {
        Ok(invocation) => {
            let result = evaluate(case, &record(&invocation));
            debug!(
                case = %case.id,
                passed = result.passed,
                calls = invocation.tool_calls.len(),
                steps = invocation.steps,
                "Case evaluated"
            );
            result
        }
        Err(e) => {
            warn!(case = %case.id, error = %e, "Model invocation failed");
            CaseResult::fail(&case.id, e.to_string(), None)
        }
    }
}
