//! Scripted provider for offline evaluation
//!
//! Stands in for a real model: responses are looked up by the request's user
//! prompt and by step (the number of assistant turns already in the
//! conversation), so a script is stateless with respect to concurrent callers.

use crate::error::{BenchError, Result};
use crate::llm::{LLMProvider, LLMRequest, LLMResponse, MessageRole, ModelInfo};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// One scripted model turn
#[derive(Debug, Clone)]
pub enum ScriptedStep {
    /// Return this response
    Respond(LLMResponse),
    /// Fail with a provider error carrying this message
    Fail(String),
}

/// Provider returning predetermined responses per prompt
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    name: String,
    scripts: HashMap<String, Vec<ScriptedStep>>,
    fallback: Option<LLMResponse>,
    delay: Option<Duration>,
    call_count: AtomicUsize,
    requests: Mutex<Vec<LLMRequest>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            name: "scripted".to_string(),
            ..Default::default()
        }
    }

    /// Model name reported by `model_info`
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Append a response to the script for `prompt`
    pub fn respond(self, prompt: impl Into<String>, response: LLMResponse) -> Self {
        self.step(prompt, ScriptedStep::Respond(response))
    }

    /// Append a failure to the script for `prompt`
    pub fn fail(self, prompt: impl Into<String>, message: impl Into<String>) -> Self {
        self.step(prompt, ScriptedStep::Fail(message.into()))
    }

    pub fn step(mut self, prompt: impl Into<String>, step: ScriptedStep) -> Self {
        self.scripts.entry(prompt.into()).or_default().push(step);
        self
    }

    /// Response for prompts that have no script. Without one they fail.
    pub fn with_fallback(mut self, response: LLMResponse) -> Self {
        self.fallback = Some(response);
        self
    }

    /// Simulated latency per request
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of requests received
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Requests received, in arrival order
    pub fn requests(&self) -> Vec<LLMRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn lookup(&self, request: &LLMRequest) -> Result<LLMResponse> {
        let prompt = request
            .messages
            .iter()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();
        let step = request
            .messages
            .iter()
            .filter(|m| m.role == MessageRole::Assistant)
            .count();

        match self.scripts.get(prompt) {
            Some(script) => match script.get(step) {
                Some(ScriptedStep::Respond(response)) => Ok(response.clone()),
                Some(ScriptedStep::Fail(message)) => Err(BenchError::Provider(message.clone())),
                // Script exhausted: the model stops calling tools.
                None => Ok(LLMResponse::default()),
            },
            None => self.fallback.clone().ok_or_else(|| {
                BenchError::Provider(format!("No scripted response for prompt: {}", prompt))
            }),
        }
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn generate_request(&self, request: &LLMRequest) -> Result<LLMResponse> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.lookup(request)
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            provider: "scripted".to_string(),
            model_name: self.name.clone(),
        }
    }
}
