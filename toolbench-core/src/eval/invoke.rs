//! Model invocation with tools
//!
//! Sends one prompt with the full tool set and keeps the conversation going
//! while the model asks for tools: each requested call is executed against the
//! registry and its result (or error) is returned to the model as a tool
//! message. Every call from every step is kept, in order.

use crate::error::Result;
use crate::llm::{LLMProvider, LLMRequest, Message, ToolCallRequest};
use crate::tools::ToolRegistry;
use serde_json::Value;
use tracing::debug;

/// Per-request settings for [`invoke_with_tools`]
#[derive(Debug, Clone)]
pub struct InvokeOptions {
    pub system_prompt: String,

    /// Maximum model round trips (at least one is always made)
    pub max_steps: usize,

    pub temperature: Option<f32>,

    pub max_tokens: Option<usize>,

    /// Merged into the provider request body
    pub provider_options: Option<Value>,
}

impl Default for InvokeOptions {
    fn default() -> Self {
        Self {
            system_prompt: crate::config::DEFAULT_SYSTEM_PROMPT.to_string(),
            max_steps: 5,
            temperature: None,
            max_tokens: None,
            provider_options: None,
        }
    }
}

/// What one prompt produced
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    /// Tool calls across all steps, in emission order
    pub tool_calls: Vec<ToolCallRequest>,

    /// Final text from the model
    pub text: String,

    /// Model round trips made
    pub steps: usize,
}

/// Run `prompt` against `provider` with every tool in `registry` available.
///
/// # Errors
///
/// Returns the provider's error from any step. Tool failures are not errors:
/// they are reported back to the model.
pub async fn invoke_with_tools(
    provider: &dyn LLMProvider,
    registry: &ToolRegistry,
    options: &InvokeOptions,
    prompt: &str,
) -> Result<Invocation> {
    let mut request = LLMRequest::with_system_prompt(&options.system_prompt, prompt)
        .with_tools(registry.definitions())
        .with_provider_options(options.provider_options.clone());
    request.temperature = options.temperature.map(|t| t.clamp(0.0, 2.0));
    request.max_tokens = options.max_tokens;

    let mut invocation = Invocation::default();
    let max_steps = options.max_steps.max(1);

    while invocation.steps < max_steps {
        let response = provider.generate_request(&request).await?;
        invocation.steps += 1;
        invocation.text = response.content.clone();

        if response.tool_calls.is_empty() {
            break;
        }
        invocation.tool_calls.extend(response.tool_calls.iter().cloned());

        if invocation.steps == max_steps {
            debug!(steps = max_steps, "Step limit reached with tool calls pending");
            break;
        }

        request
            .messages
            .push(Message::assistant(response.content, response.tool_calls.clone()));
        for call in response.tool_calls {
            let payload = match registry.execute(&call.name, call.arguments).await {
                Ok(value) => value,
                Err(e) => {
                    debug!(tool = %call.name, error = %e, "Tool call failed");
                    e.to_payload()
                }
            };
            request
                .messages
                .push(Message::tool_result(call.id, payload.to_string()));
        }
    }

    Ok(invocation)
}
