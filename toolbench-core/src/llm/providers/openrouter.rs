//! OpenRouter LLM provider (OpenAI-compatible chat completions with tools)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::error::{BenchError, Result};
use crate::llm::{
    LLMProvider, LLMRequest, LLMResponse, Message, MessageRole, ModelInfo, TokenUsage,
    ToolCallRequest, ToolDefinition,
};

/// Default OpenRouter API base URL
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default OpenAI API base URL
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Provider for any OpenAI-compatible chat completions endpoint.
///
/// Defaults to OpenRouter, which routes to every model in the built-in registry.
pub struct OpenRouterProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    provider_name: String,
}

impl OpenRouterProvider {
    /// Create a new OpenRouter provider.
    ///
    /// # Arguments
    ///
    /// * `api_key` - OpenRouter API key
    /// * `model` - Model slug (e.g., "anthropic/claude-sonnet-4")
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_base_url(api_key, model, OPENROUTER_BASE_URL)
    }

    /// Create with a custom base URL (for OpenAI or other compatible APIs).
    pub fn with_base_url(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into();
        let provider_name = if base_url.contains("openrouter.ai") {
            "openrouter"
        } else {
            "openai-compatible"
        };
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            provider_name: provider_name.to_string(),
        }
    }

    /// Create from environment variables.
    ///
    /// Reads `OPENROUTER_API_KEY` (required) and `OPENROUTER_BASE_URL` (optional).
    ///
    /// # Errors
    ///
    /// Returns an error if OPENROUTER_API_KEY is not set.
    pub fn from_env(model: impl Into<String>) -> Result<Self> {
        let api_key = std::env::var("OPENROUTER_API_KEY").map_err(|_| {
            BenchError::Configuration("OPENROUTER_API_KEY environment variable not set".to_string())
        })?;

        let base_url = std::env::var("OPENROUTER_BASE_URL")
            .unwrap_or_else(|_| OPENROUTER_BASE_URL.to_string());

        Ok(Self::with_base_url(api_key, model, base_url))
    }

    /// Apply a transport timeout to every request.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BenchError::Configuration(format!("Failed to build HTTP client: {}", e)))?;
        Ok(self)
    }

    /// Get the model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ChatTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<ChatToolCallOut>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Serialize)]
struct ChatToolCallOut {
    id: String,
    #[serde(rename = "type")]
    kind: &'static str,
    function: ChatFunctionOut,
}

#[derive(Serialize)]
struct ChatFunctionOut {
    name: String,
    arguments: String,
}

#[derive(Serialize)]
struct ChatTool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: ToolDefinition,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageIn,
}

#[derive(Deserialize)]
struct ChatMessageIn {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ChatToolCallIn>>,
}

#[derive(Deserialize)]
struct ChatToolCallIn {
    #[serde(default)]
    id: Option<String>,
    function: ChatFunctionIn,
}

#[derive(Deserialize)]
struct ChatFunctionIn {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Deserialize)]
struct ChatUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
    total_tokens: usize,
}

#[derive(Deserialize)]
struct ChatError {
    error: ChatErrorDetail,
}

#[derive(Deserialize)]
struct ChatErrorDetail {
    message: String,
}

fn convert_messages(messages: &[Message]) -> Vec<ChatMessage> {
    messages
        .iter()
        .map(|m| {
            let role = match m.role {
                MessageRole::System => "system",
                MessageRole::User => "user",
                MessageRole::Assistant => "assistant",
                MessageRole::Tool => "tool",
            };
            let tool_calls: Vec<ChatToolCallOut> = m
                .tool_calls
                .iter()
                .map(|c| ChatToolCallOut {
                    id: c.id.clone(),
                    kind: "function",
                    function: ChatFunctionOut {
                        name: c.name.clone(),
                        arguments: match &c.arguments {
                            Value::String(raw) => raw.clone(),
                            other => other.to_string(),
                        },
                    },
                })
                .collect();
            // Assistant turns that only carry tool calls send a null content.
            let content = if m.content.is_empty() && !tool_calls.is_empty() {
                None
            } else {
                Some(m.content.clone())
            };
            ChatMessage {
                role,
                content,
                tool_calls,
                tool_call_id: m.tool_call_id.clone(),
            }
        })
        .collect()
}

fn build_request_body(model: &str, request: &LLMRequest) -> Result<Value> {
    let chat_request = ChatRequest {
        model: model.to_string(),
        messages: convert_messages(&request.messages),
        tools: request
            .tools
            .iter()
            .map(|t| ChatTool {
                kind: "function",
                function: t.clone(),
            })
            .collect(),
        temperature: request.temperature,
        max_tokens: request.max_tokens,
    };

    let mut body = serde_json::to_value(chat_request)?;

    if let Some(options) = &request.provider_options {
        let Value::Object(options) = options else {
            return Err(BenchError::Configuration(
                "provider_options must be a JSON object".to_string(),
            ));
        };
        if let Value::Object(map) = &mut body {
            for (key, value) in options {
                map.insert(key.clone(), value.clone());
            }
        }
    }

    Ok(body)
}

fn parse_arguments(tool: &str, raw: &str) -> Value {
    if raw.trim().is_empty() {
        return Value::Object(Default::default());
    }
    serde_json::from_str(raw).unwrap_or_else(|e| {
        tracing::warn!(tool = %tool, error = %e, "malformed tool arguments JSON, keeping raw text");
        Value::String(raw.to_string())
    })
}

fn into_llm_response(response: ChatResponse) -> Result<LLMResponse> {
    let usage = response.usage.map(|u| TokenUsage {
        prompt_tokens: u.prompt_tokens,
        completion_tokens: u.completion_tokens,
        total_tokens: u.total_tokens,
    });

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| BenchError::Provider("API returned no choices".to_string()))?;

    let tool_calls = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(i, tc)| ToolCallRequest {
            id: tc.id.unwrap_or_else(|| format!("call_{}", i)),
            arguments: parse_arguments(&tc.function.name, &tc.function.arguments),
            name: tc.function.name,
        })
        .collect();

    Ok(LLMResponse {
        content: choice.message.content.unwrap_or_default(),
        tool_calls,
        usage,
    })
}

#[async_trait]
impl LLMProvider for OpenRouterProvider {
    async fn generate_request(&self, request: &LLMRequest) -> Result<LLMResponse> {
        let body = build_request_body(&self.model, request)?;
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| BenchError::Provider(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            // Auth failures may echo key fragments; keep the body out of reports.
            if status.as_u16() == 401 || status.as_u16() == 403 {
                return Err(BenchError::Provider(format!(
                    "authentication failed (HTTP {})",
                    status.as_u16()
                )));
            }

            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            if let Ok(error) = serde_json::from_str::<ChatError>(&text) {
                return Err(BenchError::Provider(format!(
                    "API error ({}): {}",
                    status, error.error.message
                )));
            }

            return Err(BenchError::Provider(format!("API error ({}): {}", status, text)));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| BenchError::Provider(format!("Failed to parse response: {}", e)))?;

        into_llm_response(chat_response)
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            provider: self.provider_name.clone(),
            model_name: self.model.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn weather_tool() -> ToolDefinition {
        ToolDefinition {
            name: "weatherInSfTool".to_string(),
            description: "A tool for getting the weather in San Francisco".to_string(),
            parameters: json!({
                "type": "object",
                "properties": { "date": { "type": "string" } },
                "required": ["date"]
            }),
        }
    }

    #[test]
    fn test_provider_creation() {
        let provider = OpenRouterProvider::new("test-key", "x-ai/grok-4");
        assert_eq!(provider.model(), "x-ai/grok-4");
        assert_eq!(provider.base_url(), OPENROUTER_BASE_URL);
        assert_eq!(provider.model_info().provider, "openrouter");
    }

    #[test]
    fn test_custom_base_url_trims_slash() {
        let provider =
            OpenRouterProvider::with_base_url("test-key", "gpt-4.1", "https://api.openai.com/v1/");
        assert_eq!(provider.base_url(), "https://api.openai.com/v1");
        assert_eq!(provider.model_info().provider, "openai-compatible");
    }

    #[test]
    fn test_build_request_with_tools() {
        let request = LLMRequest::with_system_prompt("sys", "What is the weather?")
            .with_tools(vec![weather_tool()]);

        let body = build_request_body("x-ai/grok-4", &request).unwrap();

        assert_eq!(body["model"], "x-ai/grok-4");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "What is the weather?");
        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["function"]["name"], "weatherInSfTool");
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn test_build_request_without_tools_omits_field() {
        let request = LLMRequest::with_system_prompt("sys", "hi");
        let body = build_request_body("m", &request).unwrap();
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn test_build_request_merges_provider_options() {
        let request = LLMRequest::with_system_prompt("sys", "hi")
            .with_provider_options(Some(json!({"reasoning": {"effort": "low"}})));
        let body = build_request_body("m", &request).unwrap();
        assert_eq!(body["reasoning"]["effort"], "low");
    }

    #[test]
    fn test_build_request_rejects_non_object_options() {
        let request =
            LLMRequest::with_system_prompt("sys", "hi").with_provider_options(Some(json!([1, 2])));
        assert!(build_request_body("m", &request).is_err());
    }

    #[test]
    fn test_build_request_with_tool_round_trip_messages() {
        let mut request = LLMRequest::with_system_prompt("sys", "weather please");
        request.messages.push(Message::assistant(
            "",
            vec![ToolCallRequest {
                id: "call-1".to_string(),
                name: "weatherInSfTool".to_string(),
                arguments: json!({"date": "2025-07-13"}),
            }],
        ));
        request
            .messages
            .push(Message::tool_result("call-1", "{\"success\":true}"));

        let body = build_request_body("m", &request).unwrap();
        let assistant = &body["messages"][2];
        assert_eq!(assistant["content"], Value::Null);
        assert_eq!(assistant["tool_calls"][0]["id"], "call-1");
        assert_eq!(
            assistant["tool_calls"][0]["function"]["arguments"],
            "{\"date\":\"2025-07-13\"}"
        );
        assert_eq!(body["messages"][3]["role"], "tool");
        assert_eq!(body["messages"][3]["tool_call_id"], "call-1");
    }

    #[test]
    fn test_parse_tool_call_response() {
        let response: ChatResponse = serde_json::from_value(json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [
                        {"id": "a", "type": "function",
                         "function": {"name": "weatherInSfTool", "arguments": "{\"date\":\"2025-07-14\"}"}},
                        {"id": "b", "type": "function",
                         "function": {"name": "fileTool", "arguments": "{\"name\":\"weather.txt\"}"}}
                    ]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }))
        .unwrap();

        let parsed = into_llm_response(response).unwrap();
        assert_eq!(parsed.content, "");
        assert_eq!(parsed.tool_calls.len(), 2);
        assert_eq!(parsed.tool_calls[0].name, "weatherInSfTool");
        assert_eq!(parsed.tool_calls[0].arguments, json!({"date": "2025-07-14"}));
        assert_eq!(parsed.tool_calls[1].id, "b");
        assert_eq!(parsed.usage.unwrap().total_tokens, 15);
    }

    #[test]
    fn test_parse_malformed_arguments_kept_raw() {
        let response: ChatResponse = serde_json::from_value(json!({
            "choices": [{
                "message": {
                    "tool_calls": [
                        {"function": {"name": "searchTool", "arguments": "{query: AI"}}
                    ]
                }
            }]
        }))
        .unwrap();

        let parsed = into_llm_response(response).unwrap();
        assert_eq!(parsed.tool_calls[0].id, "call_0");
        assert_eq!(parsed.tool_calls[0].arguments, json!("{query: AI"));
    }

    #[test]
    fn test_parse_empty_arguments_as_object() {
        assert_eq!(parse_arguments("t", ""), json!({}));
    }

    #[test]
    fn test_parse_empty_choices_errors() {
        let response: ChatResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        let err = into_llm_response(response).unwrap_err();
        assert!(matches!(err, BenchError::Provider(_)));
    }
}
