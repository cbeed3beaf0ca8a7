//! Configuration types for toolbench

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{BenchError, Result};

/// System prompt sent with every test case unless overridden
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant with access to tools. \
Call a tool only when it is needed to fulfil the user's request, with arguments taken \
from the request. If no tool is needed, answer directly without calling any tool.";

/// Main configuration for a benchmark run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Model transport configuration
    #[serde(default)]
    pub llm: LLMProviderConfig,

    /// Run behaviour and output
    #[serde(default)]
    pub run: RunConfig,

    /// Candidate models, in evaluation order
    #[serde(default = "default_models")]
    pub models: Vec<ModelConfig>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            llm: LLMProviderConfig::default(),
            run: RunConfig::default(),
            models: default_models(),
        }
    }
}

/// LLM provider configuration shared by all candidate models
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMProviderConfig {
    /// Provider type
    #[serde(default)]
    pub provider: LLMProvider,

    /// API key (if needed, prefer env vars)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL (for custom OpenAI-compatible endpoints)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Transport timeout per request. The harness itself enforces none.
    #[serde(default, with = "humantime_serde")]
    pub request_timeout: Option<Duration>,

    /// Sampling temperature (0.0-2.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum tokens per response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<usize>,
}

impl Default for LLMProviderConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::OpenRouter,
            api_key: None,
            base_url: None,
            request_timeout: None,
            temperature: None,
            max_tokens: None,
        }
    }
}

/// LLM provider type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LLMProvider {
    #[default]
    OpenRouter,
    OpenAI,
}

/// Run behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// System prompt sent with every case
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Maximum model round trips per case (tool results are fed back between steps)
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,

    /// Directory for result files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Write per-model and summary JSON files
    #[serde(default = "default_true")]
    pub write_files: bool,
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

fn default_max_steps() -> usize {
    5
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_true() -> bool {
    true
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            max_steps: default_max_steps(),
            output_dir: default_output_dir(),
            write_files: true,
        }
    }
}

/// A candidate model entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Unique name, used as the report key and result file name
    pub name: String,

    /// Provider model identifier (e.g. "anthropic/claude-sonnet-4")
    pub model: String,

    /// Whether the model reasons before answering (informational)
    #[serde(default)]
    pub reasoning: bool,

    /// Provider-specific options merged into each request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_options: Option<Value>,
}

impl ModelConfig {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            reasoning: false,
            provider_options: None,
        }
    }

    pub fn with_reasoning(mut self, reasoning: bool) -> Self {
        self.reasoning = reasoning;
        self
    }

    pub fn with_provider_options(mut self, options: Value) -> Self {
        self.provider_options = Some(options);
        self
    }
}

/// Built-in model registry
pub fn default_models() -> Vec<ModelConfig> {
    vec![
        ModelConfig::new("grok-4", "x-ai/grok-4").with_reasoning(true),
        ModelConfig::new("gemini-2.0-flash", "google/gemini-2.0-flash-001"),
        ModelConfig::new("gemini-2.5-pro", "google/gemini-2.5-pro-preview").with_reasoning(true),
        ModelConfig::new("grok-3-mini", "x-ai/grok-3-mini-beta").with_reasoning(true),
        ModelConfig::new("qwen-3-32b", "qwen/qwen3-32b").with_reasoning(true),
        ModelConfig::new("claude-4-sonnet", "anthropic/claude-sonnet-4").with_reasoning(true),
        ModelConfig::new("claude-4-opus", "anthropic/claude-opus-4").with_reasoning(true),
        ModelConfig::new("claude-3-5-sonnet", "anthropic/claude-3.5-sonnet"),
        ModelConfig::new("claude-3-7-sonnet", "anthropic/claude-3.7-sonnet"),
        ModelConfig::new("claude-3-7-sonnet-thinking", "anthropic/claude-3.7-sonnet:thinking")
            .with_reasoning(true),
        ModelConfig::new("o4-mini", "openai/o4-mini").with_reasoning(true),
    ]
}

impl BenchConfig {
    /// Load configuration from file and environment variables.
    ///
    /// Loads in this order:
    /// 1. Defaults
    /// 2. `toolbench.toml` in the working directory
    /// 3. File at `TOOLBENCH_CONFIG_PATH`, if set
    /// 4. `TOOLBENCH_`-prefixed environment variables (`__` separates sections,
    ///    e.g. `TOOLBENCH_RUN__MAX_STEPS=3`)
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration source is invalid.
    pub fn load() -> Result<Self> {
        use figment::{
            Figment,
            providers::{Env, Format, Toml},
        };

        let mut figment = Figment::new().merge(Toml::file("toolbench.toml"));

        if let Ok(path) = std::env::var("TOOLBENCH_CONFIG_PATH") {
            figment = figment.merge(Toml::file(path));
        }

        let config: BenchConfig = figment
            .merge(Env::prefixed("TOOLBENCH_").ignore(&["CONFIG_PATH"]).split("__"))
            .extract()
            .map_err(|e| BenchError::Configuration(format!("Failed to load configuration: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    ///
    /// TOML, YAML and JSON are recognised by extension; anything else is read as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        use figment::{
            Figment,
            providers::{Format, Json, Toml, Yaml},
        };

        let path = path.as_ref();
        if !path.exists() {
            return Err(BenchError::Configuration(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let figment = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Figment::new().merge(Yaml::file(path)),
            Some("json") => Figment::new().merge(Json::file(path)),
            _ => Figment::new().merge(Toml::file(path)),
        };

        let config: BenchConfig = figment.extract().map_err(|e| {
            BenchError::Configuration(format!("Failed to load configuration file: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error on an empty or ambiguous model registry or invalid run limits.
    pub fn validate(&self) -> Result<()> {
        if self.models.is_empty() {
            return Err(BenchError::Configuration("No models configured".to_string()));
        }

        let mut seen = HashSet::new();
        let mut stems: HashMap<String, &str> = HashMap::new();
        for model in &self.models {
            if model.name.trim().is_empty() {
                return Err(BenchError::Configuration("Model name must not be empty".to_string()));
            }
            if !seen.insert(model.name.as_str()) {
                return Err(BenchError::Configuration(format!(
                    "Duplicate model name: {}",
                    model.name
                )));
            }
            let stem = result_file_stem(&model.name);
            if let Some(other) = stems.insert(stem.clone(), &model.name) {
                return Err(BenchError::Configuration(format!(
                    "Models '{}' and '{}' would share result file {}.json",
                    other, model.name, stem
                )));
            }
        }

        if self.run.max_steps == 0 {
            return Err(BenchError::Configuration(
                "run.max_steps must be at least 1".to_string(),
            ));
        }

        if let Some(t) = self.llm.temperature
            && !(0.0..=2.0).contains(&t)
        {
            return Err(BenchError::Configuration(format!(
                "llm.temperature must be within 0.0-2.0, got {}",
                t
            )));
        }

        Ok(())
    }

    /// Select models by name, preserving registry order.
    ///
    /// An empty selection returns every configured model.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first unknown model.
    pub fn select_models(&self, names: &[String]) -> Result<Vec<ModelConfig>> {
        if names.is_empty() {
            return Ok(self.models.clone());
        }

        if let Some(unknown) = names
            .iter()
            .find(|n| !self.models.iter().any(|m| &m.name == *n))
        {
            return Err(BenchError::Configuration(format!("Unknown model: {}", unknown)));
        }

        Ok(self
            .models
            .iter()
            .filter(|m| names.contains(&m.name))
            .cloned()
            .collect())
    }
}

/// File name stem for a model's result file; path separators become `_`
pub fn result_file_stem(model: &str) -> String {
    model
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = BenchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.models.len(), 11);
        assert_eq!(config.run.max_steps, 5);
        assert_eq!(config.llm.provider, LLMProvider::OpenRouter);
    }

    #[test]
    fn test_from_file_overrides_models() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[llm]
provider = "openai"
request_timeout = "30s"

[run]
max_steps = 2
output_dir = "out"

[[models]]
name = "mini"
model = "openai/gpt-4.1-mini"

[[models]]
name = "thinker"
model = "anthropic/claude-3.7-sonnet:thinking"
reasoning = true
"#
        )
        .unwrap();

        let config = BenchConfig::from_file(file.path()).unwrap();
        assert_eq!(config.llm.provider, LLMProvider::OpenAI);
        assert_eq!(config.llm.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.run.max_steps, 2);
        assert_eq!(config.run.output_dir, PathBuf::from("out"));
        assert_eq!(config.run.system_prompt, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(config.models.len(), 2);
        assert!(config.models[1].reasoning);
    }

    #[test]
    fn test_from_file_missing() {
        let result = BenchConfig::from_file("/nonexistent/toolbench.toml");
        assert!(matches!(result, Err(BenchError::Configuration(_))));
    }

    #[test]
    fn test_duplicate_model_names_rejected() {
        let config = BenchConfig {
            models: vec![ModelConfig::new("a", "x/a"), ModelConfig::new("a", "x/b")],
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Duplicate model name: a"));
    }

    #[test]
    fn test_result_file_collision_rejected() {
        let config = BenchConfig {
            models: vec![ModelConfig::new("a/b", "x/a"), ModelConfig::new("a_b", "x/b")],
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, BenchError::Configuration(_)));
        assert!(err.to_string().contains("'a/b' and 'a_b' would share result file a_b.json"));
    }

    #[test]
    fn test_result_file_stem() {
        assert_eq!(result_file_stem("openai/o4-mini"), "openai_o4-mini");
        assert_eq!(result_file_stem(r"a\b"), "a_b");
        assert_eq!(result_file_stem("grok-4"), "grok-4");
    }

    #[test]
    fn test_zero_max_steps_rejected() {
        let mut config = BenchConfig::default();
        config.run.max_steps = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_select_models_preserves_registry_order() {
        let config = BenchConfig::default();
        let selected = config
            .select_models(&["o4-mini".to_string(), "grok-4".to_string()])
            .unwrap();
        let names: Vec<_> = selected.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["grok-4", "o4-mini"]);
    }

    #[test]
    fn test_select_unknown_model() {
        let config = BenchConfig::default();
        let err = config.select_models(&["gpt-9".to_string()]).unwrap_err();
        assert!(err.to_string().contains("Unknown model: gpt-9"));
    }
}
