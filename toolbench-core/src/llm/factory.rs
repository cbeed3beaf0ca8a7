//! Factory for creating LLM providers from configuration

use crate::config::{LLMProvider as LLMProviderType, LLMProviderConfig, ModelConfig};
use crate::error::Result;
use crate::llm::LLMProvider;
use std::sync::Arc;

#[cfg(feature = "llm-openrouter")]
use crate::llm::providers::openrouter::{OPENAI_BASE_URL, OPENROUTER_BASE_URL, OpenRouterProvider};

/// Factory for creating LLM providers
pub struct LLMProviderFactory;

impl LLMProviderFactory {
    /// Create the provider handle for one candidate model
    ///
    /// # Arguments
    ///
    /// * `config` - Shared transport configuration
    /// * `model` - The candidate model entry
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be created (e.g., missing API key)
    pub fn create(config: &LLMProviderConfig, model: &ModelConfig) -> Result<Arc<dyn LLMProvider>> {
        match config.provider {
            #[cfg(feature = "llm-openrouter")]
            LLMProviderType::OpenRouter | LLMProviderType::OpenAI => {
                let (key_var, default_url) = match config.provider {
                    LLMProviderType::OpenAI => ("OPENAI_API_KEY", OPENAI_BASE_URL),
                    LLMProviderType::OpenRouter => ("OPENROUTER_API_KEY", OPENROUTER_BASE_URL),
                };

                let api_key = resolve_api_key(config, key_var, std::env::var(key_var).ok())?;

                let base_url = config.base_url.as_deref().unwrap_or(default_url);
                let mut provider =
                    OpenRouterProvider::with_base_url(api_key, model.model.clone(), base_url);

                if let Some(timeout) = config.request_timeout {
                    provider = provider.with_timeout(timeout)?;
                }

                Ok(Arc::new(provider))
            }

            #[cfg(not(feature = "llm-openrouter"))]
            LLMProviderType::OpenRouter | LLMProviderType::OpenAI => {
                let _ = model;
                Err(crate::error::BenchError::Configuration(
                    "OpenAI-compatible providers require the 'llm-openrouter' feature".to_string(),
                ))
            }
        }
    }
}

/// Explicit `api_key` wins over the environment value read from `key_var`
#[cfg(feature = "llm-openrouter")]
fn resolve_api_key(
    config: &LLMProviderConfig,
    key_var: &str,
    from_env: Option<String>,
) -> Result<String> {
    config.api_key.clone().or(from_env).ok_or_else(|| {
        crate::error::BenchError::Configuration(format!("{} environment variable not set", key_var))
    })
}
