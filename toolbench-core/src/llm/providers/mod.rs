//! LLM provider implementations

#[cfg(feature = "llm-openrouter")]
pub mod openrouter;

#[cfg(feature = "llm-openrouter")]
pub use openrouter::OpenRouterProvider;
