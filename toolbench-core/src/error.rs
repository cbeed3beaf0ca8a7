//! Error types for toolbench operations

/// Result type for toolbench operations
pub type Result<T> = std::result::Result<T, BenchError>;

/// Error types for the evaluation harness
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    /// Configuration error (fatal at startup)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Model provider failed (transport, API or malformed response)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Test suite is malformed
    #[error("Suite error: {0}")]
    Suite(String),

    /// Tool registration or lookup failed
    #[error("Tool error: {0}")]
    Tool(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for BenchError {
    fn from(s: String) -> Self {
        BenchError::Other(s)
    }
}

impl From<&str> for BenchError {
    fn from(s: &str) -> Self {
        BenchError::Other(s.to_string())
    }
}

impl From<anyhow::Error> for BenchError {
    fn from(err: anyhow::Error) -> Self {
        BenchError::Other(err.to_string())
    }
}

impl From<reqwest::Error> for BenchError {
    fn from(err: reqwest::Error) -> Self {
        BenchError::Provider(err.to_string())
    }
}
