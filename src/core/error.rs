//! Custom error types for Scout
//!
//! Provides a unified error handling system across all modules.

use thiserror::Error;

/// Main error type for Scout operations
#[derive(Error, Debug)]
pub enum ScoutError {
    /// LLM API errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Web search API errors
    #[error("Search error: {0}")]
    Search(String),

    /// Tool execution errors
    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required credential is absent from the environment
    #[error("Configuration error: {0} is not set. Export it or add it to a .env file.")]
    MissingCredential(&'static str),

    /// A tool-response payload did not match the expected shape
    #[error("Malformed tool payload: {0}")]
    MalformedPayload(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error for other cases
    #[error("{0}")]
    Other(String),
}

/// Convenience Result type for Scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

impl ScoutError {
    /// Create an LLM error
    pub fn llm(msg: impl Into<String>) -> Self {
        Self::Llm(msg.into())
    }

    /// Create a search error
    pub fn search(msg: impl Into<String>) -> Self {
        Self::Search(msg.into())
    }

    /// Create a tool execution error
    pub fn tool(msg: impl Into<String>) -> Self {
        Self::ToolExecution(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
