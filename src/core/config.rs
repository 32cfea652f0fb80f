//! Configuration management for Scout
//!
//! Supports environment variables, config files, and runtime overrides.
//! API credentials are only ever read from the environment.
//!
//! Config file location: ~/.config/scout/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::core::error::{Result, ScoutError};

/// Environment variable holding the LLM API key
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
/// Environment variable holding the search API key
pub const TAVILY_API_KEY: &str = "TAVILY_API_KEY";

/// Main configuration for Scout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// LLM endpoint configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Model configuration
    #[serde(default)]
    pub models: ModelConfig,
    /// Web search configuration
    #[serde(default)]
    pub search: SearchConfig,
    /// Agent configuration
    #[serde(default)]
    pub agent: AgentConfig,
    /// Response cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
}

/// OpenAI-compatible endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the chat-completions API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Sampling temperature
    pub temperature: Option<f32>,
}

/// Models tried in order for every request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Ordered config list; later entries are fallbacks
    pub config_list: Vec<String>,
}

/// Search provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Base URL of the Tavily API
    pub base_url: String,
    /// "basic" or "advanced"
    pub search_depth: String,
    /// Maximum number of results requested per query
    pub max_results: usize,
    /// Token budget of the context returned to the assistant
    pub max_tokens: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Agent behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Maximum automatic replies from the user proxy per chat
    /// Default: 10
    pub max_consecutive_auto_reply: usize,
    /// Marker that ends a conversation
    pub termination_marker: String,
    /// Replaces the built-in assistant system message
    pub system_message: Option<String>,
    /// Whether to show debug output
    pub debug: bool,
}

/// Disk cache for LLM responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Namespace for cached entries
    pub seed: u64,
    /// Root directory of the cache
    pub dir: PathBuf,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            timeout_secs: 120,
            temperature: None,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        let config_list = match env::var("SCOUT_MODELS") {
            Ok(models) => parse_model_list(&models),
            Err(_) => vec!["gpt-4o".to_string(), "gpt-4o-mini".to_string()],
        };
        Self { config_list }
    }
}

/// Comma-separated model names, blanks dropped
fn parse_model_list(models: &str) -> Vec<String> {
    models
        .split(',')
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .collect()
}

fn parse_debug_flag(value: &str) -> bool {
    value == "true" || value == "1"
}

fn parse_cache_flag(value: &str) -> bool {
    value != "false" && value != "0"
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: env::var("TAVILY_BASE_URL")
                .unwrap_or_else(|_| "https://api.tavily.com".to_string()),
            search_depth: "advanced".to_string(),
            max_results: 5,
            max_tokens: 4000,
            timeout_secs: 60,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_consecutive_auto_reply: 10,
            termination_marker: "TERMINATE".to_string(),
            system_message: None,
            debug: env::var("SCOUT_DEBUG")
                .map(|v| parse_debug_flag(&v))
                .unwrap_or(false),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: env::var("SCOUT_CACHE")
                .map(|v| parse_cache_flag(&v))
                .unwrap_or(true),
            seed: 43,
            dir: PathBuf::from(".cache"),
        }
    }
}

/// API keys required by the collaborators
#[derive(Clone)]
pub struct Credentials {
    pub openai_api_key: String,
    pub tavily_api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("openai_api_key", &"<redacted>")
            .field("tavily_api_key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Read credentials from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read credentials through an arbitrary lookup; blank values count as missing
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &'static str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ScoutError::MissingCredential(key))
        };

        Ok(Self {
            openai_api_key: require(OPENAI_API_KEY)?,
            tavily_api_key: require(TAVILY_API_KEY)?,
        })
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("scout")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load() -> Result<Self> {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        let config = if Self::config_file().exists() {
            let mut config = Self::load_from_file()?;
            config.apply_env(|key| env::var(key).ok());
            config
        } else {
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file only
    pub fn load_from_file() -> Result<Self> {
        let config_path = Self::config_file();

        let content = fs::read_to_string(&config_path)
            .map_err(|e| ScoutError::config(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text; missing sections and fields take defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| ScoutError::config(format!("Failed to parse config: {}", e)))
    }

    /// Override file values with the environment variables that are set
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("OPENAI_BASE_URL") {
            self.llm.base_url = url;
        }
        if let Some(url) = lookup("TAVILY_BASE_URL") {
            self.search.base_url = url;
        }
        if let Some(models) = lookup("SCOUT_MODELS") {
            self.models.config_list = parse_model_list(&models);
        }
        if let Some(debug) = lookup("SCOUT_DEBUG") {
            self.agent.debug = parse_debug_flag(&debug);
        }
        if let Some(cache) = lookup("SCOUT_CACHE") {
            self.cache.enabled = parse_cache_flag(&cache);
        }
    }

    /// Check values that would otherwise fail deep inside a request
    pub fn validate(&self) -> Result<()> {
        if self.models.config_list.is_empty() {
            return Err(ScoutError::config("models.config_list must not be empty"));
        }

        for (name, value) in [
            ("llm.base_url", &self.llm.base_url),
            ("search.base_url", &self.search.base_url),
        ] {
            url::Url::parse(value)
                .map_err(|e| ScoutError::config(format!("Invalid {} '{}': {}", name, value, e)))?;
        }

        if !matches!(self.search.search_depth.as_str(), "basic" | "advanced") {
            return Err(ScoutError::config(format!(
                "search.search_depth must be 'basic' or 'advanced', got '{}'",
                self.search.search_depth
            )));
        }

        if self.agent.termination_marker.trim().is_empty() {
            return Err(ScoutError::config("agent.termination_marker must not be empty"));
        }

        Ok(())
    }

    /// Replace the model config list
    pub fn set_models(&mut self, models: Vec<String>) {
        self.models.config_list = models;
    }
}
