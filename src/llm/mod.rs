//! LLM module - Language Model integrations
//!
//! Provides the provider abstraction, the OpenAI-compatible client and the
//! disk-backed response cache that wraps it.

pub mod cache;
pub mod openai;
pub mod traits;

pub use cache::{CachedProvider, ResponseCache};
pub use openai::OpenAiClient;
pub use traits::{GenerateOptions, LLMProvider, LLMResponse};
