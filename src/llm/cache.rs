//! Disk-backed LLM response cache
//!
//! Responses are stored as JSON under `<dir>/<seed>/<sha256>.json`, keyed by
//! the provider's cache scope (its model list) and the serialized request.
//! A different seed gives a fresh namespace.

use async_trait::async_trait;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

use crate::core::config::CacheConfig;
use crate::core::{Message, Result, ToolDefinition};
use crate::llm::traits::{GenerateOptions, LLMProvider, LLMResponse};

/// File-per-entry response store
#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: PathBuf,
}

#[derive(Serialize)]
struct CacheKey<'a> {
    scope: &'a str,
    messages: &'a [Message],
    tools: &'a [ToolDefinition],
    options: &'a Option<GenerateOptions>,
}

impl ResponseCache {
    /// Open (lazily) the cache namespace for a seed
    pub fn new(root: impl AsRef<Path>, seed: u64) -> Self {
        Self {
            dir: root.as_ref().join(seed.to_string()),
        }
    }

    /// Open the cache described by configuration
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(&config.dir, config.seed)
    }

    /// Directory holding this namespace
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Compute the key of a request sent to the provider identified by `scope`
    pub fn key(
        scope: &str,
        messages: &[Message],
        tools: &[ToolDefinition],
        options: &Option<GenerateOptions>,
    ) -> Result<String> {
        let payload = serde_json::to_vec(&CacheKey {
            scope,
            messages,
            tools,
            options,
        })?;
        Ok(hex::encode(Sha256::digest(&payload)))
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Look up a stored response; missing entries are `Ok(None)`
    pub async fn get(&self, key: &str) -> Result<Option<LLMResponse>> {
        let content = match fs::read_to_string(self.entry_path(key)).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Store a response
    pub async fn put(&self, key: &str, response: &LLMResponse) -> Result<()> {
        fs::create_dir_all(&self.dir).await?;
        fs::write(self.entry_path(key), serde_json::to_string(response)?).await?;
        Ok(())
    }
}

/// Provider wrapper that serves repeated requests from a [`ResponseCache`]
pub struct CachedProvider {
    inner: Arc<dyn LLMProvider>,
    cache: ResponseCache,
}

impl CachedProvider {
    pub fn new(inner: Arc<dyn LLMProvider>, cache: ResponseCache) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl LLMProvider for CachedProvider {
    async fn chat_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        let scope = self.inner.cache_scope();
        let key = ResponseCache::key(&scope, messages, tools, &options)?;

        match self.cache.get(&key).await {
            Ok(Some(hit)) => {
                tracing::debug!(key = %key, "cache hit");
                return Ok(hit);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(key = %key, error = %e, "unreadable cache entry, ignoring"),
        }

        let response = self.inner.chat_with_tools(messages, tools, options).await?;

        if let Err(e) = self.cache.put(&key, &response).await {
            tracing::warn!(key = %key, error = %e, "failed to write cache entry");
        }

        Ok(response)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn cache_scope(&self) -> String {
        self.inner.cache_scope()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: AtomicUsize,
        scope: &'static str,
    }

    impl CountingProvider {
        fn new(scope: &'static str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                scope,
            })
        }
    }

    #[async_trait]
    impl LLMProvider for CountingProvider {
        async fn chat_with_tools(
            &self,
            messages: &[Message],
            _tools: &[ToolDefinition],
            _options: Option<GenerateOptions>,
        ) -> Result<LLMResponse> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(LLMResponse::text(
                self.scope,
                format!("reply {} to {}", n, messages.len()),
            ))
        }

        fn name(&self) -> &str {
            "counting"
        }

        fn cache_scope(&self) -> String {
            self.scope.to_string()
        }
    }

    #[test]
    fn test_key_is_stable_and_request_sensitive() {
        let a = ResponseCache::key("gpt-4o", &[Message::user("hi")], &[], &None).unwrap();
        let b = ResponseCache::key("gpt-4o", &[Message::user("hi")], &[], &None).unwrap();
        let c = ResponseCache::key("gpt-4o", &[Message::user("hello")], &[], &None).unwrap();
        let d = ResponseCache::key("gpt-4o-mini", &[Message::user("hi")], &[], &None).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_seed_namespaces_directory() {
        let cache = ResponseCache::new("/tmp/scout-cache", 43);
        assert!(cache.dir().ends_with("43"));
    }

    #[tokio::test]
    async fn test_second_request_served_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let inner = CountingProvider::new("counting");
        let provider = CachedProvider::new(inner.clone(), ResponseCache::new(dir.path(), 7));
        let messages = [Message::system("sys"), Message::user("question")];

        let first = provider.chat_with_tools(&messages, &[], None).await.unwrap();
        let second = provider.chat_with_tools(&messages, &[], None).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);

        provider
            .chat_with_tools(&[Message::user("other")], &[], None)
            .await
            .unwrap();
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_corrupt_entry_falls_through() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(dir.path(), 1);
        let messages = [Message::user("q")];
        let key = ResponseCache::key("counting", &messages, &[], &None).unwrap();
        std::fs::create_dir_all(cache.dir()).unwrap();
        std::fs::write(cache.dir().join(format!("{}.json", key)), "garbage").unwrap();

        let inner = CountingProvider::new("counting");
        let provider = CachedProvider::new(inner.clone(), cache.clone());
        let response = provider.chat_with_tools(&messages, &[], None).await.unwrap();

        assert_eq!(response.content, "reply 0 to 1");
        assert_eq!(cache.get(&key).await.unwrap(), Some(response));
    }

    #[tokio::test]
    async fn test_missing_entry_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(dir.path(), 43);
        assert_eq!(cache.get("absent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_switching_models_does_not_reuse_replies() {
        let dir = tempfile::tempdir().unwrap();
        let messages = [Message::system("sys"), Message::user("question")];

        let full = CountingProvider::new("gpt-4o");
        let first = CachedProvider::new(full.clone(), ResponseCache::new(dir.path(), 43))
            .chat_with_tools(&messages, &[], None)
            .await
            .unwrap();
        assert_eq!(first.model, "gpt-4o");

        let mini = CountingProvider::new("gpt-4o-mini");
        let mini_cached = CachedProvider::new(mini.clone(), ResponseCache::new(dir.path(), 43));
        let second = mini_cached.chat_with_tools(&messages, &[], None).await.unwrap();
        assert_eq!(second.model, "gpt-4o-mini");
        assert_eq!(mini.calls.load(Ordering::SeqCst), 1);

        // Same model again is a hit
        mini_cached.chat_with_tools(&messages, &[], None).await.unwrap();
        assert_eq!(mini.calls.load(Ordering::SeqCst), 1);
        assert_eq!(full.calls.load(Ordering::SeqCst), 1);
    }
}
