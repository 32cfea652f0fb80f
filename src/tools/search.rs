//! Web search tool backed by the Tavily API
//!
//! The tool hands the assistant a JSON array of `{url, content}` objects,
//! trimmed to a token budget. The same payload is later decoded by the
//! response extractor to list the sources of an answer.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::config::SearchConfig;
use crate::core::{Result, ScoutError};

/// Name the search tool is registered under
pub const SEARCH_TOOL_NAME: &str = "search_tool";

/// A search backend that returns a serialized context for a query
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Search the web and return the serialized result context
    async fn search_context(&self, query: &str) -> Result<String>;

    /// Get the provider name
    fn name(&self) -> &str;
}

/// One source handed to the assistant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextItem {
    pub url: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    search_depth: &'a str,
    max_results: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    url: String,
    #[serde(default)]
    content: String,
}

/// Tavily API client
pub struct TavilyClient {
    client: Client,
    base_url: String,
    api_key: String,
    search_depth: String,
    max_results: usize,
    max_tokens: usize,
}

impl TavilyClient {
    /// Create a client from configuration and an API key
    pub fn from_config(config: &SearchConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            search_depth: config.search_depth.clone(),
            max_results: config.max_results,
            max_tokens: config.max_tokens,
        })
    }

    /// Run a search and return the raw result list
    pub async fn search(&self, query: &str) -> Result<Vec<ContextItem>> {
        let request = SearchRequest {
            query,
            search_depth: &self.search_depth,
            max_results: self.max_results,
        };

        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    ScoutError::search(format!("Cannot connect to Tavily at {}", self.base_url))
                } else {
                    ScoutError::from(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ScoutError::search(format!(
                "Tavily API error ({}): {}",
                status, error_text
            )));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| ScoutError::search(format!("Failed to parse search response: {}", e)))?;

        tracing::debug!(query, results = body.results.len(), "search complete");

        Ok(body
            .results
            .into_iter()
            .map(|r| ContextItem {
                url: r.url,
                content: r.content,
            })
            .collect())
    }
}

#[async_trait]
impl SearchProvider for TavilyClient {
    async fn search_context(&self, query: &str) -> Result<String> {
        let items = self.search(query).await?;
        let items = fit_to_budget(items, self.max_tokens);
        Ok(serde_json::to_string(&items)?)
    }

    fn name(&self) -> &str {
        "tavily"
    }
}

/// Rough token count: four characters per token
fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// Keep leading items while their serialized size fits the token budget
pub fn fit_to_budget(items: Vec<ContextItem>, max_tokens: usize) -> Vec<ContextItem> {
    let mut used = 0;
    let mut kept = Vec::new();

    for item in items {
        let cost = serde_json::to_string(&item)
            .map(|s| estimate_tokens(&s))
            .unwrap_or(usize::MAX);
        if used + cost > max_tokens {
            break;
        }
        used += cost;
        kept.push(item);
    }

    kept
}
