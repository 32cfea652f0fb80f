//! OpenAI-compatible chat-completions client
//!
//! Async HTTP client with tool calling. Every request walks the configured
//! model list in order and falls back to the next model when one fails.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::{
    Config, Message, Result, Role, ScoutError, TokenUsage, ToolCall, ToolDefinition,
};
use crate::llm::traits::{GenerateOptions, LLMProvider, LLMResponse};

/// OpenAI API client
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    models: Vec<String>,
    temperature: Option<f32>,
}

/// Chat-completions request
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolDefinition]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
}

/// OpenAI message format
#[derive(Debug, Serialize, Deserialize)]
struct OpenAiMessage {
    role: Role,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAiToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

/// OpenAI tool call format; arguments travel as a JSON-encoded string
#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAiToolCall {
    id: String,
    #[serde(rename = "type", default = "function_type")]
    call_type: String,
    function: OpenAiFunction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAiFunction {
    name: String,
    arguments: String,
}

fn function_type() -> String {
    "function".to_string()
}

/// Chat-completions response
#[derive(Debug, Deserialize)]
struct ChatResponse {
    model: String,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<UsageResponse>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct UsageResponse {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

impl OpenAiClient {
    /// Create a client from configuration and an API key
    pub fn from_config(config: &Config, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.llm.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.llm.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            models: config.models.config_list.clone(),
            temperature: config.llm.temperature,
        })
    }

    /// Models tried for every request, in order
    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// Convert internal Message to OpenAI format
    fn to_openai_message(msg: &Message) -> OpenAiMessage {
        let tool_calls = msg.tool_calls.as_ref().map(|calls| {
            calls
                .iter()
                .map(|tc| OpenAiToolCall {
                    id: tc.id.clone(),
                    call_type: function_type(),
                    function: OpenAiFunction {
                        name: tc.name.clone(),
                        arguments: tc.arguments.to_string(),
                    },
                })
                .collect::<Vec<_>>()
        });

        // Assistant messages that only carry tool calls are sent with null content
        let content = if msg.content.is_empty() && tool_calls.is_some() {
            None
        } else {
            Some(msg.content.clone())
        };

        OpenAiMessage {
            role: msg.role,
            content,
            tool_calls,
            tool_call_id: msg.tool_call_id.clone(),
        }
    }

    /// Convert an OpenAI tool call; undecodable arguments are kept as a raw string
    fn to_tool_call(call: OpenAiToolCall) -> ToolCall {
        let arguments = serde_json::from_str(&call.function.arguments)
            .unwrap_or(serde_json::Value::String(call.function.arguments));

        ToolCall {
            id: call.id,
            name: call.function.name,
            arguments,
        }
    }

    /// Convert OpenAI response to LLMResponse
    fn to_llm_response(response: ChatResponse) -> Result<LLMResponse> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ScoutError::llm("Response contained no choices"))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(Self::to_tool_call)
            .collect();

        Ok(LLMResponse {
            content: choice.message.content.unwrap_or_default(),
            tool_calls,
            usage: response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            model: response.model,
        })
    }

    /// Send one request to one model
    async fn request(
        &self,
        model: &str,
        messages: &[Message],
        tools: &[ToolDefinition],
        options: &GenerateOptions,
    ) -> Result<LLMResponse> {
        let request = ChatRequest {
            model,
            messages: messages.iter().map(Self::to_openai_message).collect(),
            tools: if tools.is_empty() { None } else { Some(tools) },
            temperature: options.temperature.or(self.temperature),
            max_tokens: options.max_tokens,
            stop: options.stop.clone(),
        };

        let request_json = serde_json::to_string(&request)?;
        tracing::debug!(model, request = %truncate(&request_json, 500), "chat request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    ScoutError::llm(format!("Cannot connect to LLM API at {}", self.base_url))
                } else if e.is_timeout() {
                    ScoutError::llm(format!("Request to {} timed out", model))
                } else {
                    ScoutError::from(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ScoutError::llm(format!(
                "API error for model {} ({}): {}",
                model, status, error_text
            )));
        }

        let response_text = response.text().await?;
        tracing::debug!(model, response = %truncate(&response_text, 500), "chat response");

        let chat_response: ChatResponse = serde_json::from_str(&response_text)
            .map_err(|e| ScoutError::llm(format!("Failed to parse response: {}", e)))?;

        Self::to_llm_response(chat_response)
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}

#[async_trait]
impl LLMProvider for OpenAiClient {
    async fn chat_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        let options = options.unwrap_or_default();
        let mut last_error = None;

        for model in &self.models {
            match self.request(model, messages, tools, &options).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    tracing::warn!(
                        model = %model,
                        error = %e,
                        "model failed, trying next in config list"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| ScoutError::llm("No models configured")))
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn cache_scope(&self) -> String {
        format!("{} {}", self.base_url, self.models.join(","))
    }
}
