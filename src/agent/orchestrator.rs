//! Agent orchestrator
//!
//! A user proxy and an LLM assistant take turns until the assistant ends
//! its message with the termination marker or the proxy runs out of
//! automatic replies. Tool calls requested by the assistant are executed by
//! the proxy and answered with one tool-results message.

use async_trait::async_trait;
use std::sync::Arc;

use crate::agent::loop_state::{is_termination_msg, AgentLoopState, StopReason};
use crate::agent::prompt::assistant_system_message;
use crate::core::config::AgentConfig;
use crate::core::{AgentResponse, HistoryEntry, Message, Result, Role, Turn};
use crate::llm::LLMProvider;
use crate::tools::ToolRegistry;

/// Name recorded for messages sent by the user proxy
pub const PROXY_NAME: &str = "User";
/// Name recorded for messages sent by the assistant
pub const ASSISTANT_NAME: &str = "Assistant";

/// Anything that can answer a formatted prompt with a structured chat history
#[async_trait]
pub trait AgentBackend: Send + Sync {
    /// Run one conversation for the prompt built from `history`
    async fn run(&self, prompt: &str, history: &[Turn]) -> Result<AgentResponse>;

    /// Marker that ends a conversation
    fn termination_marker(&self) -> &str;
}

/// Search-capable assistant driven by a user proxy
pub struct SearchAgent {
    llm: Arc<dyn LLMProvider>,
    tools: ToolRegistry,
    system_message: String,
    termination_marker: String,
    max_auto_replies: usize,
}

impl SearchAgent {
    /// Create an agent with the given LLM and tools
    pub fn new(llm: Arc<dyn LLMProvider>, tools: ToolRegistry, config: &AgentConfig) -> Self {
        let system_message = config
            .system_message
            .clone()
            .unwrap_or_else(|| assistant_system_message(&config.termination_marker));

        Self {
            llm,
            tools,
            system_message,
            termination_marker: config.termination_marker.clone(),
            max_auto_replies: config.max_consecutive_auto_reply,
        }
    }

    /// Assistant system message in use
    pub fn system_message(&self) -> &str {
        &self.system_message
    }

    /// Drive the conversation to completion
    pub async fn initiate_chat(&self, prompt: &str) -> Result<AgentResponse> {
        let tool_defs = self.tools.definitions();
        let mut state = AgentLoopState::new(self.max_auto_replies);
        let mut messages = vec![Message::system(&self.system_message), Message::user(prompt)];
        state.record(HistoryEntry::text(Role::User, PROXY_NAME, prompt));

        tracing::info!(
            provider = self.llm.name(),
            max_auto_replies = self.max_auto_replies,
            "starting agent conversation"
        );

        while state.should_continue() {
            let round = state.auto_replies + 1;
            tracing::debug!(round, "asking assistant");

            let reply = self
                .llm
                .chat_with_tools(&messages, &tool_defs, None)
                .await?;

            if let Some(usage) = &reply.usage {
                state.usage.add(usage);
            }

            state.record(HistoryEntry {
                role: Role::Assistant,
                name: Some(ASSISTANT_NAME.to_string()),
                content: Some(reply.content.clone()),
                tool_calls: reply.tool_calls.clone(),
                tool_responses: None,
            });

            if reply.tool_calls.is_empty() {
                messages.push(Message::assistant(&reply.content));
            } else {
                messages.push(Message::assistant_with_tools(
                    &reply.content,
                    reply.tool_calls.clone(),
                ));
            }

            if is_termination_msg(Some(&reply.content), &self.termination_marker) {
                state.terminate();
                break;
            }

            if !state.take_auto_reply() {
                break;
            }

            if reply.tool_calls.is_empty() {
                // Nothing to execute: the proxy answers with an empty message
                messages.push(Message::user(""));
                state.record(HistoryEntry::text(Role::User, PROXY_NAME, ""));
                continue;
            }

            tracing::info!(round, calls = reply.tool_calls.len(), "executing tool calls");
            let responses = self.tools.execute_all(&reply.tool_calls).await;
            for response in &responses {
                messages.push(Message::tool(&response.tool_call_id, &response.content));
            }
            state.record(HistoryEntry::tool_results(PROXY_NAME, responses));
        }

        match state.stop_reason {
            Some(StopReason::MaxAutoReplies) => tracing::warn!(
                max_auto_replies = self.max_auto_replies,
                "conversation stopped without termination message"
            ),
            _ => tracing::info!(messages = state.history.len(), "agent conversation complete"),
        }

        Ok(state.into_response())
    }
}

#[async_trait]
impl AgentBackend for SearchAgent {
    async fn run(&self, prompt: &str, history: &[Turn]) -> Result<AgentResponse> {
        tracing::debug!(turns = history.len(), "running agent for session");
        self.initiate_chat(prompt).await
    }

    fn termination_marker(&self) -> &str {
        &self.termination_marker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ScoutError, TokenUsage, ToolCall, ToolDefinition};
    use crate::llm::{GenerateOptions, LLMResponse};
    use crate::tools::SearchProvider;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned replies and records what it was sent
    struct ScriptedLlm {
        replies: Mutex<VecDeque<LLMResponse>>,
        seen: Mutex<Vec<Vec<Message>>>,
    }

    impl ScriptedLlm {
        fn new(replies: Vec<LLMResponse>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LLMProvider for ScriptedLlm {
        async fn chat_with_tools(
            &self,
            messages: &[Message],
            _tools: &[ToolDefinition],
            _options: Option<GenerateOptions>,
        ) -> Result<LLMResponse> {
            self.seen.lock().unwrap().push(messages.to_vec());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| ScoutError::llm("script exhausted"))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    struct FixedSearch;

    #[async_trait]
    impl SearchProvider for FixedSearch {
        async fn search_context(&self, query: &str) -> Result<String> {
            let url = format!("https://example.com/{}", query);
            Ok(json!([{ "url": url, "content": "..." }]).to_string())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn agent(llm: Arc<ScriptedLlm>, max_replies: usize) -> SearchAgent {
        let config = AgentConfig {
            max_consecutive_auto_reply: max_replies,
            ..AgentConfig::default()
        };
        SearchAgent::new(llm, ToolRegistry::new(Arc::new(FixedSearch)), &config)
    }

    fn search_call(id: &str, query: &str) -> LLMResponse {
        LLMResponse {
            content: String::new(),
            tool_calls: vec![ToolCall::new(id, "search_tool", json!({ "query": query }))],
            usage: Some(TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 2,
                total_tokens: 12,
            }),
            model: "test".to_string(),
        }
    }

    #[tokio::test]
    async fn test_tool_round_then_terminate() {
        let llm = ScriptedLlm::new(vec![
            search_call("call_1", "paris"),
            LLMResponse::text("test", "Thought: I know\nFinal Answer: PARIS TERMINATE"),
        ]);
        let response = agent(llm.clone(), 10).initiate_chat("prompt").await.unwrap();

        let roles: Vec<Role> = response.chat_history.iter().map(|e| e.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::Tool, Role::Assistant]);

        let tool_entry = &response.chat_history[2];
        let responses = tool_entry.tool_responses.as_ref().unwrap();
        assert_eq!(responses[0].tool_call_id, "call_1");
        assert!(responses[0].content.contains("https://example.com/paris"));

        assert_eq!(response.summary, "Thought: I know\nFinal Answer: PARIS TERMINATE");
        assert_eq!(response.usage.total_tokens, 12);

        // Second request carries the assistant tool call and its tool result
        let seen = llm.seen.lock().unwrap();
        let second = &seen[1];
        assert_eq!(second[0].role, Role::System);
        assert_eq!(second[1].content, "prompt");
        assert!(second[2].tool_calls.is_some());
        assert_eq!(second[3].role, Role::Tool);
        assert_eq!(second[3].tool_call_id.as_deref(), Some("call_1"));
    }

    #[tokio::test]
    async fn test_plain_reply_gets_empty_auto_reply() {
        let llm = ScriptedLlm::new(vec![
            LLMResponse::text("test", "Let me think."),
            LLMResponse::text("test", "Final Answer: 4 TERMINATE"),
        ]);
        let response = agent(llm, 10).initiate_chat("2+2?").await.unwrap();

        assert_eq!(response.chat_history.len(), 4);
        assert_eq!(response.chat_history[2].role, Role::User);
        assert_eq!(response.chat_history[2].content.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_stops_at_auto_reply_limit() {
        let llm = ScriptedLlm::new(vec![
            LLMResponse::text("test", "one"),
            LLMResponse::text("test", "two"),
            LLMResponse::text("test", "three"),
        ]);
        let response = agent(llm.clone(), 2).initiate_chat("loop").await.unwrap();

        // prompt, one, auto, two, auto, three
        assert_eq!(response.chat_history.len(), 6);
        assert_eq!(response.summary, "three");
        assert!(llm.replies.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_llm_failure_propagates() {
        let llm = ScriptedLlm::new(vec![]);
        let err = agent(llm, 10).initiate_chat("hi").await.unwrap_err();
        assert!(matches!(err, ScoutError::Llm(_)));
    }

    #[test]
    fn test_custom_system_message() {
        let config = AgentConfig {
            system_message: Some("Be brief.".to_string()),
            ..AgentConfig::default()
        };
        let agent = SearchAgent::new(
            ScriptedLlm::new(vec![]),
            ToolRegistry::new(Arc::new(FixedSearch)),
            &config,
        );
        assert_eq!(agent.system_message(), "Be brief.");
        assert_eq!(agent.termination_marker(), "TERMINATE");
    }
}
