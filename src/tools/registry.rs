//! Tool registry - manages and dispatches tool calls
//!
//! Central hub for registering tools and routing tool calls to handlers.
//! Failures never abort the chat: they come back as `Error: ...` payloads
//! the assistant can read and react to.

use std::collections::HashMap;
use std::sync::Arc;

use crate::core::{ToolCall, ToolDefinition, ToolResponse};
use crate::tools::search::{SearchProvider, SEARCH_TOOL_NAME};

/// Registry of available tools
pub struct ToolRegistry {
    /// Tool definitions indexed by name
    definitions: HashMap<String, ToolDefinition>,
    /// Registration order, used when listing definitions
    order: Vec<String>,
    /// Web search backend
    search: Arc<dyn SearchProvider>,
}

impl ToolRegistry {
    /// Create a registry exposing the web search tool
    pub fn new(search: Arc<dyn SearchProvider>) -> Self {
        let mut registry = Self {
            definitions: HashMap::new(),
            order: Vec::new(),
            search,
        };

        registry.register_search_tool();
        registry
    }

    fn register_search_tool(&mut self) {
        self.register(ToolDefinition::function(
            SEARCH_TOOL_NAME,
            "Search the web for the given query",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "query"
                    }
                },
                "required": ["query"]
            }),
        ));
    }

    /// Register a tool definition; `execute` must have a handler for its name
    fn register(&mut self, definition: ToolDefinition) {
        let name = definition.function.name.clone();
        if self.definitions.insert(name.clone(), definition).is_none() {
            self.order.push(name);
        }
    }

    /// All tool definitions in registration order
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.definitions.get(name))
            .cloned()
            .collect()
    }

    /// Check if a tool is registered
    pub fn has_tool(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Execute a tool call
    pub async fn execute(&self, tool_call: &ToolCall) -> ToolResponse {
        if !self.has_tool(&tool_call.name) {
            return ToolResponse::new(
                &tool_call.id,
                format!("Error: Function {} not found.", tool_call.name),
            );
        }

        let content = match tool_call.name.as_str() {
            SEARCH_TOOL_NAME => self.execute_search(tool_call).await,
            other => format!("Error: Function {} has no handler.", other),
        };

        ToolResponse::new(&tool_call.id, content)
    }

    /// Execute all calls in order
    pub async fn execute_all(&self, tool_calls: &[ToolCall]) -> Vec<ToolResponse> {
        let mut responses = Vec::with_capacity(tool_calls.len());
        for call in tool_calls {
            responses.push(self.execute(call).await);
        }
        responses
    }

    async fn execute_search(&self, tool_call: &ToolCall) -> String {
        let Some(query) = tool_call.get_string("query") else {
            return format!(
                "Error: missing 'query' argument in {}",
                tool_call.arguments
            );
        };

        tracing::info!(query = %query, provider = self.search.name(), "searching the web");

        match self.search.search_context(&query).await {
            Ok(context) => context,
            Err(e) => {
                tracing::warn!(query = %query, error = %e, "search failed");
                format!("Error: {}", e)
            }
        }
    }
}
