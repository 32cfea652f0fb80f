//! Turn handling
//!
//! Glues the session, the prompt formatter, the agent and the extractor
//! together. Every submitted message appends exactly two turns: the user's
//! message and the assistant's answer (or the error that replaced it).

use std::sync::Arc;

use crate::agent::conversation::Session;
use crate::agent::extract::{extract_answer, ExtractedAnswer};
use crate::agent::orchestrator::{AgentBackend, SearchAgent};
use crate::agent::prompt::format_prompt;
use crate::core::{Config, Credentials, Result, ScoutError, Turn};
use crate::llm::{CachedProvider, LLMProvider, OpenAiClient, ResponseCache};
use crate::tools::{TavilyClient, ToolRegistry};

/// Collaborators needed to answer a turn
#[derive(Clone)]
pub struct ChatContext {
    agent: Arc<dyn AgentBackend>,
}

/// Result of one handled turn
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Text appended as the assistant turn
    pub reply: String,
    /// Parsed answer, when the agent call succeeded
    pub extracted: Option<ExtractedAnswer>,
}

impl ChatContext {
    /// Use an existing agent backend
    pub fn new(agent: Arc<dyn AgentBackend>) -> Self {
        Self { agent }
    }

    /// Build the LLM, search and agent collaborators from configuration
    pub fn from_config(config: &Config, credentials: &Credentials) -> Result<Self> {
        config.validate()?;

        let openai = OpenAiClient::from_config(config, &credentials.openai_api_key)?;
        let llm: Arc<dyn LLMProvider> = if config.cache.enabled {
            let cache = ResponseCache::from_config(&config.cache);
            tracing::debug!(dir = %cache.dir().display(), "response cache enabled");
            Arc::new(CachedProvider::new(Arc::new(openai), cache))
        } else {
            Arc::new(openai)
        };

        let search = TavilyClient::from_config(&config.search, &credentials.tavily_api_key)?;
        let tools = ToolRegistry::new(Arc::new(search));
        let agent = SearchAgent::new(llm, tools, &config.agent);

        Ok(Self::new(Arc::new(agent)))
    }

    /// Ask the agent about the session and extract the answer
    pub async fn answer(&self, session: &Session) -> Result<ExtractedAnswer> {
        let prompt = format_prompt(session.turns());
        let response = self.agent.run(&prompt, session.turns()).await?;
        Ok(extract_answer(&response, self.agent.termination_marker()))
    }
}

/// Message shown in place of an answer when the agent call fails
pub fn failure_message(error: &ScoutError) -> String {
    format!("Sorry, I couldn't complete that request: {}", error)
}

/// Handle one submitted user message
pub async fn handle_turn(ctx: &ChatContext, session: &mut Session, input: &str) -> TurnOutcome {
    session.add_user(input);

    let outcome = match ctx.answer(session).await {
        Ok(extracted) => TurnOutcome {
            reply: extracted.text(),
            extracted: Some(extracted),
        },
        Err(e) => {
            tracing::error!(error = %e, "agent call failed");
            TurnOutcome {
                reply: failure_message(&e),
                extracted: None,
            }
        }
    };

    session.add_assistant(&outcome.reply);
    outcome
}

/// Render a turn for display
pub fn render_turn(turn: &Turn) -> String {
    format!("{}:\n{}", turn.role, turn.content)
}
