//! Agent module - conversation orchestration and answer extraction
//!
//! Contains the chat session, the prompt formatter, the search agent loop and
//! the extractor that turns an agent run into the text shown to the user.

pub mod chat;
pub mod conversation;
pub mod extract;
pub mod loop_state;
pub mod orchestrator;
pub mod prompt;

pub use chat::{handle_turn, ChatContext, TurnOutcome};
pub use conversation::Session;
pub use extract::{extract_answer, ExtractedAnswer};
pub use loop_state::{AgentLoopState, StopReason};
pub use orchestrator::{AgentBackend, SearchAgent};
pub use prompt::format_prompt;
