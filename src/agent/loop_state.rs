//! Agent loop state management
//!
//! Tracks the two-party conversation between the user proxy and the
//! assistant: the recorded history, the proxy's auto-reply budget, and
//! whether a termination message has been seen.

use crate::core::{AgentResponse, HistoryEntry, TokenUsage};

/// Why a conversation stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The assistant sent a termination message
    Terminated,
    /// The proxy used up its automatic replies
    MaxAutoReplies,
}

/// State of the agent conversation loop
#[derive(Debug, Clone)]
pub struct AgentLoopState {
    /// Automatic replies sent by the proxy so far
    pub auto_replies: usize,
    /// Maximum automatic replies before the proxy stops answering
    pub max_auto_replies: usize,
    /// Messages exchanged so far
    pub history: Vec<HistoryEntry>,
    /// Accumulated token usage
    pub usage: TokenUsage,
    /// Set once the conversation is over
    pub stop_reason: Option<StopReason>,
}

impl AgentLoopState {
    /// Create a new loop state with the given reply budget
    pub fn new(max_auto_replies: usize) -> Self {
        Self {
            auto_replies: 0,
            max_auto_replies,
            history: Vec::new(),
            usage: TokenUsage::default(),
            stop_reason: None,
        }
    }

    /// Check if the loop should continue
    pub fn should_continue(&self) -> bool {
        self.stop_reason.is_none()
    }

    /// Record a message
    pub fn record(&mut self, entry: HistoryEntry) {
        self.history.push(entry);
    }

    /// Try to spend one automatic reply; stops the loop when the budget is gone
    pub fn take_auto_reply(&mut self) -> bool {
        if self.auto_replies >= self.max_auto_replies {
            self.stop_reason = Some(StopReason::MaxAutoReplies);
            return false;
        }
        self.auto_replies += 1;
        true
    }

    /// Mark the conversation as terminated
    pub fn terminate(&mut self) {
        self.stop_reason = Some(StopReason::Terminated);
    }

    /// Finish the loop into the structured response
    pub fn into_response(self) -> AgentResponse {
        let summary = self
            .history
            .last()
            .and_then(|entry| entry.content.clone())
            .unwrap_or_default();

        AgentResponse {
            chat_history: self.history,
            summary,
            usage: self.usage,
        }
    }
}

/// Whether a message ends the conversation: its right-trimmed content ends with the marker
pub fn is_termination_msg(content: Option<&str>, marker: &str) -> bool {
    content
        .map(|c| c.trim_end().ends_with(marker))
        .unwrap_or(false)
}
