//! Chat session history
//!
//! An append-only, ordered record of the turns shown to the user. The order
//! is the conversational context replayed to the agent on every turn.

use crate::core::Turn;

/// Turns of one interactive session
#[derive(Debug, Clone, Default)]
pub struct Session {
    turns: Vec<Turn>,
}

impl Session {
    /// Create an empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user turn
    pub fn add_user(&mut self, content: impl Into<String>) -> &Turn {
        self.push(Turn::user(content))
    }

    /// Add an assistant turn
    pub fn add_assistant(&mut self, content: impl Into<String>) -> &Turn {
        self.push(Turn::assistant(content))
    }

    fn push(&mut self, turn: Turn) -> &Turn {
        self.turns.push(turn);
        &self.turns[self.turns.len() - 1]
    }

    /// All turns in chronological order
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Get turn count
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
