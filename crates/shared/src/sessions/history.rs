use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::llm::ChatMessage;

/// Hard cap on stored turns per session.
pub const MAX_SESSION_TURNS: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }
}

impl From<&Turn> for ChatMessage {
    fn from(turn: &Turn) -> Self {
        match turn.role {
            TurnRole::User => ChatMessage::user(turn.content.clone()),
            TurnRole::Assistant => ChatMessage::assistant(turn.content.clone()),
        }
    }
}

/// Fixed-capacity turn buffer. Pushing into a full buffer evicts the oldest
/// turn first.
#[derive(Debug, Clone)]
pub struct SessionHistory {
    turns: VecDeque<Turn>,
    capacity: usize,
}

impl Default for SessionHistory {
    fn default() -> Self {
        Self::with_capacity(MAX_SESSION_TURNS)
    }
}

impl SessionHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            turns: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends `turn`, returning the evicted turn if the buffer was full.
    pub fn push(&mut self, turn: Turn) -> Option<Turn> {
        let evicted = if self.turns.len() == self.capacity {
            self.turns.pop_front()
        } else {
            None
        };
        self.turns.push_back(turn);
        evicted
    }

    /// Appends a user/assistant pair and returns how many old turns were evicted.
    pub fn push_exchange(&mut self, user: Turn, assistant: Turn) -> usize {
        [user, assistant]
            .into_iter()
            .filter_map(|turn| self.push(turn))
            .count()
    }

    /// Returns up to `limit` most recent turns, oldest first.
    pub fn tail(&self, limit: usize) -> Vec<Turn> {
        let start = self.turns.len().saturating_sub(limit);
        self.turns.iter().skip(start).cloned().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.turns.len()
    }
}
