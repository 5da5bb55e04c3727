//! Conversation history storage
//!
//! Stores the role/content turns of one conversation with timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

/// Role of a message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// A single turn in the conversation history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub message_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub role: MessageRole,
    pub content: String,
}

impl ConversationMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            message_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

/// Conversation history for one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationHistory {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Messages in conversation (VecDeque for efficient queue operations)
    messages: VecDeque<ConversationMessage>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self {
            created_at: Utc::now(),
            updated_at: Utc::now(),
            messages: VecDeque::new(),
        }
    }

    /// Add a message to history
    pub fn add_message(&mut self, message: ConversationMessage) {
        self.messages.push_back(message);
        self.updated_at = Utc::now();
    }

    // =============================
    // Iterators (ZERO ALLOCATION)
    // =============================

    /// Iterate over all messages
    pub fn messages(&self) -> impl Iterator<Item = &ConversationMessage> {
        self.messages.iter()
    }

    /// Iterate over recent messages (N most recent, newest first)
    pub fn recent_messages(
        &self,
        count: usize,
    ) -> impl DoubleEndedIterator<Item = &ConversationMessage> {
        self.messages.iter().rev().take(count)
    }

    /// Get message count
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Keep system messages plus the last `keep_count` other turns
    pub fn trim_to_recent(&mut self, keep_count: usize) {
        let system_count = self
            .messages
            .iter()
            .filter(|m| m.role == MessageRole::System)
            .count();
        let mut excess = self.messages.len().saturating_sub(keep_count + system_count);
        if excess == 0 {
            return;
        }

        self.messages.retain(|m| {
            if excess > 0 && m.role != MessageRole::System {
                excess -= 1;
                false
            } else {
                true
            }
        });
        self.updated_at = Utc::now();
    }

    /// Clear history
    pub fn clear(&mut self) {
        self.messages.clear();
        self.updated_at = Utc::now();
    }
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new()
    }
}
