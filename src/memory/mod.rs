//! Conversation memory
//!
//! Per-conversation history plus the bounded list of recently recommended
//! titles used to avoid repeating a song.

pub mod recent;
pub mod store;

pub use recent::{RecentTitles, DEFAULT_RECENT_CAPACITY};
pub use store::{ConversationHistory, ConversationMessage, MessageRole};
