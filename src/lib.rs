//! Song Cheer Bot
//!
//! A LINE chat bot that:
//! - Verifies signed webhook deliveries from the LINE platform
//! - Classifies each message's mood by keyword
//! - Searches YouTube for a matching song it has not suggested recently
//! - Replies with the song and a Kansai-dialect encouragement
//! - Forgets a conversation on "reset"
//!
//! PIPELINE:
//! WEBHOOK → VERIFY → CLASSIFY → SEARCH → DEDUPE → PICK → REPLY

pub mod api;
pub mod classifier;
pub mod config;
pub mod error;
pub mod handler;
pub mod line;
pub mod memory;
pub mod models;
pub mod phrases;
pub mod recommender;
pub mod search;
pub mod state;

pub use error::{BotError, Result};

// Re-export common types
pub use models::*;
pub use classifier::{Category, KeywordClassifier};
pub use recommender::RecommendationEngine;
