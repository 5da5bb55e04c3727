//! Core data models shared by the pipeline and the adapters

use serde::{Deserialize, Serialize};

/// A single video search result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Candidate {
    pub title: String,
    pub url: String,
}

impl Candidate {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

/// Outgoing text message, serialized the way the LINE reply API expects
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename = "text")]
pub struct TextMessage {
    pub text: String,
}

impl TextMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}
