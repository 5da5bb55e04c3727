//! LINE webhook payload

use crate::error::BotError;
use crate::state::SessionKey;
use crate::Result;
use serde::{Deserialize, Deserializer};
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookRequest {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default, deserialize_with = "skip_undecodable")]
    pub events: Vec<WebhookEvent>,
}

/// One bad event must not cost the rest of the delivery its replies
fn skip_undecodable<'de, D>(deserializer: D) -> std::result::Result<Vec<WebhookEvent>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!("Skipping undecodable webhook event: {}", e);
                None
            }
        })
        .collect())
}

impl WebhookRequest {
    /// Decode a verified request body
    pub fn parse(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body).map_err(|e| BotError::InvalidPayload(e.to_string()))
    }
}

/// Only message events are handled; follow, postback, etc. decode as `Other`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WebhookEvent {
    Message(MessageEvent),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    /// Absent for events delivered in standby mode
    #[serde(default)]
    pub reply_token: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    pub source: EventSource,
    pub message: MessageContent,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub webhook_event_id: Option<String>,
}

impl MessageEvent {
    /// Text of the message, if it is a text message
    pub fn text(&self) -> Option<&str> {
        match &self.message {
            MessageContent::Text { text, .. } => Some(text.as_str()),
            MessageContent::Other => None,
        }
    }

    /// Reply token of an event this bot should answer
    pub fn active_reply_token(&self) -> Option<&str> {
        if self.mode.as_deref() == Some("standby") {
            return None;
        }
        self.reply_token.as_deref()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageContent {
    Text {
        #[serde(default)]
        id: Option<String>,
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    User,
    Group,
    Room,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    #[serde(rename = "type")]
    pub kind: SourceType,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub room_id: Option<String>,
}

impl EventSource {
    /// Groups and rooms share one session; 1:1 chats are keyed by user
    pub fn session_key(&self) -> SessionKey {
        self.group_id
            .as_deref()
            .or(self.room_id.as_deref())
            .or(self.user_id.as_deref())
            .map(SessionKey::new)
            .unwrap_or_else(SessionKey::anonymous)
    }
}
