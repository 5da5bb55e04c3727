//! LINE Messaging API reply client

use crate::config::LineConfig;
use crate::error::BotError;
use crate::models::TextMessage;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error};

const REPLY_PATH: &str = "/v2/bot/message/reply";

/// Trait for sending replies back to the originating conversation
#[async_trait]
pub trait MessagingClient: Send + Sync {
    async fn reply(&self, reply_token: &str, messages: Vec<TextMessage>) -> Result<()>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyMessageRequest<'a> {
    reply_token: &'a str,
    messages: Vec<TextMessage>,
}

pub struct LineMessagingClient {
    client: Client,
    access_token: String,
    base_url: String,
}

impl LineMessagingClient {
    pub fn new(config: &LineConfig) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(8)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| BotError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            access_token: config.channel_access_token.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl MessagingClient for LineMessagingClient {
    async fn reply(&self, reply_token: &str, messages: Vec<TextMessage>) -> Result<()> {
        let url = format!("{}{}", self.base_url, REPLY_PATH);
        let request = ReplyMessageRequest {
            reply_token,
            messages,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("LINE reply request failed: {}", e);
                BotError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(status = %status, "LINE reply error response: {}", error_text);
            return Err(BotError::ExternalService(format!(
                "LINE API returned {}: {}",
                status, error_text
            )));
        }

        debug!("LINE reply sent");
        Ok(())
    }
}

/// Records replies instead of sending them; for development & testing
#[derive(Default, Clone)]
pub struct RecordingMessenger {
    sent: Arc<Mutex<Vec<(String, Vec<TextMessage>)>>>,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// (reply token, messages) in send order
    pub async fn sent(&self) -> Vec<(String, Vec<TextMessage>)> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl MessagingClient for RecordingMessenger {
    async fn reply(&self, reply_token: &str, messages: Vec<TextMessage>) -> Result<()> {
        self.sent
            .lock()
            .await
            .push((reply_token.to_string(), messages));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn mock_client(server: &MockServer) -> LineMessagingClient {
        let config = LineConfig {
            channel_access_token: "token".to_string(),
            channel_secret: "secret".to_string(),
            base_url: server.uri(),
        };
        LineMessagingClient::new(&config).unwrap()
    }

    #[test]
    fn test_reply_request_serialization() {
        let request = ReplyMessageRequest {
            reply_token: "token-1",
            messages: vec![TextMessage::new("チャットがリセットされました。")],
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "replyToken": "token-1",
                "messages": [{"type": "text", "text": "チャットがリセットされました。"}]
            })
        );
    }

    #[tokio::test]
    async fn test_recording_messenger() {
        let messenger = RecordingMessenger::new();
        messenger
            .reply("t", vec![TextMessage::new("hello")])
            .await
            .unwrap();

        let sent = messenger.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "t");
        assert_eq!(sent[0].1[0].text, "hello");
    }

    #[tokio::test]
    async fn test_unreachable_api_is_external_error() {
        let config = LineConfig {
            channel_access_token: "token".to_string(),
            channel_secret: "secret".to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
        };
        let client = LineMessagingClient::new(&config).unwrap();

        let err = client
            .reply("t", vec![TextMessage::new("hi")])
            .await
            .unwrap_err();
        assert!(err.is_external());
    }

    #[tokio::test]
    async fn test_reply_request_on_the_wire() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/bot/message/reply"))
            .and(header("authorization", "Bearer token"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({
                "replyToken": "r1",
                "messages": [{"type": "text", "text": "チャットがリセットされました。"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = mock_client(&server);
        tokio_test::assert_ok!(
            client
                .reply("r1", vec![TextMessage::new("チャットがリセットされました。")])
                .await
        );
    }

    #[tokio::test]
    async fn test_error_status_is_external_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/bot/message/reply"))
            .respond_with(
                ResponseTemplate::new(400).set_body_string(r#"{"message":"Invalid reply token"}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = mock_client(&server);
        let err = tokio_test::assert_err!(client.reply("expired", vec![TextMessage::new("hi")]).await);

        assert!(matches!(err, BotError::ExternalService(_)));
        let message = err.to_string();
        assert!(message.contains("400"));
        assert!(message.contains("Invalid reply token"));
    }
}
