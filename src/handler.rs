//! Inbound message handler
//!
//! Decides between reset and recommendation for each text message, keeps the
//! conversation history, and sends exactly one reply per message event.
//! Search failures degrade to an apology instead of failing the request.

use crate::line::{MessageEvent, MessagingClient};
use crate::memory::ConversationMessage;
use crate::models::TextMessage;
use crate::recommender::RecommendationEngine;
use crate::state::{SessionKey, SessionStore};
use crate::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const RESET_TRIGGERS: &[&str] = &["リセット", "初期化", "クリア", "reset", "clear"];
pub const RESET_CONFIRMATION: &str = "チャットがリセットされました。";
pub const SEARCH_FAILED_MESSAGE: &str =
    "申し訳ありませんが、ただいま曲を検索できませんでした。しばらくしてからもう一度お試しください。";

/// Non-system turns kept per conversation
const MAX_HISTORY_TURNS: usize = 50;

pub fn is_reset_command(text: &str) -> bool {
    RESET_TRIGGERS.iter().any(|trigger| *trigger == text)
}

pub struct InboundMessageHandler {
    engine: Arc<RecommendationEngine>,
    sessions: Arc<dyn SessionStore>,
    messenger: Arc<dyn MessagingClient>,
}

impl InboundMessageHandler {
    pub fn new(
        engine: Arc<RecommendationEngine>,
        sessions: Arc<dyn SessionStore>,
        messenger: Arc<dyn MessagingClient>,
    ) -> Self {
        Self {
            engine,
            sessions,
            messenger,
        }
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    /// Reply messages for one text message. Never fails: search errors become an apology.
    pub async fn generate_reply(&self, key: &SessionKey, text: &str) -> Vec<TextMessage> {
        if is_reset_command(text) {
            // an absent session is already in its initial form
            if let Some(session) = self.sessions.get(key).await {
                session.lock().await.reset();
            }
            info!(session = %key, "Session reset");
            return vec![TextMessage::new(RESET_CONFIRMATION)];
        }

        let session = self.sessions.get_or_create(key).await;
        let mut session = session.lock().await;

        session.history.add_message(ConversationMessage::user(text));

        let reply = match self.engine.recommend(text, &mut *session).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(session = %key, "Recommendation failed, sending fallback: {}", e);
                SEARCH_FAILED_MESSAGE.to_string()
            }
        };

        session
            .history
            .add_message(ConversationMessage::assistant(reply.clone()));
        session.history.trim_to_recent(MAX_HISTORY_TURNS);

        vec![TextMessage::new(reply)]
    }

    /// Handle one message event. Non-text messages are ignored.
    pub async fn handle_message_event(&self, event: &MessageEvent) -> Result<()> {
        let Some(reply_token) = event.active_reply_token() else {
            debug!(mode = ?event.mode, "Ignoring message without a usable reply token");
            return Ok(());
        };
        let Some(text) = event.text() else {
            debug!("Ignoring non-text message");
            return Ok(());
        };

        let key = event.source.session_key();
        info!(session = %key, "Received text message");

        let messages = self.generate_reply(&key, text).await;
        self.messenger.reply(reply_token, messages).await
    }
}
