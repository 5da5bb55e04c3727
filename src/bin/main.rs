//! Local console runner: feeds stdin lines through the reply pipeline and
//! prints what the bot would send. Needs only YOUTUBE_API_KEY.

use song_cheer_bot::{
    config::YouTubeConfig,
    handler::InboundMessageHandler,
    line::RecordingMessenger,
    recommender::RecommendationEngine,
    search::YouTubeSearchClient,
    state::{InMemorySessionStore, SessionKey},
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let config = YouTubeConfig::from_env()?;
    let search = Arc::new(YouTubeSearchClient::new(&config)?);
    let engine = Arc::new(RecommendationEngine::new(search).with_max_results(config.max_results));

    let handler = InboundMessageHandler::new(
        engine,
        Arc::new(InMemorySessionStore::new()),
        Arc::new(RecordingMessenger::new()),
    );
    let key = SessionKey::new("console");

    info!("Console session started");
    println!("メッセージを入力してください (Ctrl-D で終了)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        for message in handler.generate_reply(&key, text).await {
            println!("\n{}\n", message.text);
        }
    }

    Ok(())
}
