use song_cheer_bot::{
    api::start_server,
    config::AppConfig,
    handler::InboundMessageHandler,
    line::{LineMessagingClient, SignatureVerifier},
    recommender::RecommendationEngine,
    search::YouTubeSearchClient,
    state::InMemorySessionStore,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(600);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables first so RUST_LOG from .env reaches the filter
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Fail fast before binding the listener
    let config = AppConfig::from_env()?;

    info!("🚀 Song Cheer Bot - Webhook Server");
    info!("📍 Port: {}", config.port);

    match &config.chat_completion {
        Some(chat) => info!(
            endpoint = %chat.endpoint,
            model = ?chat.model,
            "Azure OpenAI settings loaded (not used for replies)"
        ),
        None => info!("Azure OpenAI settings not configured"),
    }

    // Create components
    let search = Arc::new(YouTubeSearchClient::new(&config.youtube)?);
    let engine = Arc::new(
        RecommendationEngine::new(search).with_max_results(config.youtube.max_results),
    );
    let messenger = Arc::new(LineMessagingClient::new(&config.line)?);
    let sessions = Arc::new(InMemorySessionStore::with_limits(
        config.sessions.idle_ttl,
        config.sessions.max_sessions,
    ));
    info!(
        idle_ttl_secs = config.sessions.idle_ttl.as_secs(),
        max_sessions = config.sessions.max_sessions,
        "Session limits"
    );

    let sweeper = sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            sweeper.prune_idle().await;
        }
    });

    let verifier = SignatureVerifier::new(config.line.channel_secret.clone());

    let handler = Arc::new(InboundMessageHandler::new(engine, sessions, messenger));

    info!("✅ Handler initialized");
    info!("📡 Starting webhook server...");

    start_server(handler, verifier, config.port).await?;

    Ok(())
}
