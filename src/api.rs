//! HTTP server for the LINE webhook
//!
//! `POST /callback` receives signed webhook deliveries, `GET /health` reports
//! liveness and the number of live sessions.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::handler::InboundMessageHandler;
use crate::line::{SignatureVerifier, WebhookEvent, WebhookRequest, SIGNATURE_HEADER};

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub handler: Arc<InboundMessageHandler>,
    pub verifier: Arc<SignatureVerifier>,
}

/// =============================
/// Health Endpoint
/// =============================

async fn health(State(state): State<ApiState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "sessions": state.handler.sessions().len().await,
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Webhook Endpoint
/// =============================

async fn callback(
    State(state): State<ApiState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    let delivery_id = Uuid::new_v4();
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    if let Err(e) = state.verifier.verify(&body, signature) {
        warn!(%delivery_id, "Rejected webhook: {}", e);
        return (StatusCode::BAD_REQUEST, "Invalid signature");
    }

    let request = match WebhookRequest::parse(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!(%delivery_id, "Malformed webhook body: {}", e);
            return (StatusCode::BAD_REQUEST, "Invalid payload");
        }
    };

    info!(
        %delivery_id,
        destination = ?request.destination,
        events = request.events.len(),
        "Webhook received"
    );

    for event in &request.events {
        let WebhookEvent::Message(event) = event else {
            continue;
        };

        if let Err(e) = state.handler.handle_message_event(event).await {
            error!(%delivery_id, "Failed to reply to message: {}", e);
        }
    }

    (StatusCode::OK, "OK")
}

/// =============================
/// Router
/// =============================

pub fn create_router(handler: Arc<InboundMessageHandler>, verifier: SignatureVerifier) -> Router {
    let state = ApiState {
        handler,
        verifier: Arc::new(verifier),
    };

    Router::new()
        .route("/health", get(health))
        .route("/callback", post(callback))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    handler: Arc<InboundMessageHandler>,
    verifier: SignatureVerifier,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(handler, verifier);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("Webhook server listening on http://0.0.0.0:{}", port);
    info!("Callback: http://127.0.0.1:{}/callback", port);

    axum::serve(listener, router).await?;

    Ok(())
}
