//! Error types for the song recommendation bot

use thiserror::Error;

/// Result type alias for bot operations
pub type Result<T> = std::result::Result<T, BotError>;

#[derive(Error, Debug)]
pub enum BotError {

    // =============================
    // Bot Errors
    // =============================

    /// A required setting is missing or unparsable. Raised before the server starts.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// YouTube or LINE answered with a non-success status, or could not be reached.
    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl BotError {
    /// Whether the failure came from a collaborator outside this process.
    pub fn is_external(&self) -> bool {
        matches!(self, BotError::ExternalService(_) | BotError::HttpError(_))
    }
}
