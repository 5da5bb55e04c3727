//! LINE Messaging API adapter
//!
//! Webhook payload types, request signature verification and the reply client.

pub mod messaging;
pub mod signature;
pub mod webhook;

pub use messaging::{LineMessagingClient, MessagingClient, RecordingMessenger};
pub use signature::{SignatureVerifier, SIGNATURE_HEADER};
pub use webhook::{EventSource, MessageContent, MessageEvent, WebhookEvent, WebhookRequest};
