//! Notification dispatch engine for Talentwire.
//!
//! Ties together the contact directory, template store, router, and
//! provider registry: a notification request comes in, gets rendered and
//! routed, and goes out through one or more providers with retry and
//! delivery tracking. Also hosts the inbound side: webhook messages are
//! handed to the chatbot and replies go back out on the same channel.

pub mod bulk;
pub mod chatbot;
pub mod contacts;
pub mod engine;
pub mod error;
pub mod inbound;

pub use bulk::{BulkDispatcher, BulkReport};
pub use chatbot::{ChatbotEngine, Intent, IntentBot};
pub use contacts::ContactDirectory;
pub use engine::{
    DispatchOutcome, DispatchStatus, MessagingEngine, NotificationContent, NotificationRequest,
};
pub use error::EngineError;
pub use inbound::InboundDispatcher;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
