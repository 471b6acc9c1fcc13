//! Messaging provider adapters for Talentwire.
//!
//! This crate provides the provider trait and per-channel adapters
//! (WhatsApp, Telegram, Messenger, SMS, email, Slack, Teams), along with
//! message routing, template rendering, and delivery tracking.

pub mod delivery;
pub mod error;
pub mod registry;
pub mod routing;
pub mod template;
pub mod traits;

pub mod email;
pub mod messenger;
pub mod slack;
pub mod sms;
pub mod teams;
pub mod telegram;
pub mod whatsapp;

pub use delivery::{DeliveryLog, DeliveryStats, RetryPolicy};
pub use error::ChannelError;
pub use registry::ProviderRegistry;
pub use routing::{MessageRouter, RoutePlan, RouteOutcome, SendStrategy};
pub use template::{MessageTemplate, RenderedTemplate, TemplateStore};
pub use traits::{MessageProvider, ProviderReceipt};

/// Result type for channel operations.
pub type Result<T> = std::result::Result<T, ChannelError>;
