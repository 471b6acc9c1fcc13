//! Core provider trait.

use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt::Debug;
use talentwire_core::types::{ChannelKind, OutboundMessage, ProviderHealth};

/// A messaging provider wrapping one external API.
///
/// Each implementation produces one [`ProviderReceipt`] per accepted send;
/// failures surface as [`crate::ChannelError`] so the engine can record the
/// delivery attempt and decide on retries.
#[async_trait]
pub trait MessageProvider: Send + Sync + Debug {
    /// The channel this provider serves.
    fn kind(&self) -> ChannelKind;

    /// Instance identifier (unique across the registry).
    fn instance_id(&self) -> &str;

    /// Send a message to a channel-specific address.
    ///
    /// `address` is the contact's address for this channel: an E.164
    /// phone for WhatsApp/SMS, an email address, a Telegram chat ID,
    /// a Slack member ID, and so on.
    async fn send(&self, message: &OutboundMessage, address: &str) -> Result<ProviderReceipt>;

    /// Probe provider health (credentials, reachability).
    async fn health(&self) -> Result<ProviderHealth>;

    /// Maximum text length this channel accepts.
    fn max_text_length(&self) -> usize {
        4096
    }
}

/// Receipt for one accepted send.
#[derive(Debug, Clone)]
pub struct ProviderReceipt {
    /// Message ID assigned by the provider.
    pub provider_message_id: String,

    /// Timestamp when the provider accepted the message.
    pub accepted_at: DateTime<Utc>,

    /// Additional provider metadata.
    pub metadata: HashMap<String, serde_json::Value>,
}

impl ProviderReceipt {
    /// Create a receipt for a provider-assigned message ID.
    pub fn new(provider_message_id: impl Into<String>) -> Self {
        Self {
            provider_message_id: provider_message_id.into(),
            accepted_at: Utc::now(),
            metadata: HashMap::new(),
        }
    }

    /// Attach metadata.
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Truncate text to a channel limit, appending an ellipsis when cut.
pub(crate) fn clamp_text(text: &str, max_len: usize, channel: ChannelKind) -> String {
    let original_len = text.chars().count();
    if original_len <= max_len {
        return text.to_string();
    }

    tracing::warn!(
        channel = %channel,
        original_len,
        max_len,
        "message text exceeds channel limit, truncating"
    );
    let clipped: String = text.chars().take(max_len.saturating_sub(1)).collect();
    format!("{clipped}\u{2026}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receipt_builder() {
        let receipt = ProviderReceipt::new("wamid.123")
            .with_metadata("recipient", serde_json::json!("5215512345678"));

        assert_eq!(receipt.provider_message_id, "wamid.123");
        assert!(receipt.metadata.contains_key("recipient"));
    }

    #[test]
    fn test_clamp_text_short_passthrough() {
        assert_eq!(clamp_text("hola", 10, ChannelKind::Sms), "hola");
    }

    #[test]
    fn test_clamp_text_truncates_with_ellipsis() {
        let clamped = clamp_text("abcdefghij", 5, ChannelKind::Sms);
        assert_eq!(clamped.chars().count(), 5);
        assert!(clamped.ends_with('\u{2026}'));
    }
}
