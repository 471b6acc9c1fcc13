//! Normalized message types for inbound and outbound traffic.

use super::{BusinessUnit, ChannelKind, MessageId, MessagePriority};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An inbound message normalized from a provider webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Provider-assigned message ID.
    pub id: MessageId,

    /// Timestamp when the message was sent (provider clock).
    pub timestamp: DateTime<Utc>,

    /// Source channel.
    pub channel: ChannelKind,

    /// Business unit whose webhook received the message.
    pub business_unit: BusinessUnit,

    /// Sender information.
    pub sender: SenderInfo,

    /// Chat/conversation information.
    pub chat: ChatInfo,

    /// Text content.
    pub text: String,

    /// ID of the message this replies to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,

    /// Channel-specific metadata.
    #[serde(default)]
    pub metadata: Value,
}

/// Information about the message sender.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SenderInfo {
    /// Channel-specific sender ID.
    pub id: String,

    /// Display name, if the provider supplied one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Phone number (WhatsApp/SMS).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,

    /// Whether the sender is a bot account.
    #[serde(default)]
    pub is_bot: bool,
}

/// Information about the chat the message arrived in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatInfo {
    /// Chat/conversation ID; replies are addressed here.
    pub id: String,

    /// Chat title for group chats.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// An outbound message ready for provider dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Rendered text content.
    pub text: String,

    /// Subject line, used by email-like channels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// Priority driving routing and DND handling.
    #[serde(default)]
    pub priority: MessagePriority,

    /// Business unit on whose behalf the message is sent.
    #[serde(default)]
    pub business_unit: BusinessUnit,

    /// Provider message ID to reply to, if this is a chatbot reply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

impl OutboundMessage {
    /// Create an outbound message with text and defaults.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            subject: None,
            priority: MessagePriority::default(),
            business_unit: BusinessUnit::default(),
            reply_to: None,
        }
    }

    /// Set the subject line.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set the priority.
    pub fn with_priority(mut self, priority: MessagePriority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the business unit.
    pub fn for_unit(mut self, unit: BusinessUnit) -> Self {
        self.business_unit = unit;
        self
    }

    /// Set the reply-to message ID.
    pub fn in_reply_to(mut self, id: impl Into<String>) -> Self {
        self.reply_to = Some(id.into());
        self
    }
}
