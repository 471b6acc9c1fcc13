//! Delivery records: one attempt to send through one channel/provider.

use super::{ChannelKind, ContactId, DeliveryId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// State of one delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryState {
    /// Queued, not yet attempted.
    Pending,

    /// Provider call in flight.
    InProgress,

    /// Provider accepted the message.
    Delivered,

    /// Attempt failed; may be retried.
    Failed,

    /// Permanently failed after exhausting retries.
    Dropped,

    /// Suppressed without an attempt (do-not-disturb window).
    Suppressed,
}

/// Record of one delivery attempt through one provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryRecord {
    /// Delivery ID.
    pub id: DeliveryId,

    /// Recipient contact.
    pub contact_id: ContactId,

    /// Channel the attempt went through.
    pub channel: ChannelKind,

    /// Current state.
    pub state: DeliveryState,

    /// Number of provider calls made so far.
    pub attempts: u32,

    /// Provider-assigned message ID once delivered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_message_id: Option<String>,

    /// Error description for failed attempts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Timestamp of the last state change.
    pub updated_at: DateTime<Utc>,
}

impl DeliveryRecord {
    /// Create a fresh pending record.
    pub fn pending(contact_id: ContactId, channel: ChannelKind) -> Self {
        Self {
            id: DeliveryId::generate(),
            contact_id,
            channel,
            state: DeliveryState::Pending,
            attempts: 0,
            provider_message_id: None,
            error: None,
            updated_at: Utc::now(),
        }
    }

    /// Create a suppressed record (no attempt was made).
    pub fn suppressed(contact_id: ContactId, channel: ChannelKind) -> Self {
        Self {
            state: DeliveryState::Suppressed,
            ..Self::pending(contact_id, channel)
        }
    }

    /// Whether this record reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.state,
            DeliveryState::Delivered | DeliveryState::Dropped | DeliveryState::Suppressed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_record() {
        let record = DeliveryRecord::pending(ContactId::new("c1"), ChannelKind::Email);
        assert_eq!(record.state, DeliveryState::Pending);
        assert_eq!(record.attempts, 0);
        assert!(!record.is_terminal());
    }

    #[test]
    fn test_suppressed_is_terminal() {
        let record = DeliveryRecord::suppressed(ContactId::new("c1"), ChannelKind::Sms);
        assert_eq!(record.state, DeliveryState::Suppressed);
        assert_eq!(record.attempts, 0);
        assert!(record.is_terminal());
    }

    #[test]
    fn test_state_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&DeliveryState::Suppressed).unwrap(),
            "\"suppressed\""
        );
    }
}
