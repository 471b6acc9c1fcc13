//! Channel and priority types.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The messaging channels a notification can be delivered through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    /// WhatsApp Cloud API.
    WhatsApp,

    /// Telegram Bot API.
    Telegram,

    /// SMS via Twilio.
    Sms,

    /// Transactional email.
    Email,

    /// Slack Web API.
    Slack,

    /// Microsoft Teams incoming webhook.
    Teams,

    /// Facebook Messenger (inbound chatbot traffic and replies).
    Messenger,
}

impl ChannelKind {
    /// All channels, in no particular order.
    pub const ALL: [ChannelKind; 7] = [
        ChannelKind::WhatsApp,
        ChannelKind::Telegram,
        ChannelKind::Sms,
        ChannelKind::Email,
        ChannelKind::Slack,
        ChannelKind::Teams,
        ChannelKind::Messenger,
    ];

    /// Stable lowercase name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::WhatsApp => "whatsapp",
            ChannelKind::Telegram => "telegram",
            ChannelKind::Sms => "sms",
            ChannelKind::Email => "email",
            ChannelKind::Slack => "slack",
            ChannelKind::Teams => "teams",
            ChannelKind::Messenger => "messenger",
        }
    }

    /// Parse a channel name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "whatsapp" => Some(ChannelKind::WhatsApp),
            "telegram" => Some(ChannelKind::Telegram),
            "sms" => Some(ChannelKind::Sms),
            "email" => Some(ChannelKind::Email),
            "slack" => Some(ChannelKind::Slack),
            "teams" => Some(ChannelKind::Teams),
            "messenger" => Some(ChannelKind::Messenger),
            _ => None,
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority of an outbound notification.
///
/// Ordered: `Low < Normal < High < Urgent < Critical`. Only `Critical`
/// bypasses a contact's do-not-disturb window.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum MessagePriority {
    /// Informational, no rush.
    Low,

    /// Default priority.
    #[default]
    Normal,

    /// Time-sensitive (interview reminders).
    High,

    /// Needs attention within minutes (interview in an hour).
    Urgent,

    /// Must reach the contact on every channel; ignores DND.
    Critical,
}

impl MessagePriority {
    /// Parse a priority name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "normal" => Some(Self::Normal),
            "high" => Some(Self::High),
            "urgent" => Some(Self::Urgent),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

/// A daily do-not-disturb window in the contact's local time.
///
/// The window may wrap past midnight (e.g. 22:00-07:00). A degenerate
/// window where start == end matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DndWindow {
    /// Start hour (0-23), local time.
    pub start_hour: u8,

    /// Start minute (0-59).
    #[serde(default)]
    pub start_minute: u8,

    /// End hour (0-23), local time.
    pub end_hour: u8,

    /// End minute (0-59).
    #[serde(default)]
    pub end_minute: u8,

    /// Offset from UTC in minutes (e.g. -360 for Mexico City).
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

impl DndWindow {
    /// A typical overnight quiet window (22:00-07:00 local).
    pub fn overnight(utc_offset_minutes: i32) -> Self {
        Self {
            start_hour: 22,
            start_minute: 0,
            end_hour: 7,
            end_minute: 0,
            utc_offset_minutes,
        }
    }

    /// Check whether the given instant falls inside the window.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        let local = at + chrono::Duration::minutes(i64::from(self.utc_offset_minutes));
        let minute_of_day = local.hour() * 60 + local.minute();
        let start = u32::from(self.start_hour) * 60 + u32::from(self.start_minute);
        let end = u32::from(self.end_hour) * 60 + u32::from(self.end_minute);

        if start == end {
            // Degenerate window matches nothing
            return false;
        }

        if start < end {
            minute_of_day >= start && minute_of_day < end
        } else {
            // Wraps past midnight
            minute_of_day >= start || minute_of_day < end
        }
    }
}

/// Health report from one provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderHealth {
    /// Health status.
    pub status: HealthStatus,

    /// Latency of the health probe in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,

    /// Error message if unhealthy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Default for ProviderHealth {
    fn default() -> Self {
        Self {
            status: HealthStatus::Unknown,
            latency_ms: None,
            error: None,
        }
    }
}

impl ProviderHealth {
    /// A healthy report with the given probe latency.
    pub fn healthy(latency_ms: u64) -> Self {
        Self {
            status: HealthStatus::Healthy,
            latency_ms: Some(latency_ms),
            error: None,
        }
    }

    /// An unhealthy report with an error description.
    pub fn unhealthy(error: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            latency_ms: None,
            error: Some(error.into()),
        }
    }
}

/// Health status of a provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Provider is healthy.
    Healthy,

    /// Provider is degraded but functional.
    Degraded,

    /// Provider is unhealthy.
    Unhealthy,

    /// Health status unknown.
    #[default]
    Unknown,
}
