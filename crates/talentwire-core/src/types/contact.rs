//! Contacts and business units.

use super::{ChannelKind, ContactId, DndWindow};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A tenant/division scoping configuration and data.
///
/// Business units carry their own provider credentials, templates, and
/// contacts (e.g. `huntred`, `huntu`, `amigro`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusinessUnit(String);

impl BusinessUnit {
    /// Create a business unit, normalizing the name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(crate::id::normalize(&name.into()))
    }

    /// Get the unit name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BusinessUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Default for BusinessUnit {
    fn default() -> Self {
        Self::new("default")
    }
}

impl From<&str> for BusinessUnit {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A logical recipient with per-channel addresses and preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactInfo {
    /// Contact identifier.
    pub id: ContactId,

    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Business unit the contact belongs to.
    #[serde(default)]
    pub business_unit: BusinessUnit,

    /// Phone in E.164 form (used by WhatsApp and SMS).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Telegram chat ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram_chat_id: Option<String>,

    /// Slack member ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slack_user_id: Option<String>,

    /// Teams user ID (or per-contact webhook reference).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teams_user_id: Option<String>,

    /// Messenger PSID (page-scoped sender ID), learned from inbound traffic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messenger_psid: Option<String>,

    /// Preferred channel, tried first when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_channel: Option<ChannelKind>,

    /// Do-not-disturb window; non-critical messages are suppressed inside it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dnd: Option<DndWindow>,
}

impl ContactInfo {
    /// Create a contact with only an ID and business unit.
    pub fn new(id: impl Into<ContactId>, business_unit: BusinessUnit) -> Self {
        Self {
            id: id.into(),
            name: None,
            business_unit,
            phone: None,
            email: None,
            telegram_chat_id: None,
            slack_user_id: None,
            teams_user_id: None,
            messenger_psid: None,
            preferred_channel: None,
            dnd: None,
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the phone number.
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Set the email address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set the Telegram chat ID.
    pub fn with_telegram(mut self, chat_id: impl Into<String>) -> Self {
        self.telegram_chat_id = Some(chat_id.into());
        self
    }

    /// Set the Slack member ID.
    pub fn with_slack(mut self, user_id: impl Into<String>) -> Self {
        self.slack_user_id = Some(user_id.into());
        self
    }

    /// Set the Teams user ID.
    pub fn with_teams(mut self, user_id: impl Into<String>) -> Self {
        self.teams_user_id = Some(user_id.into());
        self
    }

    /// Set the preferred channel.
    pub fn prefer(mut self, kind: ChannelKind) -> Self {
        self.preferred_channel = Some(kind);
        self
    }

    /// Set the DND window.
    pub fn with_dnd(mut self, window: DndWindow) -> Self {
        self.dnd = Some(window);
        self
    }

    /// The channel-specific address for a channel, if the contact has one.
    pub fn address_for(&self, kind: ChannelKind) -> Option<&str> {
        match kind {
            ChannelKind::WhatsApp | ChannelKind::Sms => self.phone.as_deref(),
            ChannelKind::Email => self.email.as_deref(),
            ChannelKind::Telegram => self.telegram_chat_id.as_deref(),
            ChannelKind::Slack => self.slack_user_id.as_deref(),
            ChannelKind::Teams => self.teams_user_id.as_deref(),
            ChannelKind::Messenger => self.messenger_psid.as_deref(),
        }
    }

    /// Channels the contact can be reached on.
    pub fn available_channels(&self) -> Vec<ChannelKind> {
        ChannelKind::ALL
            .into_iter()
            .filter(|kind| self.address_for(*kind).is_some())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_unit_normalizes() {
        assert_eq!(BusinessUnit::new("huntRED").as_str(), "huntred");
        assert_eq!(BusinessUnit::new("hunt U").as_str(), "hunt_u");
    }

    #[test]
    fn test_address_resolution() {
        let contact = ContactInfo::new("cand-1", BusinessUnit::new("huntred"))
            .with_phone("+525512345678")
            .with_email("maria@example.com");

        assert_eq!(
            contact.address_for(ChannelKind::WhatsApp),
            Some("+525512345678")
        );
        assert_eq!(contact.address_for(ChannelKind::Sms), Some("+525512345678"));
        assert_eq!(
            contact.address_for(ChannelKind::Email),
            Some("maria@example.com")
        );
        assert_eq!(contact.address_for(ChannelKind::Telegram), None);
    }

    #[test]
    fn test_available_channels() {
        let contact = ContactInfo::new("cand-2", BusinessUnit::default())
            .with_email("x@example.com")
            .with_telegram("12345");

        let available = contact.available_channels();
        assert!(available.contains(&ChannelKind::Email));
        assert!(available.contains(&ChannelKind::Telegram));
        assert!(!available.contains(&ChannelKind::WhatsApp));
        assert!(!available.contains(&ChannelKind::Slack));
    }
}
