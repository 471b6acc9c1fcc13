//! Message routing: priority, availability, and DND rules.
//!
//! The router is a pure function of its inputs. The caller supplies the
//! current time so routing decisions stay deterministic and testable.

use crate::error::ChannelError;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use talentwire_core::types::{ChannelKind, ContactInfo, MessagePriority};
use tracing::debug;

/// Fallback order for time-sensitive traffic: push channels first.
const URGENT_ORDER: [ChannelKind; 6] = [
    ChannelKind::WhatsApp,
    ChannelKind::Sms,
    ChannelKind::Telegram,
    ChannelKind::Slack,
    ChannelKind::Teams,
    ChannelKind::Email,
];

/// Fallback order for relaxed traffic: quiet channels first.
const RELAXED_ORDER: [ChannelKind; 6] = [
    ChannelKind::Email,
    ChannelKind::WhatsApp,
    ChannelKind::Telegram,
    ChannelKind::Slack,
    ChannelKind::Teams,
    ChannelKind::Sms,
];

/// How the engine should walk the planned channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendStrategy {
    /// Stop after the first channel that accepts the message.
    FirstSuccess,

    /// Send on every planned channel.
    FanOut,
}

/// An ordered list of channels to attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePlan {
    /// Channels in attempt order.
    pub channels: Vec<ChannelKind>,

    /// Walk strategy.
    pub strategy: SendStrategy,
}

/// Outcome of a routing decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Attempt the planned channels.
    Plan(RoutePlan),

    /// Message falls inside the contact's DND window; do not send.
    Suppressed,
}

/// Router mapping (priority, contact, DND state) to an ordered channel list.
#[derive(Debug, Clone, Default)]
pub struct MessageRouter;

impl MessageRouter {
    /// Create a router.
    pub fn new() -> Self {
        Self
    }

    /// Plan delivery channels for a message.
    ///
    /// `configured` restricts the plan to channels the business unit has
    /// credentials for. Messenger is excluded from notification fan-out;
    /// it only carries chatbot replies addressed directly.
    pub fn plan(
        &self,
        priority: MessagePriority,
        contact: &ContactInfo,
        configured: &[ChannelKind],
        now: DateTime<Utc>,
    ) -> Result<RouteOutcome> {
        if let Some(dnd) = &contact.dnd {
            if priority < MessagePriority::Critical && dnd.contains(now) {
                debug!(
                    contact = %contact.id,
                    priority = ?priority,
                    "suppressing message inside DND window"
                );
                return Ok(RouteOutcome::Suppressed);
            }
        }

        let order: &[ChannelKind] = if priority >= MessagePriority::High {
            &URGENT_ORDER
        } else {
            &RELAXED_ORDER
        };

        let reachable = |kind: &ChannelKind| {
            contact.address_for(*kind).is_some() && configured.contains(kind)
        };

        let mut channels: Vec<ChannelKind> = Vec::new();

        if let Some(preferred) = contact.preferred_channel {
            if preferred != ChannelKind::Messenger && reachable(&preferred) {
                channels.push(preferred);
            }
        }

        for kind in order {
            if reachable(kind) && !channels.contains(kind) {
                channels.push(*kind);
            }
        }

        if channels.is_empty() {
            return Err(ChannelError::NoChannels(contact.id.to_string()));
        }

        let strategy = if priority == MessagePriority::Critical {
            SendStrategy::FanOut
        } else {
            SendStrategy::FirstSuccess
        };

        debug!(
            contact = %contact.id,
            priority = ?priority,
            channels = ?channels,
            strategy = ?strategy,
            "planned route"
        );

        Ok(RouteOutcome::Plan(RoutePlan { channels, strategy }))
    }
}
