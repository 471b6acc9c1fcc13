//! Notification dispatch engine.
//!
//! One `notify` call produces one `DispatchOutcome`: the message is
//! rendered, routed, and sent, with one delivery record per channel
//! attempt. Retries happen inside a single channel attempt; the router
//! decides which channels are tried and in what order.

use crate::contacts::ContactDirectory;
use crate::error::EngineError;
use crate::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use talentwire_channels::routing::{RouteOutcome, SendStrategy};
use talentwire_channels::{
    ChannelError, DeliveryLog, MessageRouter, ProviderRegistry, RetryPolicy, TemplateStore,
};
use talentwire_core::types::{
    BusinessUnit, ChannelKind, ContactInfo, DeliveryRecord, DeliveryState, MessagePriority,
    OutboundMessage, TemplateId,
};
use talentwire_core::ContactId;
use tracing::{debug, info, warn};

/// What to say: a template reference or raw text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationContent {
    /// Render a registered template with variables.
    Template {
        /// Template to render.
        id: TemplateId,
        /// Variable substitutions.
        #[serde(default)]
        vars: HashMap<String, String>,
    },

    /// Send pre-rendered text as-is.
    Text {
        /// Message body.
        body: String,
        /// Subject line for email-like channels.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        subject: Option<String>,
    },
}

/// A request to notify one contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRequest {
    /// Recipient contact ID.
    pub recipient: ContactId,

    /// Message content.
    pub content: NotificationContent,

    /// Priority driving routing and DND handling.
    #[serde(default)]
    pub priority: MessagePriority,

    /// Business unit override; defaults to the contact's unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_unit: Option<BusinessUnit>,
}

impl NotificationRequest {
    /// Build a template-based request.
    pub fn template(recipient: impl Into<ContactId>, template: impl Into<TemplateId>) -> Self {
        Self {
            recipient: recipient.into(),
            content: NotificationContent::Template {
                id: template.into(),
                vars: HashMap::new(),
            },
            priority: MessagePriority::default(),
            business_unit: None,
        }
    }

    /// Build a raw-text request.
    pub fn text(recipient: impl Into<ContactId>, body: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            content: NotificationContent::Text {
                body: body.into(),
                subject: None,
            },
            priority: MessagePriority::default(),
            business_unit: None,
        }
    }

    /// Add a template variable.
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let NotificationContent::Template { vars, .. } = &mut self.content {
            vars.insert(name.into(), value.into());
        }
        self
    }

    /// Set the priority.
    pub fn with_priority(mut self, priority: MessagePriority) -> Self {
        self.priority = priority;
        self
    }

    /// Override the business unit.
    pub fn for_unit(mut self, unit: BusinessUnit) -> Self {
        self.business_unit = Some(unit);
        self
    }
}

/// Terminal status of a dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStatus {
    /// At least one channel accepted the message.
    Delivered(Vec<ChannelKind>),

    /// The contact's DND window suppressed the message.
    Suppressed,

    /// Every planned channel failed.
    AllFailed,
}

/// Result of one `notify` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchOutcome {
    /// Terminal status.
    pub status: DispatchStatus,

    /// One record per channel attempt (or one suppressed record).
    pub records: Vec<DeliveryRecord>,
}

impl DispatchOutcome {
    /// Whether the message reached the contact on any channel.
    pub fn delivered(&self) -> bool {
        matches!(self.status, DispatchStatus::Delivered(_))
    }
}

/// The dispatch engine.
#[derive(Debug)]
pub struct MessagingEngine {
    registry: Arc<ProviderRegistry>,
    contacts: Arc<ContactDirectory>,
    templates: TemplateStore,
    router: MessageRouter,
    delivery_log: Arc<DeliveryLog>,
    retry: RetryPolicy,
}

impl MessagingEngine {
    /// Create an engine from its parts.
    pub fn new(
        registry: Arc<ProviderRegistry>,
        contacts: Arc<ContactDirectory>,
        templates: TemplateStore,
        delivery_log: Arc<DeliveryLog>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            registry,
            contacts,
            templates,
            router: MessageRouter::new(),
            delivery_log,
            retry,
        }
    }

    /// The contact directory backing this engine.
    pub fn contacts(&self) -> &Arc<ContactDirectory> {
        &self.contacts
    }

    /// The provider registry backing this engine.
    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    /// The delivery log backing this engine.
    pub fn delivery_log(&self) -> &Arc<DeliveryLog> {
        &self.delivery_log
    }

    /// Dispatch one notification.
    pub async fn notify(&self, request: NotificationRequest) -> Result<DispatchOutcome> {
        let contact = self.contacts.resolve(&request.recipient).await?;
        let unit = request
            .business_unit
            .clone()
            .unwrap_or_else(|| contact.business_unit.clone());

        let message = self.render(&request, &unit)?;
        let configured = self.registry.configured_kinds(&unit).await;

        let outcome = self
            .router
            .plan(request.priority, &contact, &configured, Utc::now())?;

        match outcome {
            RouteOutcome::Suppressed => {
                let channel = contact
                    .preferred_channel
                    .or_else(|| contact.available_channels().first().copied())
                    .unwrap_or(ChannelKind::Email);
                let record = DeliveryRecord::suppressed(contact.id.clone(), channel);
                self.delivery_log.record(record.clone()).await;
                info!(contact = %contact.id, "notification suppressed by DND window");
                Ok(DispatchOutcome {
                    status: DispatchStatus::Suppressed,
                    records: vec![record],
                })
            }
            RouteOutcome::Plan(plan) => {
                self.execute_plan(&contact, &unit, &message, plan.channels, plan.strategy)
                    .await
            }
        }
    }

    fn render(&self, request: &NotificationRequest, unit: &BusinessUnit) -> Result<OutboundMessage> {
        let (text, subject) = match &request.content {
            NotificationContent::Template { id, vars } => {
                let rendered = self.templates.render(unit, id, vars)?;
                (rendered.text, rendered.subject)
            }
            NotificationContent::Text { body, subject } => (body.clone(), subject.clone()),
        };

        let mut message = OutboundMessage::text(text)
            .with_priority(request.priority)
            .for_unit(unit.clone());
        if let Some(subject) = subject {
            message = message.with_subject(subject);
        }
        Ok(message)
    }

    async fn execute_plan(
        &self,
        contact: &ContactInfo,
        unit: &BusinessUnit,
        message: &OutboundMessage,
        channels: Vec<ChannelKind>,
        strategy: SendStrategy,
    ) -> Result<DispatchOutcome> {
        let mut records = Vec::new();
        let mut delivered = Vec::new();

        for kind in channels {
            let record = self.attempt_channel(contact, unit, message, kind).await;
            let succeeded = record.state == DeliveryState::Delivered;
            records.push(record);

            if succeeded {
                delivered.push(kind);
                if strategy == SendStrategy::FirstSuccess {
                    break;
                }
            }
        }

        let status = if delivered.is_empty() {
            warn!(contact = %contact.id, "all planned channels failed");
            DispatchStatus::AllFailed
        } else {
            DispatchStatus::Delivered(delivered)
        };

        Ok(DispatchOutcome { status, records })
    }

    /// Try one channel, retrying retriable failures per policy.
    async fn attempt_channel(
        &self,
        contact: &ContactInfo,
        unit: &BusinessUnit,
        message: &OutboundMessage,
        kind: ChannelKind,
    ) -> DeliveryRecord {
        let mut record = DeliveryRecord::pending(contact.id.clone(), kind);
        self.delivery_log.record(record.clone()).await;

        let Some(address) = contact.address_for(kind).map(str::to_string) else {
            record.state = DeliveryState::Failed;
            record.error = Some("contact has no address for channel".to_string());
            record.updated_at = Utc::now();
            self.sync_record(&record).await;
            return record;
        };

        let Some(provider) = self.registry.get(unit, kind).await else {
            record.state = DeliveryState::Failed;
            record.error = Some(format!("no provider configured for {unit}/{kind}"));
            record.updated_at = Utc::now();
            self.sync_record(&record).await;
            return record;
        };

        record.state = DeliveryState::InProgress;
        loop {
            record.attempts += 1;
            record.updated_at = Utc::now();
            self.sync_record(&record).await;

            match provider.send(message, &address).await {
                Ok(receipt) => {
                    debug!(
                        contact = %contact.id,
                        channel = %kind,
                        provider_message_id = %receipt.provider_message_id,
                        "delivered"
                    );
                    record.state = DeliveryState::Delivered;
                    record.provider_message_id = Some(receipt.provider_message_id);
                    record.error = None;
                    break;
                }
                Err(e) if e.is_retriable() && self.retry.allows_retry(record.attempts) => {
                    let delay = e
                        .retry_delay()
                        .unwrap_or_else(|| self.retry.delay_for(record.attempts));
                    warn!(
                        contact = %contact.id,
                        channel = %kind,
                        attempt = record.attempts,
                        error = %e,
                        delay_ms = delay.as_millis() as u64,
                        "send failed, retrying"
                    );
                    record.error = Some(e.to_string());
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    warn!(contact = %contact.id, channel = %kind, error = %e, "send failed");
                    record.state = terminal_failure_state(&e, record.attempts, &self.retry);
                    record.error = Some(e.to_string());
                    break;
                }
            }
        }

        record.updated_at = Utc::now();
        self.sync_record(&record).await;
        record
    }

    async fn sync_record(&self, record: &DeliveryRecord) {
        let snapshot = record.clone();
        self.delivery_log
            .update(&record.id, move |r| *r = snapshot)
            .await;
    }
}

/// Retriable errors that exhausted the policy are dropped; the rest fail.
fn terminal_failure_state(
    error: &ChannelError,
    attempts: u32,
    retry: &RetryPolicy,
) -> DeliveryState {
    if error.is_retriable() && !retry.allows_retry(attempts) {
        DeliveryState::Dropped
    } else {
        DeliveryState::Failed
    }
}
