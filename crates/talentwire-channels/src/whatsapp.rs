//! WhatsApp provider.
//!
//! Integrates with the WhatsApp Cloud API (Meta) for sending candidate
//! notifications and receiving webhook callbacks.

use crate::error::ChannelError;
use crate::traits::{clamp_text, MessageProvider, ProviderReceipt};
use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use talentwire_core::types::{
    BusinessUnit, ChannelKind, ChatInfo, InboundMessage, OutboundMessage, ProviderHealth,
    SenderInfo,
};
use talentwire_core::{MessageId, SecretString};
use tracing::debug;

/// WhatsApp Cloud API base URL.
const WHATSAPP_API_BASE: &str = "https://graph.facebook.com/v18.0";

/// WhatsApp provider backed by the Cloud API.
pub struct WhatsAppProvider {
    phone_number_id: String,
    access_token: SecretString,
    verify_token: SecretString,
    unit: BusinessUnit,
    instance_id: String,
    client: Client,
}

impl std::fmt::Debug for WhatsAppProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhatsAppProvider")
            .field("instance_id", &self.instance_id)
            .field("phone_number_id", &self.phone_number_id)
            .finish()
    }
}

/// Payload for the `/messages` endpoint.
#[derive(Debug, Serialize)]
struct WhatsAppMessagePayload {
    messaging_product: &'static str,
    recipient_type: &'static str,
    to: String,
    #[serde(rename = "type")]
    message_type: &'static str,
    text: WhatsAppText,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<WhatsAppContext>,
}

#[derive(Debug, Serialize)]
struct WhatsAppText {
    body: String,
    preview_url: bool,
}

#[derive(Debug, Serialize)]
struct WhatsAppContext {
    message_id: String,
}

#[derive(Debug, Deserialize)]
struct WhatsAppSendResponse {
    #[serde(default)]
    messages: Vec<WhatsAppMessageRef>,
}

#[derive(Debug, Deserialize)]
struct WhatsAppMessageRef {
    id: String,
}

/// Webhook payload for incoming messages.
#[derive(Debug, Deserialize)]
pub struct WhatsAppWebhookPayload {
    pub object: String,
    pub entry: Vec<WhatsAppWebhookEntry>,
}

#[derive(Debug, Deserialize)]
pub struct WhatsAppWebhookEntry {
    pub id: String,
    pub changes: Vec<WhatsAppWebhookChange>,
}

#[derive(Debug, Deserialize)]
pub struct WhatsAppWebhookChange {
    pub value: WhatsAppWebhookValue,
    pub field: String,
}

#[derive(Debug, Deserialize)]
pub struct WhatsAppWebhookValue {
    pub messaging_product: String,
    pub metadata: WhatsAppMetadata,
    #[serde(default)]
    pub contacts: Vec<WhatsAppWebhookContact>,
    #[serde(default)]
    pub messages: Vec<WhatsAppWebhookMessage>,
}

#[derive(Debug, Deserialize)]
pub struct WhatsAppMetadata {
    pub display_phone_number: String,
    pub phone_number_id: String,
}

#[derive(Debug, Deserialize)]
pub struct WhatsAppWebhookContact {
    pub profile: WhatsAppProfile,
    pub wa_id: String,
}

#[derive(Debug, Deserialize)]
pub struct WhatsAppProfile {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct WhatsAppWebhookMessage {
    pub from: String,
    pub id: String,
    pub timestamp: String,
    #[serde(rename = "type")]
    pub message_type: String,
    #[serde(default)]
    pub text: Option<WhatsAppTextContent>,
    #[serde(default)]
    pub context: Option<WhatsAppMessageContext>,
}

#[derive(Debug, Deserialize)]
pub struct WhatsAppTextContent {
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct WhatsAppMessageContext {
    pub from: String,
    pub id: String,
}

impl WhatsAppProvider {
    pub fn new(
        phone_number_id: impl Into<String>,
        access_token: SecretString,
        verify_token: SecretString,
        unit: BusinessUnit,
    ) -> Self {
        let phone_number_id = phone_number_id.into();
        let instance_id = format!("{}-whatsapp", unit);
        Self {
            phone_number_id,
            access_token,
            verify_token,
            unit,
            instance_id,
            client: Client::new(),
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/{}/messages", WHATSAPP_API_BASE, self.phone_number_id)
    }

    /// Verify the webhook subscription handshake (GET side).
    pub fn verify_webhook(&self, mode: &str, token: &str, challenge: &str) -> Result<String> {
        if mode != "subscribe" {
            return Err(ChannelError::auth("invalid hub.mode"));
        }
        if self.verify_token != SecretString::from(token) {
            return Err(ChannelError::auth("invalid verify token"));
        }
        Ok(challenge.to_string())
    }

    /// Parse a webhook payload into inbound messages.
    pub fn parse_webhook(&self, payload: WhatsAppWebhookPayload) -> Vec<InboundMessage> {
        let mut inbound = Vec::new();
        for entry in payload.entry {
            for change in entry.changes {
                if change.field != "messages" {
                    continue;
                }
                let contacts = &change.value.contacts;
                for msg in &change.value.messages {
                    let contact = contacts.iter().find(|c| c.wa_id == msg.from);
                    inbound.push(self.convert_webhook_message(msg, contact));
                }
            }
        }
        inbound
    }

    fn convert_webhook_message(
        &self,
        msg: &WhatsAppWebhookMessage,
        contact: Option<&WhatsAppWebhookContact>,
    ) -> InboundMessage {
        let sender = SenderInfo {
            id: msg.from.clone(),
            display_name: contact.map(|c| c.profile.name.clone()),
            phone_number: Some(format!("+{}", msg.from)),
            is_bot: false,
        };

        let chat = ChatInfo {
            id: msg.from.clone(),
            title: None,
        };

        let text = msg
            .text
            .as_ref()
            .map(|t| t.body.clone())
            .unwrap_or_default();

        // Timestamp arrives as a Unix epoch string.
        let timestamp = msg
            .timestamp
            .parse::<i64>()
            .ok()
            .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
            .unwrap_or_else(Utc::now);

        InboundMessage {
            id: MessageId::new(msg.id.clone()),
            timestamp,
            channel: ChannelKind::WhatsApp,
            business_unit: self.unit.clone(),
            sender,
            chat,
            text,
            reply_to: msg.context.as_ref().map(|ctx| ctx.id.clone()),
            metadata: serde_json::json!({
                "message_type": msg.message_type,
                "phone_number_id": self.phone_number_id,
            }),
        }
    }

    /// Digits only, no leading `+`.
    fn normalize_phone(phone: &str) -> String {
        phone.chars().filter(|c| c.is_ascii_digit()).collect()
    }
}

#[async_trait]
impl MessageProvider for WhatsAppProvider {
    fn kind(&self) -> ChannelKind {
        ChannelKind::WhatsApp
    }

    fn instance_id(&self) -> &str {
        &self.instance_id
    }

    async fn send(&self, message: &OutboundMessage, address: &str) -> Result<ProviderReceipt> {
        let recipient = Self::normalize_phone(address);
        if recipient.is_empty() {
            return Err(ChannelError::InvalidPayload(format!(
                "no digits in recipient phone {:?}",
                address
            )));
        }
        debug!(to = %recipient, "sending whatsapp message");

        let payload = WhatsAppMessagePayload {
            messaging_product: "whatsapp",
            recipient_type: "individual",
            to: recipient,
            message_type: "text",
            text: WhatsAppText {
                body: clamp_text(&message.text, self.max_text_length(), self.kind()),
                preview_url: false,
            },
            context: message
                .reply_to
                .clone()
                .map(|id| WhatsAppContext { message_id: id }),
        };

        let response = self
            .client
            .post(self.messages_url())
            .bearer_auth(self.access_token.expose_secret())
            .json(&payload)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(30);
            return Err(ChannelError::rate_limit(retry_after));
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ChannelError::provider(
                "whatsapp",
                format!("send failed ({}): {}", status, body),
            ));
        }

        let send_response: WhatsAppSendResponse = response
            .json()
            .await
            .map_err(|e| ChannelError::provider("whatsapp", e.to_string()))?;

        let msg_id = send_response
            .messages
            .first()
            .map(|m| m.id.clone())
            .unwrap_or_default();

        Ok(ProviderReceipt::new(msg_id))
    }

    async fn health(&self) -> Result<ProviderHealth> {
        let start = Instant::now();
        let url = format!("{}/{}", WHATSAPP_API_BASE, self.phone_number_id);

        match self
            .client
            .get(&url)
            .bearer_auth(self.access_token.expose_secret())
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                Ok(ProviderHealth::healthy(start.elapsed().as_millis() as u64))
            }
            Ok(response) => Ok(ProviderHealth::unhealthy(format!(
                "API returned {}",
                response.status()
            ))),
            Err(e) => Ok(ProviderHealth::unhealthy(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> WhatsAppProvider {
        WhatsAppProvider::new(
            "123456789",
            SecretString::new("token"),
            SecretString::new("verify_me"),
            BusinessUnit::new("huntred"),
        )
    }

    #[test]
    fn test_instance_id_includes_unit() {
        assert_eq!(provider().instance_id(), "huntred-whatsapp");
        assert_eq!(provider().kind(), ChannelKind::WhatsApp);
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(
            WhatsAppProvider::normalize_phone("+52 55 1234 5678"),
            "525512345678"
        );
        assert_eq!(
            WhatsAppProvider::normalize_phone("1-555-123-4567"),
            "15551234567"
        );
    }

    #[test]
    fn test_verify_webhook() {
        let p = provider();
        assert_eq!(
            p.verify_webhook("subscribe", "verify_me", "challenge123")
                .unwrap(),
            "challenge123"
        );
        assert!(p.verify_webhook("subscribe", "wrong", "c").is_err());
        assert!(p.verify_webhook("subscribe", "verify_me_extra", "c").is_err());
        assert!(p.verify_webhook("unsubscribe", "verify_me", "c").is_err());
    }

    #[test]
    fn test_payload_serialization() {
        let payload = WhatsAppMessagePayload {
            messaging_product: "whatsapp",
            recipient_type: "individual",
            to: "525512345678".to_string(),
            message_type: "text",
            text: WhatsAppText {
                body: "Hola".to_string(),
                preview_url: false,
            },
            context: None,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["text"]["body"], "Hola");
        assert!(json.get("context").is_none());
    }

    #[test]
    fn test_parse_webhook_payload() {
        let raw = serde_json::json!({
            "object": "whatsapp_business_account",
            "entry": [{
                "id": "entry-1",
                "changes": [{
                    "field": "messages",
                    "value": {
                        "messaging_product": "whatsapp",
                        "metadata": {
                            "display_phone_number": "5215512345678",
                            "phone_number_id": "123456789"
                        },
                        "contacts": [{
                            "profile": { "name": "Ana García" },
                            "wa_id": "5215598765432"
                        }],
                        "messages": [{
                            "from": "5215598765432",
                            "id": "wamid.abc",
                            "timestamp": "1714000000",
                            "type": "text",
                            "text": { "body": "Hola, quiero aplicar" }
                        }]
                    }
                }]
            }]
        });

        let payload: WhatsAppWebhookPayload = serde_json::from_value(raw).unwrap();
        let inbound = provider().parse_webhook(payload);
        assert_eq!(inbound.len(), 1);
        let msg = &inbound[0];
        assert_eq!(msg.text, "Hola, quiero aplicar");
        assert_eq!(msg.channel, ChannelKind::WhatsApp);
        assert_eq!(msg.sender.display_name.as_deref(), Some("Ana García"));
        assert_eq!(msg.sender.phone_number.as_deref(), Some("+5215598765432"));
        assert_eq!(msg.business_unit, BusinessUnit::new("huntred"));
    }

    #[test]
    fn test_parse_webhook_ignores_status_changes() {
        let raw = serde_json::json!({
            "object": "whatsapp_business_account",
            "entry": [{
                "id": "entry-1",
                "changes": [{
                    "field": "message_template_status_update",
                    "value": {
                        "messaging_product": "whatsapp",
                        "metadata": {
                            "display_phone_number": "x",
                            "phone_number_id": "123456789"
                        }
                    }
                }]
            }]
        });
        let payload: WhatsAppWebhookPayload = serde_json::from_value(raw).unwrap();
        assert!(provider().parse_webhook(payload).is_empty());
    }
}
