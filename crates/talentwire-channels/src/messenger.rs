//! Facebook Messenger provider.
//!
//! Sends through the Messenger Send API and parses webhook events. Messenger
//! is reply-only in routing terms: candidates reach out first, and the
//! platform answers within the messaging window. Webhook bodies are
//! authenticated with the `X-Hub-Signature-256` header before parsing.

use crate::error::ChannelError;
use crate::traits::{clamp_text, MessageProvider, ProviderReceipt};
use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::Instant;
use talentwire_core::types::{
    BusinessUnit, ChannelKind, ChatInfo, InboundMessage, OutboundMessage, ProviderHealth,
    SenderInfo,
};
use talentwire_core::{MessageId, SecretString};
use tracing::debug;

/// Graph API base URL for the Send API.
const MESSENGER_API_BASE: &str = "https://graph.facebook.com/v18.0";

/// Messenger provider backed by the Send API.
pub struct MessengerProvider {
    page_access_token: SecretString,
    app_secret: SecretString,
    verify_token: SecretString,
    unit: BusinessUnit,
    instance_id: String,
    client: Client,
}

impl std::fmt::Debug for MessengerProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessengerProvider")
            .field("instance_id", &self.instance_id)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct SendApiPayload {
    recipient: SendApiRecipient,
    message: SendApiMessage,
    messaging_type: &'static str,
}

#[derive(Debug, Serialize)]
struct SendApiRecipient {
    id: String,
}

#[derive(Debug, Serialize)]
struct SendApiMessage {
    text: String,
}

#[derive(Debug, Deserialize)]
struct SendApiResponse {
    #[serde(default)]
    message_id: Option<String>,
}

/// Webhook payload for Messenger page events.
#[derive(Debug, Deserialize)]
pub struct MessengerWebhookPayload {
    pub object: String,
    pub entry: Vec<MessengerWebhookEntry>,
}

#[derive(Debug, Deserialize)]
pub struct MessengerWebhookEntry {
    pub id: String,
    pub time: i64,
    #[serde(default)]
    pub messaging: Vec<MessengerMessagingEvent>,
}

#[derive(Debug, Deserialize)]
pub struct MessengerMessagingEvent {
    pub sender: MessengerParty,
    pub recipient: MessengerParty,
    pub timestamp: i64,
    #[serde(default)]
    pub message: Option<MessengerMessage>,
}

#[derive(Debug, Deserialize)]
pub struct MessengerParty {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct MessengerMessage {
    pub mid: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub reply_to: Option<MessengerReplyTo>,
}

#[derive(Debug, Deserialize)]
pub struct MessengerReplyTo {
    pub mid: String,
}

impl MessengerProvider {
    pub fn new(
        page_access_token: SecretString,
        app_secret: SecretString,
        verify_token: SecretString,
        unit: BusinessUnit,
    ) -> Self {
        let instance_id = format!("{}-messenger", unit);
        Self {
            page_access_token,
            app_secret,
            verify_token,
            unit,
            instance_id,
            client: Client::new(),
        }
    }

    /// Verify the `X-Hub-Signature-256` header against the raw body.
    ///
    /// The header value is `sha256=` followed by a lowercase hex HMAC-SHA256
    /// of the body keyed with the app secret.
    pub fn verify_signature(&self, body: &[u8], signature: &str) -> bool {
        type HmacSha256 = Hmac<Sha256>;

        let Some(hex_digest) = signature.strip_prefix("sha256=") else {
            return false;
        };
        let Ok(digest) = hex::decode(hex_digest) else {
            return false;
        };

        let Ok(mut mac) = HmacSha256::new_from_slice(self.app_secret.expose_secret().as_bytes())
        else {
            return false;
        };

        mac.update(body);
        // verify_slice compares in constant time.
        mac.verify_slice(&digest).is_ok()
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
    pub fn parse_webhook(&self, payload: MessengerWebhookPayload) -> Vec<InboundMessage> {
        let mut inbound = Vec::new();
        for entry in payload.entry {
            for event in entry.messaging {
                let Some(message) = event.message else {
                    continue;
                };
                let text = message.text.clone().unwrap_or_default();
                if text.is_empty() {
                    continue;
                }

                // Messenger timestamps are epoch milliseconds.
                let timestamp = DateTime::<Utc>::from_timestamp_millis(event.timestamp)
                    .unwrap_or_else(Utc::now);

                inbound.push(InboundMessage {
                    id: MessageId::new(message.mid.clone()),
                    timestamp,
                    channel: ChannelKind::Messenger,
                    business_unit: self.unit.clone(),
                    sender: SenderInfo {
                        id: event.sender.id.clone(),
                        display_name: None,
                        phone_number: None,
                        is_bot: false,
                    },
                    chat: ChatInfo {
                        id: event.sender.id.clone(),
                        title: None,
                    },
                    text,
                    reply_to: message.reply_to.as_ref().map(|r| r.mid.clone()),
                    metadata: serde_json::json!({
                        "page_id": event.recipient.id,
                    }),
                });
            }
        }
        inbound
    }
}

#[async_trait]
impl MessageProvider for MessengerProvider {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Messenger
    }

    fn instance_id(&self) -> &str {
        &self.instance_id
    }

    async fn send(&self, message: &OutboundMessage, address: &str) -> Result<ProviderReceipt> {
        debug!(psid = %address, "sending messenger reply");

        let payload = SendApiPayload {
            recipient: SendApiRecipient {
                id: address.to_string(),
            },
            message: SendApiMessage {
                text: clamp_text(&message.text, self.max_text_length(), self.kind()),
            },
            messaging_type: "RESPONSE",
        };

        let response = self
            .client
            .post(format!("{}/me/messages", MESSENGER_API_BASE))
            .query(&[("access_token", self.page_access_token.expose_secret())])
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ChannelError::provider(
                "messenger",
                format!("send failed ({}): {}", status, body),
            ));
        }

        let send_response: SendApiResponse = response
            .json()
            .await
            .map_err(|e| ChannelError::provider("messenger", e.to_string()))?;

        Ok(ProviderReceipt::new(
            send_response.message_id.unwrap_or_default(),
        ))
    }

    async fn health(&self) -> Result<ProviderHealth> {
        let start = Instant::now();
        let url = format!("{}/me", MESSENGER_API_BASE);

        match self
            .client
            .get(&url)
            .query(&[("access_token", self.page_access_token.expose_secret())])
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

    fn max_text_length(&self) -> usize {
        2000
    }
}
