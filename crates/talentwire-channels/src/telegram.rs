//! Telegram provider.
//!
//! Talks to the Telegram Bot API directly over HTTP. Inbound traffic arrives
//! as webhook updates carrying the `X-Telegram-Bot-Api-Secret-Token` header,
//! which is checked before any payload is trusted.

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

/// Telegram Bot API base URL.
const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Telegram provider backed by the Bot API.
pub struct TelegramProvider {
    bot_token: SecretString,
    webhook_secret: SecretString,
    unit: BusinessUnit,
    instance_id: String,
    client: Client,
}

impl std::fmt::Debug for TelegramProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramProvider")
            .field("instance_id", &self.instance_id)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct SendMessagePayload {
    chat_id: String,
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to_message_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TelegramResponse<T> {
    ok: bool,
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    parameters: Option<TelegramResponseParameters>,
}

#[derive(Debug, Deserialize)]
struct TelegramResponseParameters {
    #[serde(default)]
    retry_after: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct SentMessage {
    message_id: i64,
}

/// A webhook update from Telegram.
#[derive(Debug, Deserialize)]
pub struct TelegramUpdate {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<TelegramMessage>,
}

#[derive(Debug, Deserialize)]
pub struct TelegramMessage {
    pub message_id: i64,
    pub date: i64,
    pub chat: TelegramChat,
    #[serde(default)]
    pub from: Option<TelegramUser>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub reply_to_message: Option<Box<TelegramMessage>>,
}

#[derive(Debug, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
    #[serde(rename = "type")]
    pub chat_type: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub is_bot: bool,
}

impl TelegramProvider {
    pub fn new(bot_token: SecretString, webhook_secret: SecretString, unit: BusinessUnit) -> Self {
        let instance_id = format!("{}-telegram", unit);
        Self {
            bot_token,
            webhook_secret,
            unit,
            instance_id,
            client: Client::new(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            TELEGRAM_API_BASE,
            self.bot_token.expose_secret(),
            method
        )
    }

    /// Check the webhook secret token header value.
    pub fn verify_secret_token(&self, token: &str) -> bool {
        self.webhook_secret == SecretString::from(token)
    }

    /// Parse a webhook update into an inbound message, if it carries one.
    pub fn parse_update(&self, update: TelegramUpdate) -> Option<InboundMessage> {
        let msg = update.message?;
        let text = msg.text.clone().unwrap_or_default();
        if text.is_empty() {
            return None;
        }

        let sender = msg
            .from
            .as_ref()
            .map(|u| {
                let display_name = match (&u.first_name, &u.last_name) {
                    (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
                    (Some(first), None) => Some(first.clone()),
                    _ => u.username.clone(),
                };
                SenderInfo {
                    id: u.id.to_string(),
                    display_name,
                    phone_number: None,
                    is_bot: u.is_bot,
                }
            })
            .unwrap_or_default();

        let chat = ChatInfo {
            id: msg.chat.id.to_string(),
            title: msg.chat.title.clone(),
        };

        let timestamp =
            DateTime::<Utc>::from_timestamp(msg.date, 0).unwrap_or_else(Utc::now);

        Some(InboundMessage {
            id: MessageId::new(msg.message_id.to_string()),
            timestamp,
            channel: ChannelKind::Telegram,
            business_unit: self.unit.clone(),
            sender,
            chat,
            text,
            reply_to: msg
                .reply_to_message
                .as_ref()
                .map(|r| r.message_id.to_string()),
            metadata: serde_json::json!({
                "update_id": update.update_id,
                "chat_type": msg.chat.chat_type,
            }),
        })
    }
}

#[async_trait]
impl MessageProvider for TelegramProvider {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Telegram
    }

    fn instance_id(&self) -> &str {
        &self.instance_id
    }

    async fn send(&self, message: &OutboundMessage, address: &str) -> Result<ProviderReceipt> {
        debug!(chat_id = %address, "sending telegram message");

        let payload = SendMessagePayload {
            chat_id: address.to_string(),
            text: clamp_text(&message.text, self.max_text_length(), self.kind()),
            reply_to_message_id: message
                .reply_to
                .as_deref()
                .and_then(|id| id.parse().ok()),
        };

        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&payload)
            .send()
            .await?;

        let body: TelegramResponse<SentMessage> = response
            .json()
            .await
            .map_err(|e| ChannelError::provider("telegram", e.to_string()))?;

        if !body.ok {
            if let Some(retry_after) = body.parameters.and_then(|p| p.retry_after) {
                return Err(ChannelError::rate_limit(retry_after));
            }
            return Err(ChannelError::provider(
                "telegram",
                body.description.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        let msg_id = body
            .result
            .map(|m| m.message_id.to_string())
            .unwrap_or_default();

        Ok(ProviderReceipt::new(msg_id))
    }

    async fn health(&self) -> Result<ProviderHealth> {
        let start = Instant::now();
        match self.client.get(self.method_url("getMe")).send().await {
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
