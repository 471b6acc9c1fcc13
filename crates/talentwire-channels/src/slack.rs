//! Slack provider.
//!
//! Used to notify recruiters and hiring managers in their workspace via
//! `chat.postMessage`. Slack wraps every response in an `ok`/`error` envelope
//! regardless of HTTP status.

use crate::error::ChannelError;
use crate::traits::{clamp_text, MessageProvider, ProviderReceipt};
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use talentwire_core::types::{BusinessUnit, ChannelKind, OutboundMessage, ProviderHealth};
use talentwire_core::SecretString;
use tracing::debug;

/// Slack Web API base URL.
const SLACK_API_BASE: &str = "https://slack.com/api";

/// Slack provider backed by the Web API.
pub struct SlackProvider {
    bot_token: SecretString,
    instance_id: String,
    client: Client,
}

impl std::fmt::Debug for SlackProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackProvider")
            .field("instance_id", &self.instance_id)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct PostMessagePayload {
    channel: String,
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    thread_ts: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SlackEnvelope {
    ok: bool,
    #[serde(default)]
    ts: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl SlackProvider {
    pub fn new(bot_token: SecretString, unit: BusinessUnit) -> Self {
        let instance_id = format!("{}-slack", unit);
        Self {
            bot_token,
            instance_id,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl MessageProvider for SlackProvider {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Slack
    }

    fn instance_id(&self) -> &str {
        &self.instance_id
    }

    async fn send(&self, message: &OutboundMessage, address: &str) -> Result<ProviderReceipt> {
        debug!(channel = %address, "posting slack message");

        let payload = PostMessagePayload {
            channel: address.to_string(),
            text: clamp_text(&message.text, self.max_text_length(), self.kind()),
            thread_ts: message.reply_to.clone(),
        };

        let response = self
            .client
            .post(format!("{}/chat.postMessage", SLACK_API_BASE))
            .bearer_auth(self.bot_token.expose_secret())
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

        let envelope: SlackEnvelope = response
            .json()
            .await
            .map_err(|e| ChannelError::provider("slack", e.to_string()))?;

        if !envelope.ok {
            return Err(ChannelError::provider(
                "slack",
                envelope.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        Ok(ProviderReceipt::new(envelope.ts.unwrap_or_default()))
    }

    async fn health(&self) -> Result<ProviderHealth> {
        let start = Instant::now();

        match self
            .client
            .post(format!("{}/auth.test", SLACK_API_BASE))
            .bearer_auth(self.bot_token.expose_secret())
            .send()
            .await
        {
            Ok(response) => match response.json::<SlackEnvelope>().await {
                Ok(envelope) if envelope.ok => {
                    Ok(ProviderHealth::healthy(start.elapsed().as_millis() as u64))
                }
                Ok(envelope) => Ok(ProviderHealth::unhealthy(
                    envelope.error.unwrap_or_else(|| "auth.test failed".to_string()),
                )),
                Err(e) => Ok(ProviderHealth::unhealthy(e.to_string())),
            },
            Err(e) => Ok(ProviderHealth::unhealthy(e.to_string())),
        }
    }

    fn max_text_length(&self) -> usize {
        40_000
    }
}
