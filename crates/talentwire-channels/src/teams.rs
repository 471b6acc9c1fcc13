//! Microsoft Teams provider.
//!
//! Posts MessageCard payloads to an incoming webhook connector. The connector
//! URL is configured per business unit; the recipient address is ignored
//! because the webhook targets a fixed channel.

use crate::error::ChannelError;
use crate::traits::{clamp_text, MessageProvider, ProviderReceipt};
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Instant;
use talentwire_core::types::{BusinessUnit, ChannelKind, OutboundMessage, ProviderHealth};
use talentwire_core::id;
use tracing::debug;
use url::Url;

/// Teams provider backed by an incoming webhook connector.
#[derive(Debug)]
pub struct TeamsProvider {
    webhook_url: Url,
    instance_id: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct MessageCard {
    #[serde(rename = "@type")]
    card_type: &'static str,
    #[serde(rename = "@context")]
    context: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    text: String,
}

impl TeamsProvider {
    pub fn new(webhook_url: Url, unit: BusinessUnit) -> Self {
        let instance_id = format!("{}-teams", unit);
        Self {
            webhook_url,
            instance_id,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl MessageProvider for TeamsProvider {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Teams
    }

    fn instance_id(&self) -> &str {
        &self.instance_id
    }

    async fn send(&self, message: &OutboundMessage, _address: &str) -> Result<ProviderReceipt> {
        debug!("posting teams connector card");

        let card = MessageCard {
            card_type: "MessageCard",
            context: "https://schema.org/extensions",
            title: message.subject.clone(),
            text: clamp_text(&message.text, self.max_text_length(), self.kind()),
        };

        let response = self
            .client
            .post(self.webhook_url.clone())
            .json(&card)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ChannelError::rate_limit(30));
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ChannelError::provider(
                "teams",
                format!("send failed ({}): {}", status, body),
            ));
        }

        // Connectors do not return a message ID; mint a local one.
        Ok(ProviderReceipt::new(format!("teams-{}", id::short_id())))
    }

    async fn health(&self) -> Result<ProviderHealth> {
        // No probe endpoint for incoming webhooks; a well-formed URL is all
        // that can be checked without posting.
        let start = Instant::now();
        if self.webhook_url.scheme() == "https" {
            Ok(ProviderHealth::healthy(start.elapsed().as_millis() as u64))
        } else {
            Ok(ProviderHealth::unhealthy("webhook URL is not https"))
        }
    }

    fn max_text_length(&self) -> usize {
        28_000
    }
}
