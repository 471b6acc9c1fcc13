//! Email provider.
//!
//! Sends through a SendGrid-compatible v3 mail API. Email carries the subject
//! line from the template; other channels ignore it.

use crate::error::ChannelError;
use crate::traits::{MessageProvider, ProviderReceipt};
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Instant;
use talentwire_core::types::{BusinessUnit, ChannelKind, OutboundMessage, ProviderHealth};
use talentwire_core::SecretString;
use tracing::debug;

/// SendGrid v3 API base URL.
const SENDGRID_API_BASE: &str = "https://api.sendgrid.com/v3";

/// Subject used when the outbound message carries none.
const DEFAULT_SUBJECT: &str = "Notificación de Grupo huntRED";

/// Email provider backed by the SendGrid v3 mail API.
pub struct EmailProvider {
    api_key: SecretString,
    from_address: String,
    from_name: Option<String>,
    instance_id: String,
    client: Client,
}

impl std::fmt::Debug for EmailProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailProvider")
            .field("instance_id", &self.instance_id)
            .field("from_address", &self.from_address)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct MailSendPayload {
    personalizations: Vec<Personalization>,
    from: EmailAddress,
    subject: String,
    content: Vec<MailContent>,
}

#[derive(Debug, Serialize)]
struct Personalization {
    to: Vec<EmailAddress>,
}

#[derive(Debug, Serialize)]
struct EmailAddress {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
struct MailContent {
    #[serde(rename = "type")]
    content_type: &'static str,
    value: String,
}

impl EmailProvider {
    pub fn new(
        api_key: SecretString,
        from_address: impl Into<String>,
        from_name: Option<String>,
        unit: BusinessUnit,
    ) -> Self {
        let instance_id = format!("{}-email", unit);
        Self {
            api_key,
            from_address: from_address.into(),
            from_name,
            instance_id,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl MessageProvider for EmailProvider {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Email
    }

    fn instance_id(&self) -> &str {
        &self.instance_id
    }

    async fn send(&self, message: &OutboundMessage, address: &str) -> Result<ProviderReceipt> {
        if !address.contains('@') {
            return Err(ChannelError::InvalidPayload(format!(
                "not an email address: {:?}",
                address
            )));
        }
        debug!(to = %address, "sending email");

        let payload = MailSendPayload {
            personalizations: vec![Personalization {
                to: vec![EmailAddress {
                    email: address.to_string(),
                    name: None,
                }],
            }],
            from: EmailAddress {
                email: self.from_address.clone(),
                name: self.from_name.clone(),
            },
            subject: message
                .subject
                .clone()
                .unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
            content: vec![MailContent {
                content_type: "text/plain",
                value: message.text.clone(),
            }],
        };

        let response = self
            .client
            .post(format!("{}/mail/send", SENDGRID_API_BASE))
            .bearer_auth(self.api_key.expose_secret())
            .json(&payload)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return Err(ChannelError::rate_limit(retry_after));
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ChannelError::provider(
                "email",
                format!("send failed ({}): {}", status, body),
            ));
        }

        // Accepted sends return 202 with the message ID in a header.
        let message_id = response
            .headers()
            .get("x-message-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        Ok(ProviderReceipt::new(message_id))
    }

    async fn health(&self) -> Result<ProviderHealth> {
        let start = Instant::now();
        let url = format!("{}/scopes", SENDGRID_API_BASE);

        match self
            .client
            .get(&url)
            .bearer_auth(self.api_key.expose_secret())
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

    // Email bodies are not length-capped the way chat channels are.
    fn max_text_length(&self) -> usize {
        usize::MAX
    }
}
