//! SMS provider.
//!
//! Sends through a Twilio-compatible Messages API using a form-encoded POST
//! with basic auth. SMS is the fallback channel for urgent notifications when
//! richer channels are unavailable.

use crate::error::ChannelError;
use crate::traits::{clamp_text, MessageProvider, ProviderReceipt};
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Instant;
use talentwire_core::types::{BusinessUnit, ChannelKind, OutboundMessage, ProviderHealth};
use talentwire_core::SecretString;
use tracing::debug;

/// Twilio API base URL.
const TWILIO_API_BASE: &str = "https://api.twilio.com/2010-04-01";

/// Concatenated SMS cap enforced by the Messages API.
const SMS_MAX_LENGTH: usize = 1600;

/// SMS provider backed by the Twilio Messages API.
pub struct SmsProvider {
    account_sid: String,
    auth_token: SecretString,
    from_number: String,
    instance_id: String,
    client: Client,
}

impl std::fmt::Debug for SmsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmsProvider")
            .field("instance_id", &self.instance_id)
            .field("from_number", &self.from_number)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TwilioMessageResponse {
    sid: String,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TwilioErrorResponse {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

impl SmsProvider {
    pub fn new(
        account_sid: impl Into<String>,
        auth_token: SecretString,
        from_number: impl Into<String>,
        unit: BusinessUnit,
    ) -> Self {
        let instance_id = format!("{}-sms", unit);
        Self {
            account_sid: account_sid.into(),
            auth_token,
            from_number: from_number.into(),
            instance_id,
            client: Client::new(),
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/Accounts/{}/Messages.json",
            TWILIO_API_BASE, self.account_sid
        )
    }

    /// Normalize a phone number to E.164: digits with a leading `+`.
    fn normalize_e164(phone: &str) -> String {
        let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
        format!("+{}", digits)
    }
}

#[async_trait]
impl MessageProvider for SmsProvider {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Sms
    }

    fn instance_id(&self) -> &str {
        &self.instance_id
    }

    async fn send(&self, message: &OutboundMessage, address: &str) -> Result<ProviderReceipt> {
        let to = Self::normalize_e164(address);
        if to.len() < 8 {
            return Err(ChannelError::InvalidPayload(format!(
                "recipient phone too short: {:?}",
                address
            )));
        }
        debug!(to = %to, "sending sms");

        let body = clamp_text(&message.text, self.max_text_length(), self.kind());
        let params = [
            ("To", to.as_str()),
            ("From", self.from_number.as_str()),
            ("Body", body.as_str()),
        ];

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(self.auth_token.expose_secret()))
            .form(&params)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ChannelError::rate_limit(30));
        }
        if !response.status().is_success() {
            let status = response.status();
            let err: TwilioErrorResponse = response.json().await.unwrap_or(TwilioErrorResponse {
                code: None,
                message: None,
            });
            return Err(ChannelError::provider(
                "sms",
                format!(
                    "send failed ({}): {} (code {})",
                    status,
                    err.message.unwrap_or_else(|| "unknown".to_string()),
                    err.code.unwrap_or_default()
                ),
            ));
        }

        let sent: TwilioMessageResponse = response
            .json()
            .await
            .map_err(|e| ChannelError::provider("sms", e.to_string()))?;

        let mut receipt = ProviderReceipt::new(sent.sid);
        if let Some(status) = sent.status {
            receipt = receipt.with_metadata("status", serde_json::json!(status));
        }
        Ok(receipt)
    }

    async fn health(&self) -> Result<ProviderHealth> {
        let start = Instant::now();
        let url = format!("{}/Accounts/{}.json", TWILIO_API_BASE, self.account_sid);

        match self
            .client
            .get(&url)
            .basic_auth(&self.account_sid, Some(self.auth_token.expose_secret()))
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
        SMS_MAX_LENGTH
    }
}
