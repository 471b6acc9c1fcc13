//! Configuration schema definitions.

use crate::secret::SecretString;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Main Talentwire configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Per-business-unit channel credentials.
    #[serde(default)]
    pub units: HashMap<String, UnitConfig>,

    /// Business unit used when a request does not name one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_unit: Option<String>,

    /// Webhook gateway settings.
    #[serde(default)]
    pub gateway: GatewaySettings,

    /// Dispatch/retry settings.
    #[serde(default)]
    pub dispatch: DispatchSettings,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Optional seed file with contacts (JSON array of ContactInfo).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contacts_file: Option<PathBuf>,
}

/// Channel credentials for one business unit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitConfig {
    /// WhatsApp Cloud API credentials.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<WhatsAppSettings>,

    /// Telegram Bot API credentials.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram: Option<TelegramSettings>,

    /// Facebook Messenger credentials.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messenger: Option<MessengerSettings>,

    /// Twilio SMS credentials.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sms: Option<SmsSettings>,

    /// Transactional email credentials.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<EmailSettings>,

    /// Slack bot credentials.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slack: Option<SlackSettings>,

    /// Microsoft Teams incoming webhook.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teams: Option<TeamsSettings>,
}

impl UnitConfig {
    /// Whether at least one channel is configured.
    pub fn has_any_channel(&self) -> bool {
        self.whatsapp.is_some()
            || self.telegram.is_some()
            || self.messenger.is_some()
            || self.sms.is_some()
            || self.email.is_some()
            || self.slack.is_some()
            || self.teams.is_some()
    }
}

/// WhatsApp Cloud API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatsAppSettings {
    /// Phone number ID from WhatsApp Business.
    pub phone_number_id: String,

    /// Graph API access token.
    pub access_token: SecretString,

    /// Token expected in the webhook verify handshake.
    pub verify_token: SecretString,
}

/// Telegram Bot API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramSettings {
    /// Bot token from @BotFather.
    pub bot_token: SecretString,

    /// Secret expected in `X-Telegram-Bot-Api-Secret-Token`.
    pub webhook_secret: SecretString,
}

/// Facebook Messenger settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessengerSettings {
    /// Page access token for the Send API.
    pub page_access_token: SecretString,

    /// App secret used to validate `X-Hub-Signature-256`.
    pub app_secret: SecretString,

    /// Token expected in the webhook verify handshake.
    pub verify_token: SecretString,
}

/// Twilio SMS settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsSettings {
    /// Twilio account SID.
    pub account_sid: String,

    /// Twilio auth token.
    pub auth_token: SecretString,

    /// Sender number in E.164 form.
    pub from_number: String,
}

/// Transactional email settings (SendGrid-compatible API).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailSettings {
    /// API key.
    pub api_key: SecretString,

    /// Sender address.
    pub from_address: String,

    /// Sender display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_name: Option<String>,
}

/// Slack bot settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackSettings {
    /// Bot user OAuth token (`xoxb-...`).
    pub bot_token: SecretString,
}

/// Microsoft Teams settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamsSettings {
    /// Incoming webhook URL.
    pub webhook_url: String,
}

/// Network bind mode for the webhook gateway.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindMode {
    /// Bind to 127.0.0.1 only.
    #[default]
    Loopback,

    /// Bind to all interfaces.
    Lan,
}

/// Webhook gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewaySettings {
    /// Bind mode.
    #[serde(default)]
    pub bind: BindMode,

    /// Port number.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Enable CORS.
    #[serde(default = "default_true")]
    pub cors: bool,
}

fn default_port() -> u16 {
    18620
}

fn default_true() -> bool {
    true
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            bind: BindMode::Loopback,
            port: default_port(),
            cors: true,
        }
    }
}

/// Dispatch and retry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchSettings {
    /// Maximum provider calls per channel attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial retry delay in milliseconds.
    #[serde(default = "default_initial_delay_ms")]
    pub initial_retry_delay_ms: u64,

    /// Maximum retry delay in milliseconds.
    #[serde(default = "default_max_delay_ms")]
    pub max_retry_delay_ms: u64,

    /// Exponential backoff multiplier.
    #[serde(default = "default_multiplier")]
    pub retry_multiplier: f64,

    /// Recipients per bulk batch.
    #[serde(default = "default_batch_size")]
    pub bulk_batch_size: usize,

    /// Concurrent sends inside a bulk batch.
    #[serde(default = "default_concurrency")]
    pub bulk_concurrency: usize,

    /// Maximum delivery records retained in memory.
    #[serde(default = "default_log_capacity")]
    pub delivery_log_capacity: usize,
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    1_000
}

fn default_max_delay_ms() -> u64 {
    60_000
}

fn default_multiplier() -> f64 {
    2.0
}

fn default_batch_size() -> usize {
    100
}

fn default_concurrency() -> usize {
    8
}

fn default_log_capacity() -> usize {
    10_000
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_retry_delay_ms: default_initial_delay_ms(),
            max_retry_delay_ms: default_max_delay_ms(),
            retry_multiplier: default_multiplier(),
            bulk_batch_size: default_batch_size(),
            bulk_concurrency: default_concurrency(),
            delivery_log_capacity: default_log_capacity(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log filter directive (EnvFilter syntax).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON-formatted logs.
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "talentwire=info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
