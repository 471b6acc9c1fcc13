//! Channel error types.

use std::io;
use thiserror::Error;

/// Errors that can occur during channel operations.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Provider not found for a business unit/channel pair.
    #[error("Provider not found: {0}")]
    NotFound(String),

    /// Provider already registered.
    #[error("Provider already exists: {0}")]
    AlreadyExists(String),

    /// Authentication failed against a provider or webhook.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded: retry after {retry_after_secs} seconds")]
    RateLimit {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(String),

    /// Routing error.
    #[error("Routing error: {0}")]
    Routing(String),

    /// Recipient has no address for any routable channel.
    #[error("No reachable channel for contact {0}")]
    NoChannels(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid webhook payload.
    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),

    /// Provider-specific error.
    #[error("Provider error ({channel}): {message}")]
    Provider {
        /// Channel name.
        channel: &'static str,
        /// Error message.
        message: String,
    },

    /// Timeout error.
    #[error("Operation timed out")]
    Timeout,

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ChannelError {
    /// Create a provider-specific error.
    pub fn provider(channel: &'static str, message: impl Into<String>) -> Self {
        Self::Provider {
            channel,
            message: message.into(),
        }
    }

    /// Create a not found error.
    pub fn not_found(name: impl std::fmt::Display) -> Self {
        Self::NotFound(name.to_string())
    }

    /// Create an auth error.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    /// Create a rate limit error.
    pub fn rate_limit(retry_after_secs: u64) -> Self {
        Self::RateLimit { retry_after_secs }
    }

    /// Check if this error is worth retrying.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            Self::RateLimit { .. } | Self::Timeout | Self::Io(_) | Self::Http(_)
        )
    }

    /// Get a provider-suggested retry delay, if any.
    pub fn retry_delay(&self) -> Option<std::time::Duration> {
        match self {
            Self::RateLimit { retry_after_secs } => {
                Some(std::time::Duration::from_secs(*retry_after_secs))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_is_retriable() {
        let err = ChannelError::rate_limit(30);
        assert!(err.is_retriable());
        assert_eq!(err.retry_delay(), Some(std::time::Duration::from_secs(30)));
    }

    #[test]
    fn test_auth_is_not_retriable() {
        let err = ChannelError::auth("bad token");
        assert!(!err.is_retriable());
        assert!(err.retry_delay().is_none());
    }

    #[test]
    fn test_timeout_has_no_suggested_delay() {
        assert!(ChannelError::Timeout.is_retriable());
        assert!(ChannelError::Timeout.retry_delay().is_none());
    }

    #[test]
    fn test_provider_error_display() {
        let err = ChannelError::provider("whatsapp", "send failed");
        assert_eq!(err.to_string(), "Provider error (whatsapp): send failed");
    }
}
