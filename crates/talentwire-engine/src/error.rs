//! Engine error types.

use talentwire_channels::ChannelError;
use thiserror::Error;

/// Errors from the dispatch engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Recipient is not in the contact directory.
    #[error("Unknown contact: {0}")]
    UnknownContact(String),

    /// Channel layer error (routing, templates, providers).
    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// Core error (config, I/O).
    #[error(transparent)]
    Core(#[from] talentwire_core::Error),
}

impl EngineError {
    /// Create an unknown contact error.
    pub fn unknown_contact(id: impl std::fmt::Display) -> Self {
        Self::UnknownContact(id.to_string())
    }
}
