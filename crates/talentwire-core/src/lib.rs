//! # talentwire-core
//!
//! Core types, configuration, and utilities for Talentwire.
//!
//! This crate provides shared functionality used across all Talentwire crates:
//!
//! - **Configuration**: Loading, validation, and management of config files
//! - **Types**: Contacts, messages, priorities, and delivery records
//! - **Utilities**: ID generation and secret handling

pub mod config;
pub mod error;
pub mod id;
pub mod secret;
pub mod types;

// Re-exports for convenience
pub use config::Config;
pub use error::{Error, Result};
pub use secret::SecretString;
pub use types::*;
