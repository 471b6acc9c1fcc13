//! HTTP gateway for Talentwire.
//!
//! Two surfaces share one axum router: provider webhooks
//! (`/webhooks/{channel}/{unit}`) feeding the inbound dispatcher, and a
//! small notification API (`/api/...`) for operators and the CLI.

pub mod bootstrap;
pub mod error;
pub mod handlers;
pub mod server;

pub use bootstrap::{build_state, AppState};
pub use error::GatewayError;
pub use server::Gateway;

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
