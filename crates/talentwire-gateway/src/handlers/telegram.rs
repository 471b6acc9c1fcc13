//! Telegram webhook handler.
//!
//! Telegram authenticates webhooks with the secret token echoed in the
//! `X-Telegram-Bot-Api-Secret-Token` header; the check runs before the
//! body is trusted.

use crate::bootstrap::AppState;
use crate::{GatewayError, Result};
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use std::sync::Arc;
use talentwire_channels::telegram::TelegramUpdate;
use talentwire_core::types::BusinessUnit;
use tracing::debug;

const SECRET_TOKEN_HEADER: &str = "x-telegram-bot-api-secret-token";

/// `POST /webhooks/telegram/:unit`
pub async fn receive(
    State(state): State<Arc<AppState>>,
    Path(unit): Path<String>,
    headers: HeaderMap,
    Json(update): Json<TelegramUpdate>,
) -> Result<&'static str> {
    let unit = BusinessUnit::new(unit);
    let provider = state
        .telegram
        .get(&unit)
        .ok_or_else(|| GatewayError::UnknownUnit(unit.to_string()))?;

    let token = headers
        .get(SECRET_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !provider.verify_secret_token(token) {
        return Err(GatewayError::Auth("invalid secret token".to_string()));
    }

    debug!(unit = %unit, update_id = update.update_id, "telegram update received");

    if let Some(message) = provider.parse_update(update) {
        let inbound = state.inbound.clone();
        tokio::spawn(async move {
            inbound.handle(message).await;
        });
    }

    Ok("ok")
}
