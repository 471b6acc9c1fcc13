//! WhatsApp webhook handlers.
//!
//! `GET` carries Meta's subscription handshake; `POST` carries message
//! events. Events are acknowledged with 200 as soon as they parse, then
//! handled in a detached task so slow provider calls never stall Meta's
//! webhook delivery.

use crate::bootstrap::AppState;
use crate::{GatewayError, Result};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use talentwire_channels::whatsapp::WhatsAppWebhookPayload;
use talentwire_core::types::BusinessUnit;
use tracing::debug;

/// Meta's `hub.*` verification query parameters.
#[derive(Debug, Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode")]
    pub mode: String,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: String,
    #[serde(rename = "hub.challenge")]
    pub challenge: String,
}

/// `GET /webhooks/whatsapp/:unit`
pub async fn verify(
    State(state): State<Arc<AppState>>,
    Path(unit): Path<String>,
    Query(params): Query<VerifyParams>,
) -> Result<String> {
    let unit = BusinessUnit::new(unit);
    let provider = state
        .whatsapp
        .get(&unit)
        .ok_or_else(|| GatewayError::UnknownUnit(unit.to_string()))?;

    provider
        .verify_webhook(&params.mode, &params.verify_token, &params.challenge)
        .map_err(|e| GatewayError::Auth(e.to_string()))
}

/// `POST /webhooks/whatsapp/:unit`
pub async fn receive(
    State(state): State<Arc<AppState>>,
    Path(unit): Path<String>,
    Json(payload): Json<WhatsAppWebhookPayload>,
) -> Result<&'static str> {
    let unit = BusinessUnit::new(unit);
    let provider = state
        .whatsapp
        .get(&unit)
        .ok_or_else(|| GatewayError::UnknownUnit(unit.to_string()))?;

    let messages = provider.parse_webhook(payload);
    debug!(unit = %unit, count = messages.len(), "whatsapp webhook received");

    for message in messages {
        let inbound = state.inbound.clone();
        tokio::spawn(async move {
            inbound.handle(message).await;
        });
    }

    Ok("EVENT_RECEIVED")
}
