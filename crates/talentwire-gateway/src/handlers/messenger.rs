//! Messenger webhook handlers.
//!
//! The POST side takes the raw body: `X-Hub-Signature-256` must be
//! verified over the exact bytes Meta sent before any JSON parsing.

use crate::bootstrap::AppState;
use crate::{GatewayError, Result};
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use std::sync::Arc;
use talentwire_channels::messenger::MessengerWebhookPayload;
use talentwire_core::types::BusinessUnit;
use tracing::debug;

use super::whatsapp::VerifyParams;

const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// `GET /webhooks/messenger/:unit`
pub async fn verify(
    State(state): State<Arc<AppState>>,
    Path(unit): Path<String>,
    Query(params): Query<VerifyParams>,
) -> Result<String> {
    let unit = BusinessUnit::new(unit);
    let provider = state
        .messenger
        .get(&unit)
        .ok_or_else(|| GatewayError::UnknownUnit(unit.to_string()))?;

    provider
        .verify_webhook(&params.mode, &params.verify_token, &params.challenge)
        .map_err(|e| GatewayError::Auth(e.to_string()))
}

/// `POST /webhooks/messenger/:unit`
pub async fn receive(
    State(state): State<Arc<AppState>>,
    Path(unit): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<&'static str> {
    let unit = BusinessUnit::new(unit);
    let provider = state
        .messenger
        .get(&unit)
        .ok_or_else(|| GatewayError::UnknownUnit(unit.to_string()))?;

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !provider.verify_signature(&body, signature) {
        return Err(GatewayError::Auth("invalid webhook signature".to_string()));
    }

    let payload: MessengerWebhookPayload = serde_json::from_slice(&body)
        .map_err(|e| GatewayError::BadRequest(format!("malformed payload: {e}")))?;

    let messages = provider.parse_webhook(payload);
    debug!(unit = %unit, count = messages.len(), "messenger webhook received");

    for message in messages {
        let inbound = state.inbound.clone();
        tokio::spawn(async move {
            inbound.handle(message).await;
        });
    }

    Ok("EVENT_RECEIVED")
}
