//! Health and status endpoints.

use crate::bootstrap::AppState;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use talentwire_channels::DeliveryStats;
use talentwire_core::types::ProviderHealth;

/// Health report for the whole gateway.
#[derive(Debug, Serialize)]
pub struct HealthReport {
    /// Always "ok" when the gateway answers.
    pub status: &'static str,

    /// Per-provider health, keyed by instance ID.
    pub providers: HashMap<String, ProviderHealth>,

    /// Delivery counters over retained records.
    pub deliveries: DeliveryStats,
}

/// `GET /health`
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthReport> {
    let providers = state.registry.health_check().await;
    let deliveries = state.delivery_log.stats().await;
    Json(HealthReport {
        status: "ok",
        providers,
        deliveries,
    })
}
