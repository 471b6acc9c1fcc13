//! Notification API handlers.

use crate::bootstrap::AppState;
use crate::{GatewayError, Result};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use talentwire_core::types::{BusinessUnit, ContactInfo, DeliveryRecord};
use talentwire_engine::{BulkReport, DispatchOutcome, NotificationRequest};
use tracing::info;

/// `POST /api/notify`
pub async fn notify(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NotificationRequest>,
) -> Result<Json<DispatchOutcome>> {
    info!(recipient = %request.recipient, priority = ?request.priority, "api notify");
    let outcome = state.engine.notify(request).await?;
    Ok(Json(outcome))
}

/// `POST /api/notify/bulk`
pub async fn notify_bulk(
    State(state): State<Arc<AppState>>,
    Json(requests): Json<Vec<NotificationRequest>>,
) -> Result<Json<BulkReport>> {
    if requests.is_empty() {
        return Err(GatewayError::BadRequest("empty request list".to_string()));
    }
    let report = state.bulk.dispatch(requests).await;
    Ok(Json(report))
}

/// Query parameters for the delivery listing.
#[derive(Debug, Deserialize)]
pub struct DeliveriesQuery {
    /// Maximum records to return, newest first.
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

/// `GET /api/deliveries`
pub async fn recent_deliveries(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DeliveriesQuery>,
) -> Json<Vec<DeliveryRecord>> {
    Json(state.delivery_log.recent(query.limit).await)
}

/// `GET /api/contacts/:unit`
pub async fn list_contacts(
    State(state): State<Arc<AppState>>,
    Path(unit): Path<String>,
) -> Json<Vec<ContactInfo>> {
    let unit = BusinessUnit::new(unit);
    Json(state.engine.contacts().list(&unit).await)
}

/// `POST /api/contacts`
pub async fn upsert_contact(
    State(state): State<Arc<AppState>>,
    Json(contact): Json<ContactInfo>,
) -> Json<serde_json::Value> {
    info!(contact = %contact.id, unit = %contact.business_unit, "upserting contact");
    state.engine.contacts().upsert(contact).await;
    Json(serde_json::json!({ "status": "ok" }))
}
