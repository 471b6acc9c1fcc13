//! HTTP-level tests for the webhook gateway.
//!
//! Requests go through the full axum router via `tower::ServiceExt::oneshot`,
//! exercising extraction, auth checks, and error mapping without binding a
//! socket.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use talentwire_core::config::{
    Config, GatewaySettings, MessengerSettings, TelegramSettings, UnitConfig, WhatsAppSettings,
};
use talentwire_core::SecretString;
use talentwire_gateway::{build_state, Gateway};
use tower::ServiceExt;

fn webhook_config() -> Config {
    let mut config = Config::default();
    config.units.insert(
        "huntred".to_string(),
        UnitConfig {
            whatsapp: Some(WhatsAppSettings {
                phone_number_id: "1234567890".to_string(),
                access_token: SecretString::new("wa-token"),
                verify_token: SecretString::new("verify-me"),
            }),
            telegram: Some(TelegramSettings {
                bot_token: SecretString::new("123456:bot-token"),
                webhook_secret: SecretString::new("tg-secret"),
            }),
            messenger: Some(MessengerSettings {
                page_access_token: SecretString::new("page-token"),
                app_secret: SecretString::new("app-secret"),
                verify_token: SecretString::new("fb-verify"),
            }),
            ..Default::default()
        },
    );
    config
}

fn messenger_signature(body: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(b"app-secret").unwrap();
    mac.update(body);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

async fn router_for(config: &Config) -> axum::Router {
    let state = build_state(config).await.unwrap();
    Gateway::new(GatewaySettings::default(), state).router()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_health_reports_ok() {
    // No providers configured, so the health probe stays local.
    let router = router_for(&Config::default()).await;

    let response = router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["deliveries"]["delivered"], 0);
}

#[tokio::test]
async fn test_whatsapp_verify_echoes_challenge() {
    let router = router_for(&webhook_config()).await;

    let uri = "/webhooks/whatsapp/huntred?hub.mode=subscribe&hub.verify_token=verify-me&hub.challenge=12345";
    let response = router
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "12345");
}

#[tokio::test]
async fn test_whatsapp_verify_rejects_bad_token() {
    let router = router_for(&webhook_config()).await;

    let uri = "/webhooks/whatsapp/huntred?hub.mode=subscribe&hub.verify_token=wrong&hub.challenge=12345";
    let response = router
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_whatsapp_verify_unknown_unit() {
    let router = router_for(&webhook_config()).await;

    let uri = "/webhooks/whatsapp/nope?hub.mode=subscribe&hub.verify_token=verify-me&hub.challenge=1";
    let response = router
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_telegram_rejects_bad_secret() {
    let router = router_for(&webhook_config()).await;

    let response = router
        .oneshot(
            Request::post("/webhooks/telegram/huntred")
                .header("content-type", "application/json")
                .header("x-telegram-bot-api-secret-token", "wrong")
                .body(Body::from(r#"{"update_id": 1}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_telegram_acks_empty_update() {
    let router = router_for(&webhook_config()).await;

    let response = router
        .oneshot(
            Request::post("/webhooks/telegram/huntred")
                .header("content-type", "application/json")
                .header("x-telegram-bot-api-secret-token", "tg-secret")
                .body(Body::from(r#"{"update_id": 7}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}

#[tokio::test]
async fn test_messenger_verify_echoes_challenge() {
    let router = router_for(&webhook_config()).await;

    let uri =
        "/webhooks/messenger/huntred?hub.mode=subscribe&hub.verify_token=fb-verify&hub.challenge=777";
    let response = router
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "777");
}

#[tokio::test]
async fn test_messenger_rejects_bad_signature() {
    let router = router_for(&webhook_config()).await;
    let body = r#"{"object":"page","entry":[]}"#;

    let response = router
        .clone()
        .oneshot(
            Request::post("/webhooks/messenger/huntred")
                .header("content-type", "application/json")
                .header("x-hub-signature-256", "sha256=deadbeef")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // A missing header is rejected the same way.
    let response = router
        .oneshot(
            Request::post("/webhooks/messenger/huntred")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_messenger_acks_signed_payload() {
    let router = router_for(&webhook_config()).await;

    // The signature must cover the exact raw bytes, so sign the literal
    // string rather than a re-serialized value.
    let body = r#"{"object":"page","entry":[{"id":"page-1","time":0,"messaging":[]}]}"#;
    let response = router
        .oneshot(
            Request::post("/webhooks/messenger/huntred")
                .header("content-type", "application/json")
                .header("x-hub-signature-256", messenger_signature(body.as_bytes()))
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "EVENT_RECEIVED");
}

#[tokio::test]
async fn test_contact_upsert_and_list() {
    let router = router_for(&Config::default()).await;

    let contact = serde_json::json!({
        "id": "ana",
        "name": "Ana García",
        "business_unit": "huntred",
        "email": "ana@example.com"
    });
    let response = router
        .clone()
        .oneshot(
            Request::post("/api/contacts")
                .header("content-type", "application/json")
                .body(Body::from(contact.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(
            Request::get("/api/contacts/huntred")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let listed: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["id"], "ana");
}

#[tokio::test]
async fn test_notify_unknown_contact_is_404() {
    let router = router_for(&Config::default()).await;

    let request = serde_json::json!({
        "recipient": "ghost",
        "content": { "text": { "body": "hola" } }
    });
    let response = router
        .oneshot(
            Request::post("/api/notify")
                .header("content-type", "application/json")
                .body(Body::from(request.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bulk_rejects_empty_list() {
    let router = router_for(&Config::default()).await;

    let response = router
        .oneshot(
            Request::post("/api/notify/bulk")
                .header("content-type", "application/json")
                .body(Body::from("[]"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
