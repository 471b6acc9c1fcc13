//! End-to-end dispatch tests spanning the registry, router, and engine.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use talentwire_channels::traits::{MessageProvider, ProviderReceipt};
use talentwire_channels::{DeliveryLog, ProviderRegistry, Result as ChannelResult, RetryPolicy, TemplateStore};
use talentwire_engine::{
    BulkDispatcher, ContactDirectory, DispatchStatus, MessagingEngine, NotificationRequest,
};
use talentwire_core::types::{
    BusinessUnit, ChannelKind, ContactInfo, DndWindow, MessagePriority, OutboundMessage,
    ProviderHealth,
};

/// Provider that records every send it receives.
#[derive(Debug)]
struct RecordingProvider {
    kind: ChannelKind,
    instance: String,
    sent: Mutex<Vec<(String, String)>>,
    fail: AtomicBool,
}

impl RecordingProvider {
    fn new(kind: ChannelKind, instance: &str) -> Arc<Self> {
        Arc::new(Self {
            kind,
            instance: instance.to_string(),
            sent: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        })
    }

    fn failing(kind: ChannelKind, instance: &str) -> Arc<Self> {
        let provider = Self::new(kind, instance);
        provider.fail.store(true, Ordering::SeqCst);
        provider
    }

    fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageProvider for RecordingProvider {
    fn kind(&self) -> ChannelKind {
        self.kind
    }

    fn instance_id(&self) -> &str {
        &self.instance
    }

    async fn send(&self, message: &OutboundMessage, address: &str) -> ChannelResult<ProviderReceipt> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(talentwire_channels::ChannelError::provider(
                self.kind.as_str(),
                "simulated outage",
            ));
        }
        self.sent
            .lock()
            .unwrap()
            .push((address.to_string(), message.text.clone()));
        Ok(ProviderReceipt::new(format!("{}-msg-1", self.instance)))
    }

    async fn health(&self) -> ChannelResult<ProviderHealth> {
        Ok(ProviderHealth::healthy(1))
    }
}

fn unit() -> BusinessUnit {
    BusinessUnit::new("huntred")
}

fn ana() -> ContactInfo {
    ContactInfo::new("ana", unit())
        .with_name("Ana García")
        .with_email("ana@example.com")
        .with_telegram("555001")
        .prefer(ChannelKind::Telegram)
}

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_retries: 2,
        initial_delay: std::time::Duration::from_millis(1),
        max_delay: std::time::Duration::from_millis(2),
        multiplier: 1.0,
    }
}

async fn build_engine(
    providers: Vec<Arc<RecordingProvider>>,
    contacts: Vec<ContactInfo>,
) -> MessagingEngine {
    let registry = Arc::new(ProviderRegistry::new());
    for provider in providers {
        registry.register(unit(), provider).await.unwrap();
    }
    MessagingEngine::new(
        registry,
        Arc::new(ContactDirectory::with_contacts(contacts)),
        TemplateStore::with_defaults(),
        Arc::new(DeliveryLog::new(64)),
        fast_retry(),
    )
}

#[tokio::test]
async fn test_preferred_channel_wins_first_success() {
    let telegram = RecordingProvider::new(ChannelKind::Telegram, "huntred-telegram");
    let email = RecordingProvider::new(ChannelKind::Email, "huntred-email");
    let engine = build_engine(vec![telegram.clone(), email.clone()], vec![ana()]).await;

    let outcome = engine
        .notify(NotificationRequest::text("ana", "Hola Ana"))
        .await
        .unwrap();

    assert_eq!(
        outcome.status,
        DispatchStatus::Delivered(vec![ChannelKind::Telegram])
    );
    assert_eq!(telegram.sent(), vec![("555001".to_string(), "Hola Ana".to_string())]);
    assert!(email.sent().is_empty());
}

#[tokio::test]
async fn test_failed_channel_falls_through_to_next() {
    let telegram = RecordingProvider::failing(ChannelKind::Telegram, "huntred-telegram");
    let email = RecordingProvider::new(ChannelKind::Email, "huntred-email");
    let engine = build_engine(vec![telegram, email.clone()], vec![ana()]).await;

    let outcome = engine
        .notify(NotificationRequest::text("ana", "Hola Ana"))
        .await
        .unwrap();

    assert_eq!(
        outcome.status,
        DispatchStatus::Delivered(vec![ChannelKind::Email])
    );
    assert_eq!(email.sent().len(), 1);
    assert_eq!(email.sent()[0].0, "ana@example.com");
}

#[tokio::test]
async fn test_critical_fans_out_to_all_channels() {
    let telegram = RecordingProvider::new(ChannelKind::Telegram, "huntred-telegram");
    let email = RecordingProvider::new(ChannelKind::Email, "huntred-email");
    let engine = build_engine(vec![telegram.clone(), email.clone()], vec![ana()]).await;

    let outcome = engine
        .notify(
            NotificationRequest::text("ana", "Oferta por vencer")
                .with_priority(MessagePriority::Critical),
        )
        .await
        .unwrap();

    assert!(outcome.delivered());
    assert_eq!(telegram.sent().len(), 1);
    assert_eq!(email.sent().len(), 1);
}

#[tokio::test]
async fn test_dnd_suppresses_normal_but_not_critical() {
    let telegram = RecordingProvider::new(ChannelKind::Telegram, "huntred-telegram");
    let quiet = ana().with_dnd(DndWindow {
        start_hour: 0,
        start_minute: 0,
        end_hour: 23,
        end_minute: 59,
        utc_offset_minutes: 0,
    });
    let engine = build_engine(vec![telegram.clone()], vec![quiet]).await;

    let suppressed = engine
        .notify(NotificationRequest::text("ana", "Recordatorio"))
        .await
        .unwrap();
    assert_eq!(suppressed.status, DispatchStatus::Suppressed);
    assert!(telegram.sent().is_empty());

    let critical = engine
        .notify(
            NotificationRequest::text("ana", "Urgente")
                .with_priority(MessagePriority::Critical),
        )
        .await
        .unwrap();
    assert!(critical.delivered());
    assert_eq!(telegram.sent().len(), 1);
}

#[tokio::test]
async fn test_template_dispatch_renders_variables() {
    let telegram = RecordingProvider::new(ChannelKind::Telegram, "huntred-telegram");
    let engine = build_engine(vec![telegram.clone()], vec![ana()]).await;

    let outcome = engine
        .notify(
            NotificationRequest::template("ana", "interview_invite")
                .with_var("candidate_name", "Ana")
                .with_var("position", "Backend Engineer")
                .with_var("interview_date", "2026-09-02")
                .with_var("interview_time", "10:00"),
        )
        .await
        .unwrap();

    assert!(outcome.delivered());
    let sent = telegram.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].1.contains("Backend Engineer"));
    assert!(sent[0].1.contains("2026-09-02"));
}

#[tokio::test]
async fn test_delivery_log_tracks_outcomes() {
    let telegram = RecordingProvider::failing(ChannelKind::Telegram, "huntred-telegram");
    let email = RecordingProvider::new(ChannelKind::Email, "huntred-email");
    let engine = build_engine(vec![telegram, email], vec![ana()]).await;

    engine
        .notify(NotificationRequest::text("ana", "Hola"))
        .await
        .unwrap();

    let stats = engine.delivery_log().stats().await;
    assert_eq!(stats.delivered, 1);
    assert_eq!(stats.failed, 1);
}

#[tokio::test]
async fn test_bulk_dispatch_isolates_unknown_recipients() {
    let telegram = RecordingProvider::new(ChannelKind::Telegram, "huntred-telegram");
    let engine = Arc::new(build_engine(vec![telegram.clone()], vec![ana()]).await);
    let bulk = BulkDispatcher::new(engine, 50, 4);

    let report = bulk
        .dispatch(vec![
            NotificationRequest::text("ana", "Hola"),
            NotificationRequest::text("nadie", "Hola"),
        ])
        .await;

    assert_eq!(report.total, 2);
    assert_eq!(report.delivered, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.errors.len(), 1);
    assert!(!report.all_delivered());
}
