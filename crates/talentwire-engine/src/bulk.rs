//! Bulk notification dispatch.
//!
//! Campaign-style sends: the same template goes to many recipients with
//! bounded concurrency. One recipient failing never blocks the rest.

use crate::engine::{DispatchStatus, MessagingEngine, NotificationRequest};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use talentwire_core::ContactId;
use tracing::{info, warn};

/// Outcome summary of a bulk dispatch.
#[derive(Debug, Default, Serialize)]
pub struct BulkReport {
    /// Requests processed.
    pub total: usize,

    /// Recipients reached on at least one channel.
    pub delivered: usize,

    /// Recipients suppressed by DND.
    pub suppressed: usize,

    /// Recipients for whom every channel failed.
    pub failed: usize,

    /// Per-recipient errors (unknown contact, template problems).
    pub errors: Vec<(ContactId, String)>,
}

impl BulkReport {
    /// Whether every recipient was reached.
    pub fn all_delivered(&self) -> bool {
        self.delivered == self.total
    }
}

/// Dispatches batches of notifications through a shared engine.
#[derive(Debug, Clone)]
pub struct BulkDispatcher {
    engine: Arc<MessagingEngine>,
    batch_size: usize,
    concurrency: usize,
}

impl BulkDispatcher {
    /// Create a dispatcher with the given batch size and concurrency limit.
    pub fn new(engine: Arc<MessagingEngine>, batch_size: usize, concurrency: usize) -> Self {
        Self {
            engine,
            batch_size: batch_size.max(1),
            concurrency: concurrency.max(1),
        }
    }

    /// Dispatch all requests in batches of `batch_size`, at most
    /// `concurrency` in flight inside each batch. A batch finishes before
    /// the next one starts.
    pub async fn dispatch(&self, requests: Vec<NotificationRequest>) -> BulkReport {
        let total = requests.len();
        info!(
            total,
            batch_size = self.batch_size,
            concurrency = self.concurrency,
            "starting bulk dispatch"
        );

        let mut report = BulkReport {
            total,
            ..Default::default()
        };

        let mut remaining = requests;
        while !remaining.is_empty() {
            let rest = remaining.split_off(self.batch_size.min(remaining.len()));
            let batch = std::mem::replace(&mut remaining, rest);
            self.dispatch_batch(batch, &mut report).await;
        }

        info!(
            delivered = report.delivered,
            suppressed = report.suppressed,
            failed = report.failed,
            "bulk dispatch finished"
        );
        report
    }

    async fn dispatch_batch(&self, batch: Vec<NotificationRequest>, report: &mut BulkReport) {
        let engine = self.engine.clone();
        let results: Vec<(ContactId, crate::Result<DispatchStatus>)> =
            stream::iter(batch.into_iter().map(move |request| {
                let engine = engine.clone();
                let recipient = request.recipient.clone();
                async move {
                    let result = engine.notify(request).await.map(|o| o.status);
                    (recipient, result)
                }
            }))
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        for (recipient, result) in results {
            match result {
                Ok(DispatchStatus::Delivered(_)) => report.delivered += 1,
                Ok(DispatchStatus::Suppressed) => report.suppressed += 1,
                Ok(DispatchStatus::AllFailed) => report.failed += 1,
                Err(e) => {
                    warn!(recipient = %recipient, error = %e, "bulk dispatch entry failed");
                    report.failed += 1;
                    report.errors.push((recipient, e.to_string()));
                }
            }
        }
    }
}
