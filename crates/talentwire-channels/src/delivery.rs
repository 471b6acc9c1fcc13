//! Delivery tracking and retry bookkeeping.
//!
//! One [`DeliveryRecord`] is kept per provider attempt chain. The log is
//! in-memory and bounded; there is no durable queue by design.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use talentwire_core::types::{DeliveryId, DeliveryRecord, DeliveryState};
use tokio::sync::RwLock;
use tracing::debug;

/// Exponential backoff policy for retriable provider failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum provider calls for one channel.
    pub max_retries: u32,

    /// Initial retry delay.
    pub initial_delay: Duration,

    /// Cap on the retry delay.
    pub max_delay: Duration,

    /// Backoff multiplier.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Build a policy from dispatch settings.
    pub fn from_settings(settings: &talentwire_core::config::DispatchSettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            initial_delay: Duration::from_millis(settings.initial_retry_delay_ms),
            max_delay: Duration::from_millis(settings.max_retry_delay_ms),
            multiplier: settings.retry_multiplier,
        }
    }

    /// Whether another attempt is allowed after `attempts` calls.
    pub fn allows_retry(&self, attempts: u32) -> bool {
        attempts < self.max_retries
    }

    /// Backoff delay before attempt number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(31) as i32;
        let delay = self.initial_delay.mul_f64(self.multiplier.powi(exp));
        delay.min(self.max_delay)
    }
}

/// In-memory, bounded log of delivery records.
#[derive(Debug)]
pub struct DeliveryLog {
    inner: RwLock<LogInner>,
    capacity: usize,
}

#[derive(Debug, Default)]
struct LogInner {
    records: HashMap<DeliveryId, DeliveryRecord>,
    order: VecDeque<DeliveryId>,
}

impl DeliveryLog {
    /// Create a log retaining up to `capacity` records.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(LogInner::default()),
            capacity: capacity.max(1),
        }
    }

    /// Insert a record, evicting the oldest when full.
    pub async fn record(&self, record: DeliveryRecord) {
        let mut inner = self.inner.write().await;

        if inner.order.len() >= self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.records.remove(&oldest);
            }
        }

        debug!(delivery = %record.id, state = ?record.state, "recording delivery");
        inner.order.push_back(record.id.clone());
        inner.records.insert(record.id.clone(), record);
    }

    /// Update an existing record in place.
    pub async fn update<F>(&self, id: &DeliveryId, f: F)
    where
        F: FnOnce(&mut DeliveryRecord),
    {
        let mut inner = self.inner.write().await;
        if let Some(record) = inner.records.get_mut(id) {
            f(record);
            record.updated_at = chrono::Utc::now();
        }
    }

    /// Fetch a record by ID.
    pub async fn get(&self, id: &DeliveryId) -> Option<DeliveryRecord> {
        self.inner.read().await.records.get(id).cloned()
    }

    /// The most recent `n` records, newest first.
    pub async fn recent(&self, n: usize) -> Vec<DeliveryRecord> {
        let inner = self.inner.read().await;
        inner
            .order
            .iter()
            .rev()
            .take(n)
            .filter_map(|id| inner.records.get(id).cloned())
            .collect()
    }

    /// Per-state counters across retained records.
    pub async fn stats(&self) -> DeliveryStats {
        let inner = self.inner.read().await;
        let mut stats = DeliveryStats::default();

        for record in inner.records.values() {
            match record.state {
                DeliveryState::Pending => stats.pending += 1,
                DeliveryState::InProgress => stats.in_progress += 1,
                DeliveryState::Delivered => stats.delivered += 1,
                DeliveryState::Failed => stats.failed += 1,
                DeliveryState::Dropped => stats.dropped += 1,
                DeliveryState::Suppressed => stats.suppressed += 1,
            }
        }

        stats
    }

    /// Number of retained records.
    pub async fn len(&self) -> usize {
        self.inner.read().await.order.len()
    }

    /// Whether the log is empty.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Counters over retained delivery records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryStats {
    /// Queued, not yet attempted.
    pub pending: usize,

    /// Provider call in flight.
    pub in_progress: usize,

    /// Accepted by a provider.
    pub delivered: usize,

    /// Failed, may retry.
    pub failed: usize,

    /// Permanently failed.
    pub dropped: usize,

    /// Suppressed by DND.
    pub suppressed: usize,
}
