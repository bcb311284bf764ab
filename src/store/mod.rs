// Bounded event store and broadcast fan-out

mod bounded;
mod metrics;
#[cfg(test)]
mod tests;

pub use bounded::BoundedLog;
pub use metrics::{MetricsSnapshot, MetricsTracker};

use crate::config::StoreConfig;
use crate::event::{normalize_many, Event};
use serde::Serialize;
use serde_json::Value;
use std::sync::RwLock;
use tokio::sync::broadcast;
use tracing::debug;

/// Broadcast channel depth per subscriber. A receiver that falls further
/// behind than this lags (drops its own backlog) without affecting others.
const BROADCAST_CAPACITY: usize = 1024;

/// Server-side authority over the live event window.
///
/// Holds three independently capped logs (all events, telemetry only,
/// detections only) behind a single lock, so an ingest is one atomic
/// append-and-evict step relative to readers and no torn state is ever
/// observable. Every accepted event is fanned out to broadcast subscribers.
pub struct EventStore {
    logs: RwLock<Logs>,
    events_tx: broadcast::Sender<Event>,
    config: StoreConfig,
    pub metrics: MetricsTracker,
}

struct Logs {
    events: BoundedLog,
    telemetry: BoundedLog,
    detections: BoundedLog,
}

/// Collection lengths at summary time
#[derive(Debug, Clone, Serialize)]
pub struct StoreTotals {
    pub events: usize,
    pub telemetry: usize,
    pub detections: usize,
}

/// Aggregate store view for the summary query
#[derive(Debug, Clone, Serialize)]
pub struct StoreSummary {
    pub totals: StoreTotals,
    #[serde(rename = "latestTelemetry")]
    pub latest_telemetry: Option<Event>,
    #[serde(rename = "latestDetection")]
    pub latest_detection: Option<Event>,
    pub metrics: MetricsSnapshot,
}

impl EventStore {
    pub fn new(config: StoreConfig) -> Self {
        let (events_tx, _) = broadcast::channel(BROADCAST_CAPACITY);

        Self {
            logs: RwLock::new(Logs {
                events: BoundedLog::new(config.max_events),
                telemetry: BoundedLog::new(config.max_telemetry),
                detections: BoundedLog::new(config.max_detections),
            }),
            events_tx,
            config,
            metrics: MetricsTracker::new(),
        }
    }

    /// Ingest one normalized event: append to the aggregate log, to the
    /// kind-specific log when the kind prefix matches, then broadcast.
    pub fn ingest(&self, event: Event) {
        {
            let mut logs = self.logs.write().unwrap();
            logs.events.push(event.clone());
            if event.is_telemetry() {
                logs.telemetry.push(event.clone());
            } else if event.is_detection() {
                logs.detections.push(event.clone());
            }
        }

        self.metrics.record_event();
        debug!(event_id = %event.id, kind = %event.kind, "Event ingested");

        // No receivers is not an error; fan-out is best-effort
        let _ = self.events_tx.send(event);
    }

    /// Normalize a raw submission (single object or array) and ingest every
    /// record that survives normalization. Returns the accepted count.
    pub fn ingest_many(&self, raw: &Value, fallback_kind: Option<&str>) -> usize {
        let events = normalize_many(raw, fallback_kind);
        let accepted = events.len();
        for event in events {
            self.ingest(event);
        }
        accepted
    }

    /// Subscribe to the live event feed
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events_tx.subscribe()
    }

    /// Catch-up snapshot for a newly connected subscriber
    pub fn catch_up(&self) -> Vec<Event> {
        self.list_events(Some(self.config.snapshot_window), None)
    }

    /// The most recent `limit` events, optionally only those strictly newer
    /// than `since`, oldest-first.
    pub fn list_events(&self, limit: Option<usize>, since: Option<i64>) -> Vec<Event> {
        let limit = clamp_limit(limit, self.config.default_window, self.config.max_events);
        self.logs.read().unwrap().events.window(limit, since)
    }

    pub fn list_telemetry(&self, limit: Option<usize>) -> Vec<Event> {
        let limit = clamp_limit(limit, self.config.default_window, self.config.max_telemetry);
        self.logs.read().unwrap().telemetry.window(limit, None)
    }

    pub fn list_detections(&self, limit: Option<usize>) -> Vec<Event> {
        let limit = clamp_limit(limit, self.config.default_window, self.config.max_detections);
        self.logs.read().unwrap().detections.window(limit, None)
    }

    /// Aggregate counts plus the single most recent telemetry and detection
    /// entries, read under one lock so the view is consistent.
    pub fn summary(&self) -> StoreSummary {
        let logs = self.logs.read().unwrap();
        StoreSummary {
            totals: StoreTotals {
                events: logs.events.len(),
                telemetry: logs.telemetry.len(),
                detections: logs.detections.len(),
            },
            latest_telemetry: logs.telemetry.latest().cloned(),
            latest_detection: logs.detections.latest().cloned(),
            metrics: self.metrics.snapshot(),
        }
    }
}

/// Caller-supplied limits can never exceed the collection's capacity.
fn clamp_limit(limit: Option<usize>, default: usize, cap: usize) -> usize {
    limit.unwrap_or(default).clamp(1, cap.max(1))
}
