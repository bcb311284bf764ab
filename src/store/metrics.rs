use chrono::Utc;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Tracks ingestion and subscriber metrics for the event store
#[derive(Clone)]
pub struct MetricsTracker {
    /// Total events ingested (lifetime counter)
    total_events: Arc<AtomicU64>,

    /// Event timestamps for rate calculation (sliding 5-second window)
    event_timestamps: Arc<RwLock<VecDeque<i64>>>,

    /// WebSocket connection count
    websocket_connections: Arc<AtomicU64>,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self {
            total_events: Arc::new(AtomicU64::new(0)),
            event_timestamps: Arc::new(RwLock::new(VecDeque::new())),
            websocket_connections: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Record an ingested event (call from EventStore::ingest)
    pub fn record_event(&self) {
        self.total_events.fetch_add(1, Ordering::Relaxed);

        let now = Utc::now().timestamp_millis();
        let mut timestamps = self.event_timestamps.write().unwrap();
        timestamps.push_back(now);

        // Prune timestamps older than the 5-second window
        while let Some(&oldest) = timestamps.front() {
            if now - oldest > 5000 {
                timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    /// Current event rate (events per second over the last 5 seconds)
    pub fn event_rate(&self) -> f64 {
        let timestamps = self.event_timestamps.read().unwrap();
        timestamps.len() as f64 / 5.0
    }

    pub fn increment_ws_connection(&self) {
        self.websocket_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn decrement_ws_connection(&self) {
        self.websocket_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn ws_connection_count(&self) -> u64 {
        self.websocket_connections.load(Ordering::Relaxed)
    }

    pub fn total_events(&self) -> u64 {
        self.total_events.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_events: self.total_events(),
            event_rate: self.event_rate(),
            websocket_connections: self.ws_connection_count(),
        }
    }
}

impl Default for MetricsTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time metrics view, included in the summary query
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    #[serde(rename = "totalEvents")]
    pub total_events: u64,
    #[serde(rename = "eventRate")]
    pub event_rate: f64,
    #[serde(rename = "websocketConnections")]
    pub websocket_connections: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_event_increments_total() {
        let metrics = MetricsTracker::new();
        assert_eq!(metrics.total_events(), 0);

        metrics.record_event();
        metrics.record_event();
        assert_eq!(metrics.total_events(), 2);
        assert!(metrics.event_rate() > 0.0);
    }

    #[test]
    fn test_ws_connection_gauge() {
        let metrics = MetricsTracker::new();
        metrics.increment_ws_connection();
        metrics.increment_ws_connection();
        metrics.decrement_ws_connection();
        assert_eq!(metrics.ws_connection_count(), 1);
    }
}
