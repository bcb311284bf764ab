use crate::event::Event;
use chrono::Utc;
use serde::Serialize;

/// Server → Client: greeting sent immediately after connect
#[derive(Debug, Clone, Serialize)]
pub struct HelloMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    #[serde(rename = "serverTime")]
    pub server_time: i64,
    /// Aggregate event count at connect time
    pub events: usize,
}

impl HelloMessage {
    pub fn new(events: usize) -> Self {
        Self {
            msg_type: "hello".to_string(),
            server_time: Utc::now().timestamp_millis(),
            events,
        }
    }
}

/// Server → Client: catch-up snapshot for a late joiner
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub count: usize,
    pub events: Vec<Event>,
}

impl SnapshotMessage {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            msg_type: "snapshot".to_string(),
            count: events.len(),
            events,
        }
    }
}

/// Server → Client: live event notification
#[derive(Debug, Clone, Serialize)]
pub struct EventMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub event: Event,
}

impl From<Event> for EventMessage {
    fn from(event: Event) -> Self {
        Self {
            msg_type: "event".to_string(),
            event,
        }
    }
}
