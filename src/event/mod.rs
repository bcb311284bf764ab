// Event model and normalization
use serde::{Deserialize, Serialize};
use serde_json::Value;

mod normalize;

pub use normalize::{normalize, normalize_many, NormalizeError};

/// Canonical event flowing through Skywatch.
///
/// Events are immutable once normalized: an update to the same logical
/// entity arrives as a new event sharing a derived identity key (see
/// [`Event::logical_key`]), never as a mutation of a stored one.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Event {
    /// Sender-assigned id, or a generated UUIDv4
    pub id: String,

    /// Event classifier, e.g. "telemetry:update" or "detection:new"
    #[serde(rename = "type")]
    pub kind: String,

    /// Unix epoch milliseconds
    pub timestamp: i64,

    /// Domain payload (always a JSON object, possibly empty)
    pub payload: Value,

    /// Optional auxiliary metadata, passed through untouched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl Event {
    pub fn is_telemetry(&self) -> bool {
        self.kind.starts_with("telemetry")
    }

    pub fn is_detection(&self) -> bool {
        self.kind.starts_with("detection")
    }

    /// String-valued payload field, if present
    pub fn payload_str(&self, field: &str) -> Option<&str> {
        self.payload.get(field).and_then(Value::as_str)
    }

    /// Finite numeric payload field. Non-finite values are treated as absent.
    pub fn payload_f64(&self, field: &str) -> Option<f64> {
        self.payload
            .get(field)
            .and_then(Value::as_f64)
            .filter(|v| v.is_finite())
    }

    /// Logical identity key used for deduplication.
    ///
    /// Detections key on their `detection_id`; telemetry keys on `drone_id`
    /// plus a coarse time bucket of `bucket_ms` width, so near-simultaneous
    /// updates from one vehicle collapse into the same slot while a new slot
    /// opens once enough time passes. Everything else keys on the event's
    /// own id, or `kind:timestamp` as a last resort.
    pub fn logical_key(&self, bucket_ms: i64) -> String {
        if self.is_detection() {
            if let Some(id) = self.payload_str("detection_id") {
                return format!("det:{id}");
            }
        }
        if self.is_telemetry() {
            if let Some(id) = self.payload_str("drone_id") {
                let bucket = self.timestamp.div_euclid(bucket_ms.max(1));
                return format!("tel:{id}:{bucket}");
            }
        }
        if !self.id.is_empty() {
            return self.id.clone();
        }
        format!("{}:{}", self.kind, self.timestamp)
    }
}
