use super::Event;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::fmt;
use tracing::debug;
use uuid::Uuid;

/// Normalization errors for raw inbound records
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizeError {
    NotAnObject,
    MissingKind,
}

impl fmt::Display for NormalizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizeError::NotAnObject => write!(f, "record is not a JSON object"),
            NormalizeError::MissingKind => {
                write!(f, "record has no event type and no fallback was supplied")
            }
        }
    }
}

impl std::error::Error for NormalizeError {}

/// Validates and canonicalizes a raw inbound record into an [`Event`].
///
/// Resolution rules:
/// - kind: trimmed `raw.type` if non-empty, else `fallback_kind`; rejects
///   when neither resolves
/// - timestamp: number passes through, a parseable date string is converted,
///   anything else becomes "now"
/// - id: `raw.id` if non-empty, else a generated UUIDv4
/// - payload: `raw.payload` when it is an object, else `{}`
/// - meta: `raw.meta` when it is an object, else omitted
pub fn normalize(raw: &Value, fallback_kind: Option<&str>) -> Result<Event, NormalizeError> {
    normalize_at(raw, fallback_kind, Utc::now().timestamp_millis())
}

/// Normalization against an explicit clock, so tests can pin "now".
pub(crate) fn normalize_at(
    raw: &Value,
    fallback_kind: Option<&str>,
    now_ms: i64,
) -> Result<Event, NormalizeError> {
    let obj = raw.as_object().ok_or(NormalizeError::NotAnObject)?;

    let kind = match obj.get("type").and_then(Value::as_str).map(str::trim) {
        Some(k) if !k.is_empty() => k.to_string(),
        _ => match fallback_kind.map(str::trim) {
            Some(f) if !f.is_empty() => f.to_string(),
            _ => return Err(NormalizeError::MissingKind),
        },
    };

    let timestamp = coerce_timestamp(obj.get("timestamp"), now_ms);

    let id = match obj.get("id") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => Uuid::new_v4().to_string(),
    };

    let payload = match obj.get("payload") {
        Some(Value::Object(map)) => Value::Object(map.clone()),
        _ => Value::Object(Map::new()),
    };

    let meta = obj.get("meta").filter(|m| m.is_object()).cloned();

    Ok(Event {
        id,
        kind,
        timestamp,
        payload,
        meta,
    })
}

/// Normalizes a batch. A single object is treated as a one-element batch;
/// malformed elements are dropped so sibling records still land.
pub fn normalize_many(raw: &Value, fallback_kind: Option<&str>) -> Vec<Event> {
    let batch: Vec<&Value> = match raw {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    let mut accepted = Vec::with_capacity(batch.len());
    for item in batch {
        match normalize(item, fallback_kind) {
            Ok(event) => accepted.push(event),
            Err(e) => debug!(error = %e, "Dropping malformed record"),
        }
    }
    accepted
}

fn coerce_timestamp(raw: Option<&Value>, now_ms: i64) -> i64 {
    match raw {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(now_ms),
        Some(Value::String(s)) => parse_date_ms(s).unwrap_or(now_ms),
        _ => now_ms,
    }
}

/// Parses RFC 3339 first, then chrono's lenient `DateTime<Utc>` format.
fn parse_date_ms(s: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc).timestamp_millis())
        .ok()
        .or_else(|| s.parse::<DateTime<Utc>>().ok().map(|dt| dt.timestamp_millis()))
}
