use crate::store::EventStore;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Shared application state for ingestion endpoints
#[derive(Clone)]
pub struct IngestAppState {
    pub store: Arc<EventStore>,
    pub body_limit_single_bytes: usize,
    pub body_limit_batch_bytes: usize,
}

/// Success response: how many records were accepted
#[derive(Serialize)]
struct AcceptedResponse {
    accepted: usize,
}

/// Error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Create the ingestion router.
///
/// Each endpoint accepts either a single JSON object or an array of them;
/// the telemetry/detection routes supply the fallback event type for records
/// that omit their own.
pub fn create_ingest_router(state: IngestAppState) -> Router {
    Router::new()
        .route("/api/telemetry", post(ingest_telemetry))
        .route("/api/detections", post(ingest_detections))
        .route("/api/events", post(ingest_events))
        .with_state(Arc::new(state))
}

/// POST /api/telemetry - Submit telemetry records
async fn ingest_telemetry(
    State(state): State<Arc<IngestAppState>>,
    body: Bytes,
) -> Result<Json<AcceptedResponse>, IngestError> {
    submit(&state, &body, Some("telemetry:update"))
}

/// POST /api/detections - Submit detection records
async fn ingest_detections(
    State(state): State<Arc<IngestAppState>>,
    body: Bytes,
) -> Result<Json<AcceptedResponse>, IngestError> {
    submit(&state, &body, Some("detection:new"))
}

/// POST /api/events - Submit records that carry their own type
async fn ingest_events(
    State(state): State<Arc<IngestAppState>>,
    body: Bytes,
) -> Result<Json<AcceptedResponse>, IngestError> {
    submit(&state, &body, None)
}

fn submit(
    state: &IngestAppState,
    body: &[u8],
    fallback_kind: Option<&str>,
) -> Result<Json<AcceptedResponse>, IngestError> {
    // Batch submissions (a JSON array) get the larger body limit
    let is_batch = body.iter().find(|b| !b.is_ascii_whitespace()) == Some(&b'[');
    let limit = if is_batch {
        state.body_limit_batch_bytes
    } else {
        state.body_limit_single_bytes
    };
    if body.len() > limit {
        return Err(IngestError::PayloadTooLarge);
    }

    let raw: Value = serde_json::from_slice(body)
        .map_err(|e| IngestError::InvalidBody(e.to_string()))?;

    let accepted = state.store.ingest_many(&raw, fallback_kind);
    if accepted == 0 {
        return Err(IngestError::NothingAccepted);
    }

    info!(accepted, fallback = fallback_kind.unwrap_or("-"), "Records ingested");
    Ok(Json(AcceptedResponse { accepted }))
}

/// Ingestion error types
enum IngestError {
    InvalidBody(String),
    NothingAccepted,
    PayloadTooLarge,
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            IngestError::InvalidBody(msg) => (StatusCode::BAD_REQUEST, msg),
            IngestError::NothingAccepted => (
                StatusCode::BAD_REQUEST,
                "no valid records accepted".to_string(),
            ),
            IngestError::PayloadTooLarge => {
                (StatusCode::PAYLOAD_TOO_LARGE, "payload too large".to_string())
            }
        };

        let body = Json(ErrorResponse {
            error: error_message,
        });
        (status, body).into_response()
    }
}
