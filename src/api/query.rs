use crate::analytics::{cluster_detections, latest_by_drone};
use crate::store::EventStore;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared state for the query API
pub struct QueryAppState {
    pub store: Arc<EventStore>,
    /// Default clustering distance threshold (meters)
    pub cluster_threshold_m: f64,
}

/// Query parameters for the aggregate event listing
#[derive(Deserialize)]
pub struct EventsParams {
    /// Max events to return (clamped to the collection capacity)
    pub limit: Option<usize>,
    /// Only events strictly newer than this epoch-ms timestamp
    pub since: Option<i64>,
}

/// Query parameters for the kind-specific listings
#[derive(Deserialize)]
pub struct WindowParams {
    pub limit: Option<usize>,
}

/// Query parameters for the clustering pass
#[derive(Deserialize)]
pub struct ClusterParams {
    /// Override the distance threshold (meters)
    pub threshold: Option<f64>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Create the query API router
pub fn create_query_router(state: Arc<QueryAppState>) -> Router {
    Router::new()
        .route("/api/events", get(list_events))
        .route("/api/telemetry", get(list_telemetry))
        .route("/api/detections", get(list_detections))
        .route("/api/summary", get(get_summary))
        .route("/api/clusters", get(get_clusters))
        .route("/api/fleet", get(get_fleet))
        .with_state(state)
}

/// GET /api/events?limit=N&since=T - windowed aggregate listing, oldest-first
async fn list_events(
    State(state): State<Arc<QueryAppState>>,
    Query(params): Query<EventsParams>,
) -> Response {
    Json(state.store.list_events(params.limit, params.since)).into_response()
}

/// GET /api/telemetry?limit=N
async fn list_telemetry(
    State(state): State<Arc<QueryAppState>>,
    Query(params): Query<WindowParams>,
) -> Response {
    Json(state.store.list_telemetry(params.limit)).into_response()
}

/// GET /api/detections?limit=N
async fn list_detections(
    State(state): State<Arc<QueryAppState>>,
    Query(params): Query<WindowParams>,
) -> Response {
    Json(state.store.list_detections(params.limit)).into_response()
}

/// GET /api/summary - collection totals plus latest telemetry and detection
async fn get_summary(State(state): State<Arc<QueryAppState>>) -> Response {
    Json(state.store.summary()).into_response()
}

/// GET /api/clusters?threshold=M - spatial clusters over the current
/// detection snapshot, recomputed per request
async fn get_clusters(
    State(state): State<Arc<QueryAppState>>,
    Query(params): Query<ClusterParams>,
) -> Result<Response, QueryError> {
    let threshold = params.threshold.unwrap_or(state.cluster_threshold_m);
    if !threshold.is_finite() || threshold <= 0.0 {
        return Err(QueryError::InvalidThreshold);
    }

    // run over the whole bounded collection, not just the default window
    let detections = state.store.list_detections(Some(usize::MAX));
    let clusters = cluster_detections(&detections, threshold);
    Ok(Json(clusters).into_response())
}

/// GET /api/fleet - latest known telemetry per drone id
async fn get_fleet(State(state): State<Arc<QueryAppState>>) -> Response {
    let telemetry = state.store.list_telemetry(Some(usize::MAX));
    Json(latest_by_drone(&telemetry)).into_response()
}

/// Query error types
#[derive(Debug)]
enum QueryError {
    InvalidThreshold,
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            QueryError::InvalidThreshold => (
                StatusCode::BAD_REQUEST,
                "threshold must be a positive number of meters",
            ),
        };

        let body = Json(ErrorResponse {
            error: error_message.to_string(),
        });
        (status, body).into_response()
    }
}
