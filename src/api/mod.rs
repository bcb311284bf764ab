// HTTP and WebSocket APIs

mod ingest;
pub mod protocol;
pub mod query;
pub mod websocket;

pub use ingest::{create_ingest_router, IngestAppState};
pub use query::{create_query_router, QueryAppState};
pub use websocket::{create_ws_router, ws_handler, WsAppState};

use crate::config::SkywatchConfig;
use crate::store::EventStore;
use axum::Router;
use std::sync::Arc;

/// Assemble the full API surface over one store
pub fn create_app(store: Arc<EventStore>, config: &SkywatchConfig) -> Router {
    Router::new()
        .merge(create_ingest_router(IngestAppState {
            store: Arc::clone(&store),
            body_limit_single_bytes: config.server.body_limit_single_bytes,
            body_limit_batch_bytes: config.server.body_limit_batch_bytes,
        }))
        .merge(create_query_router(Arc::new(QueryAppState {
            store: Arc::clone(&store),
            cluster_threshold_m: config.analytics.cluster_threshold_m,
        })))
        .merge(create_ws_router(Arc::new(WsAppState { store })))
}
