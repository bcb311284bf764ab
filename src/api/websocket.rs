use crate::api::protocol::{EventMessage, HelloMessage, SnapshotMessage};
use crate::event::Event;
use crate::store::EventStore;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
    routing::get,
    Router,
};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

/// Shared application state for the WebSocket handler
#[derive(Clone)]
pub struct WsAppState {
    pub store: Arc<EventStore>,
}

/// Create WebSocket router
pub fn create_ws_router(state: Arc<WsAppState>) -> Router {
    Router::new()
        .route("/api/ws", get(ws_handler))
        .with_state(state)
}

/// GET /api/ws - WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<WsAppState>>) -> Response {
    info!("WebSocket upgrade request received");
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle WebSocket connection lifecycle.
///
/// A new subscriber gets a greeting, then a catch-up snapshot of the most
/// recent events when the store is non-empty, then live forwarding of every
/// broadcast event. Delivery is best-effort at-most-once: a connection that
/// lags simply skips its own backlog, and one that drops stops receiving.
async fn handle_socket(mut socket: WebSocket, state: Arc<WsAppState>) {
    // Subscribe before the catch-up read so no event falls in the gap
    let mut events_rx = state.store.subscribe();

    state.store.metrics.increment_ws_connection();
    info!("WebSocket connection established");

    if greet(&mut socket, &state).await.is_err() {
        warn!("WebSocket closed during greeting");
        state.store.metrics.decrement_ws_connection();
        return;
    }

    loop {
        tokio::select! {
            // Client traffic: answer pings, honor close, ignore the rest
            Some(msg) = socket.recv() => {
                match msg {
                    Ok(Message::Close(_)) => {
                        info!("WebSocket client disconnected");
                        break;
                    }
                    Ok(Message::Ping(data)) => {
                        if let Err(e) = socket.send(Message::Pong(data)).await {
                            error!(error = %e, "Failed to send pong");
                            break;
                        }
                    }
                    Ok(_) => {
                        // Ignore text, binary, pong messages
                    }
                    Err(e) => {
                        warn!(error = %e, "WebSocket error");
                        break;
                    }
                }
            }

            // Live events from the broadcast channel
            result = events_rx.recv() => {
                match result {
                    Ok(event) => {
                        if let Err(e) = send_event(&mut socket, event).await {
                            error!(error = %e, "Failed to send event");
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped = skipped, "WebSocket lagged, skipped events");
                        // Continue processing
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        error!("Event broadcast channel closed");
                        break;
                    }
                }
            }

            else => {
                break;
            }
        }
    }

    state.store.metrics.decrement_ws_connection();
    info!("WebSocket connection closed");
}

/// Greeting acknowledgment, then a catch-up snapshot so a late joiner does
/// not need to poll for what it missed.
async fn greet(socket: &mut WebSocket, state: &WsAppState) -> anyhow::Result<()> {
    let summary = state.store.summary();
    let hello = HelloMessage::new(summary.totals.events);
    socket
        .send(Message::Text(serde_json::to_string(&hello)?))
        .await?;

    let snapshot = state.store.catch_up();
    if !snapshot.is_empty() {
        let msg = SnapshotMessage::new(snapshot);
        socket
            .send(Message::Text(serde_json::to_string(&msg)?))
            .await?;
    }

    Ok(())
}

async fn send_event(socket: &mut WebSocket, event: Event) -> anyhow::Result<()> {
    let msg = EventMessage::from(event);
    socket.send(Message::Text(serde_json::to_string(&msg)?)).await?;
    Ok(())
}
