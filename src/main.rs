use anyhow::Result;
use skywatch::api::create_app;
use skywatch::config::{load_config, SkywatchConfig};
use skywatch::store::EventStore;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skywatch=info".into()),
        )
        .init();

    info!("Skywatch starting...");

    let mut config = load_effective_config();
    config.apply_env_overrides();
    info!(
        max_events = config.store.max_events,
        max_telemetry = config.store.max_telemetry,
        max_detections = config.store.max_detections,
        cluster_threshold_m = config.analytics.cluster_threshold_m,
        "Configuration loaded"
    );

    let store = Arc::new(EventStore::new(config.store.clone()));

    let app = create_app(Arc::clone(&store), &config).layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!(bind = %config.server.bind, "Skywatch listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Skywatch stopped");
    Ok(())
}

/// Config file from SKYWATCH_CONFIG (default ./skywatch.toml), falling back
/// to built-in defaults when no usable file exists.
fn load_effective_config() -> SkywatchConfig {
    let path = std::env::var("SKYWATCH_CONFIG").unwrap_or_else(|_| "skywatch.toml".to_string());
    match load_config(&path) {
        Ok(config) => {
            info!(path = %path, "Loaded configuration file");
            config
        }
        Err(e) => {
            info!(path = %path, error = %e, "No usable config file, using defaults");
            SkywatchConfig::default()
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install ctrl-c handler");
    }
}
