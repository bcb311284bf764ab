use serde::Deserialize;

/// Complete Skywatch configuration.
///
/// Constructed once at startup and passed by reference to every component
/// that needs it; nothing reads configuration ambiently after boot.
#[derive(Debug, Clone, Deserialize)]
pub struct SkywatchConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Max request body for single-event submissions (bytes)
    #[serde(default = "default_body_limit_single")]
    pub body_limit_single_bytes: usize,
    /// Max request body for batch submissions (bytes)
    #[serde(default = "default_body_limit_batch")]
    pub body_limit_batch_bytes: usize,
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_body_limit_single() -> usize {
    1_048_576 // 1 MB
}

fn default_body_limit_batch() -> usize {
    10_485_760 // 10 MB
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            body_limit_single_bytes: default_body_limit_single(),
            body_limit_batch_bytes: default_body_limit_batch(),
        }
    }
}

/// Bounded event store capacities and query windows
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_max_events")]
    pub max_events: usize,
    #[serde(default = "default_max_telemetry")]
    pub max_telemetry: usize,
    #[serde(default = "default_max_detections")]
    pub max_detections: usize,
    /// Default query window when the caller supplies no limit
    #[serde(default = "default_window")]
    pub default_window: usize,
    /// Catch-up snapshot size for newly connected subscribers
    #[serde(default = "default_window")]
    pub snapshot_window: usize,
}

fn default_max_events() -> usize {
    5000
}

fn default_max_telemetry() -> usize {
    2000
}

fn default_max_detections() -> usize {
    2000
}

fn default_window() -> usize {
    200
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_events: default_max_events(),
            max_telemetry: default_max_telemetry(),
            max_detections: default_max_detections(),
            default_window: default_window(),
            snapshot_window: default_window(),
        }
    }
}

/// Consumer-side dedup feed configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Identity index capacity (logical key -> latest event)
    #[serde(default = "default_index_capacity")]
    pub index_capacity: usize,
    /// Feed list capacity
    #[serde(default = "default_feed_capacity")]
    pub feed_capacity: usize,
    /// Telemetry dedup time-bucket width (milliseconds)
    #[serde(default = "default_dedup_bucket_ms")]
    pub dedup_bucket_ms: i64,
    /// Snapshot flush period (milliseconds)
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,
}

fn default_index_capacity() -> usize {
    500
}

fn default_feed_capacity() -> usize {
    300
}

fn default_dedup_bucket_ms() -> i64 {
    250
}

fn default_flush_interval_ms() -> u64 {
    120
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            index_capacity: default_index_capacity(),
            feed_capacity: default_feed_capacity(),
            dedup_bucket_ms: default_dedup_bucket_ms(),
            flush_interval_ms: default_flush_interval_ms(),
        }
    }
}

/// Derived-analytics configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsConfig {
    /// Detection clustering distance threshold (meters)
    #[serde(default = "default_cluster_threshold_m")]
    pub cluster_threshold_m: f64,
}

fn default_cluster_threshold_m() -> f64 {
    150.0
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            cluster_threshold_m: default_cluster_threshold_m(),
        }
    }
}

impl Default for SkywatchConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            store: StoreConfig::default(),
            feed: FeedConfig::default(),
            analytics: AnalyticsConfig::default(),
        }
    }
}

impl SkywatchConfig {
    /// Apply SKYWATCH_* environment overrides on top of file/default values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("SKYWATCH_BIND") {
            if !v.is_empty() {
                self.server.bind = v;
            }
        }
        if let Ok(v) = std::env::var("SKYWATCH_MAX_EVENTS") {
            if let Ok(n) = v.parse::<usize>() {
                self.store.max_events = n;
            }
        }
        if let Ok(v) = std::env::var("SKYWATCH_MAX_TELEMETRY") {
            if let Ok(n) = v.parse::<usize>() {
                self.store.max_telemetry = n;
            }
        }
        if let Ok(v) = std::env::var("SKYWATCH_MAX_DETECTIONS") {
            if let Ok(n) = v.parse::<usize>() {
                self.store.max_detections = n;
            }
        }
        if let Ok(v) = std::env::var("SKYWATCH_CLUSTER_THRESHOLD_M") {
            if let Ok(t) = v.parse::<f64>() {
                if t.is_finite() && t > 0.0 {
                    self.analytics.cluster_threshold_m = t;
                }
            }
        }
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &str) -> Result<SkywatchConfig, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)?;
    let config: SkywatchConfig = toml::from_str(&contents)?;
    Ok(config)
}
