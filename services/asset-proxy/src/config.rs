use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Main configuration for the asset proxy
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Service configuration
    #[serde(default)]
    pub service: ServiceConfig,
    /// API configuration
    #[serde(default)]
    pub api: ApiConfig,
    /// Upstream storage configuration
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Service name for logging/metrics
    #[serde(default = "default_service_name")]
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Metrics port (0 disables the exporter)
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
}

/// How asset bytes are handed to the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    /// Forward upstream chunks as they arrive
    #[default]
    Stream,
    /// Read the whole payload before responding
    Buffered,
}

/// HTTP API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// API listen address
    #[serde(default = "default_api_host")]
    pub host: String,
    /// API listen port
    #[serde(default = "default_api_port")]
    pub port: u16,
    /// Answer CORS preflight requests from any origin. Assets are public,
    /// so successful asset responses carry `Access-Control-Allow-Origin: *`
    /// regardless of this flag.
    #[serde(default = "default_true")]
    pub cors_enabled: bool,
    /// `Cache-Control` max-age for successful responses
    #[serde(default = "default_cache_max_age_secs")]
    pub cache_max_age_secs: u64,
    /// Streaming or buffered delivery
    #[serde(default)]
    pub delivery: DeliveryMode,
}

/// Upstream blob-storage configuration
#[derive(Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Media retrieval endpoint; the identifier is appended as a path segment
    #[serde(default = "default_upstream_base_url")]
    pub base_url: String,
    /// Server-held API key; requests fail with 500 while it is unset
    pub api_key: Option<String>,
    /// Upstream request timeout; none when unset
    pub timeout_secs: Option<u64>,
}

// Default value functions
fn default_service_name() -> String {
    "asset-proxy".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_metrics_port() -> u16 {
    9090
}

fn default_api_host() -> String {
    "0.0.0.0".to_string()
}

fn default_api_port() -> u16 {
    3001
}

fn default_true() -> bool {
    true
}

fn default_cache_max_age_secs() -> u64 {
    3600
}

fn default_upstream_base_url() -> String {
    "https://www.googleapis.com/drive/v3/files".to_string()
}

impl Config {
    /// Load configuration from environment and config files
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .set_default("service.name", "asset-proxy")?
            .set_default("service.log_level", "info")?
            // Add config file if present
            .add_source(config::File::with_name("config/asset-proxy").required(false))
            .add_source(config::File::with_name("/etc/folio/asset-proxy").required(false))
            // Override with environment variables
            // PROXY__UPSTREAM__API_KEY -> upstream.api_key
            .add_source(
                config::Environment::with_prefix("PROXY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize().map_err(Into::into)
    }
}

impl UpstreamConfig {
    /// Get upstream timeout as Duration
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
            metrics_port: default_metrics_port(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            port: default_api_port(),
            cors_enabled: default_true(),
            cache_max_age_secs: default_cache_max_age_secs(),
            delivery: DeliveryMode::default(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_upstream_base_url(),
            api_key: None,
            timeout_secs: None,
        }
    }
}
