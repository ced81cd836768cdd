//! Configuration schema definitions.
//!
//! This module defines the on-disk configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.
//! Policy fields accept both the snake_case TOML keys and the camelCase keys
//! of the legacy `config.json` and `fastcode.yml` layouts.

use serde::{Deserialize, Serialize};

/// Default listen host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default listen port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default upstream size limit (10 GiB).
pub const DEFAULT_SIZE_LIMIT: i64 = 10 * 1024 * 1024 * 1024;

/// Default snapshot refresh interval (10 minutes).
pub const DEFAULT_REFRESH_SECS: u64 = 600;

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listen host.
    pub host: String,

    /// Listen port.
    pub port: u16,

    /// Largest upstream body (declared `Content-Length`) that will be relayed.
    /// Zero or negative means the default.
    #[serde(alias = "sizeLimit")]
    pub size_limit: i64,

    /// GitHub owner/repo whitelist.
    #[serde(alias = "whiteList")]
    pub white_list: Vec<String>,

    /// GitHub owner/repo blacklist.
    #[serde(alias = "blackList")]
    pub black_list: Vec<String>,

    /// Whether URLs that are not GitHub resources may be proxied at all.
    #[serde(alias = "allowProxyAll")]
    pub allow_proxy_all: bool,

    /// Substring whitelist for non-GitHub URLs.
    #[serde(alias = "otherWhiteList")]
    pub other_white_list: Vec<String>,

    /// Substring blacklist for non-GitHub URLs.
    #[serde(alias = "otherBlackList")]
    pub other_black_list: Vec<String>,

    /// Snapshot refresh settings.
    pub refresh: RefreshConfig,

    /// Upstream client settings.
    pub upstream: UpstreamConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            size_limit: DEFAULT_SIZE_LIMIT,
            white_list: Vec::new(),
            black_list: Vec::new(),
            allow_proxy_all: false,
            other_white_list: Vec::new(),
            other_black_list: Vec::new(),
            refresh: RefreshConfig::default(),
            upstream: UpstreamConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl ProxyConfig {
    /// Listen address in `host:port` form.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Size limit in bytes, with non-positive values mapped to the default.
    pub fn size_limit_bytes(&self) -> u64 {
        u64::try_from(self.size_limit)
            .ok()
            .filter(|&limit| limit > 0)
            .unwrap_or(DEFAULT_SIZE_LIMIT as u64)
    }
}

/// Snapshot refresh configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Interval between periodic reloads in seconds.
    pub interval_secs: u64,

    /// Also reload as soon as the file changes on disk.
    pub watch: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_REFRESH_SECS,
            watch: false,
        }
    }
}

/// Upstream HTTP client configuration.
///
/// Applied once when the client is built; changing these requires a restart.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Connection establishment timeout (TCP + TLS handshake) in seconds.
    pub connect_timeout_secs: u64,

    /// TCP keep-alive interval in seconds.
    pub keepalive_secs: u64,

    /// How long an idle pooled connection is kept, in seconds.
    pub pool_idle_timeout_secs: u64,

    /// Maximum idle pooled connections per upstream host.
    pub pool_max_idle_per_host: usize,

    /// Follow upstream redirects instead of relaying them to the client.
    pub follow_redirects: bool,

    /// Maximum redirect hops when following.
    pub max_redirects: usize,

    /// Optional outbound proxy for all upstream requests.
    pub proxy: Option<String>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            keepalive_secs: 30,
            pool_idle_timeout_secs: 90,
            pool_max_idle_per_host: 1000,
            follow_redirects: true,
            max_redirects: 10,
            proxy: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
