//! Configuration schema definitions.
//!
//! This module defines the configuration structure for both processes: the
//! authenticating edge proxy and the demo backend service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the edge proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Where authorized requests are forwarded.
    pub upstream: UpstreamConfig,

    /// Timeout configuration for the inbound side.
    pub timeouts: TimeoutConfig,

    /// Basic Authentication settings.
    pub auth: AuthConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Root configuration for the backend service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendServiceConfig {
    pub listener: ListenerConfig,

    /// Static identity reported by the informational endpoints.
    pub identity: IdentityConfig,

    pub timeouts: TimeoutConfig,

    pub observability: ObservabilityConfig,
}

impl Default for BackendServiceConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig {
                bind_address: "127.0.0.1:5000".to_string(),
            },
            identity: IdentityConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream (backend service) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Backend address on the shared local network (e.g., "127.0.0.1:5000").
    pub address: String,

    /// TCP connect timeout in milliseconds.
    pub connect_timeout_ms: u64,

    /// Time allowed for the backend to produce response headers, in milliseconds.
    pub response_timeout_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:5000".to_string(),
            connect_timeout_ms: 2_000,
            response_timeout_ms: 10_000,
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// HTTP Basic Authentication configuration.
///
/// There is no default credential: `credentials_file` must be
/// provided through the config file or `AUTHGATE_CREDENTIALS_FILE`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Realm announced in the `WWW-Authenticate` challenge.
    pub realm: String,

    /// Path to the credential file (`user:$sha256$salt$digest` per line).
    pub credentials_file: Option<String>,

    /// Exact, case-sensitive paths that bypass authentication.
    pub exempt_paths: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            realm: "Restricted".to_string(),
            credentials_file: None,
            exempt_paths: vec!["/health".to_string()],
        }
    }
}

/// Identity reported by the backend's informational endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Greeting returned by `GET /`.
    pub message: String,

    /// Version string returned by `GET /`.
    pub version: String,

    /// Application name returned by `GET /api/info`.
    pub app_name: String,

    /// Deployment label; overridden by the `ENVIRONMENT` variable.
    pub environment: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            message: "Hello from Flask Demo!".to_string(),
            version: "1.0.0".to_string(),
            app_name: "Flask Demo Container".to_string(),
            environment: "production".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
