//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, apply environment overrides)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig / BackendServiceConfig (validated, immutable)
//!     → consumed once at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_backend_config, load_proxy_config, ConfigError};
pub use schema::{
    AuthConfig, BackendServiceConfig, IdentityConfig, ListenerConfig, ObservabilityConfig,
    ProxyConfig, TimeoutConfig, UpstreamConfig,
};
