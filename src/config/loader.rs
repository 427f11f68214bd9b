//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::config::schema::{BackendServiceConfig, ProxyConfig};
use crate::config::validation::{validate_backend_config, validate_proxy_config, ValidationError};

/// Environment variable naming the credential file.
pub const ENV_CREDENTIALS_FILE: &str = "AUTHGATE_CREDENTIALS_FILE";
/// Environment variable overriding the upstream address.
pub const ENV_UPSTREAM: &str = "AUTHGATE_UPSTREAM";
/// Environment variable overriding the authentication realm.
pub const ENV_REALM: &str = "AUTHGATE_REALM";
/// Environment variable carrying the deployment label.
pub const ENV_ENVIRONMENT: &str = "ENVIRONMENT";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn read_toml<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T, ConfigError> {
    match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        }
        None => Ok(T::default()),
    }
}

/// Load, override and validate the proxy configuration.
///
/// With no path, the built-in defaults are used; environment overrides are
/// applied in both cases.
pub fn load_proxy_config(path: Option<&Path>) -> Result<ProxyConfig, ConfigError> {
    let mut config: ProxyConfig = read_toml(path)?;
    apply_proxy_env(&mut config, |key| std::env::var(key).ok());
    validate_proxy_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load, override and validate the backend service configuration.
pub fn load_backend_config(path: Option<&Path>) -> Result<BackendServiceConfig, ConfigError> {
    let mut config: BackendServiceConfig = read_toml(path)?;
    apply_backend_env(&mut config, |key| std::env::var(key).ok());
    validate_backend_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply environment overrides to a proxy config.
///
/// Takes a lookup function so tests do not have to mutate the real environment.
pub fn apply_proxy_env<F>(config: &mut ProxyConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = lookup(ENV_CREDENTIALS_FILE).filter(|v| !v.is_empty()) {
        config.auth.credentials_file = Some(path);
    }
    if let Some(upstream) = lookup(ENV_UPSTREAM).filter(|v| !v.is_empty()) {
        config.upstream.address = upstream;
    }
    if let Some(realm) = lookup(ENV_REALM).filter(|v| !v.is_empty()) {
        config.auth.realm = realm;
    }
}

/// Apply environment overrides to a backend config.
pub fn apply_backend_env<F>(config: &mut BackendServiceConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(environment) = lookup(ENV_ENVIRONMENT) {
        config.identity.environment = environment;
    }
}
