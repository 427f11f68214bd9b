//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Reject configs that would start without any credential source
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: config → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::{BackendServiceConfig, ObservabilityConfig, ProxyConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

fn check_addr(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            field,
            format!("'{value}' is not a valid socket address"),
        ));
    }
}

fn check_observability(errors: &mut Vec<ValidationError>, config: &ObservabilityConfig) {
    if config.metrics_enabled {
        check_addr(errors, "observability.metrics_address", &config.metrics_address);
    }
}

/// Validate the edge proxy configuration.
pub fn validate_proxy_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_addr(&mut errors, "listener.bind_address", &config.listener.bind_address);
    check_addr(&mut errors, "upstream.address", &config.upstream.address);

    if config.upstream.connect_timeout_ms == 0 {
        errors.push(ValidationError::new("upstream.connect_timeout_ms", "must be > 0"));
    }
    if config.upstream.response_timeout_ms == 0 {
        errors.push(ValidationError::new("upstream.response_timeout_ms", "must be > 0"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be > 0"));
    }

    // The overall deadline must outlast the upstream deadlines it wraps.
    let upstream_budget_ms = config
        .upstream
        .connect_timeout_ms
        .saturating_add(config.upstream.response_timeout_ms);
    if config.timeouts.request_secs.saturating_mul(1_000) <= upstream_budget_ms {
        errors.push(ValidationError::new(
            "timeouts.request_secs",
            format!(
                "must exceed upstream connect + response timeouts ({upstream_budget_ms} ms)"
            ),
        ));
    }

    if config.auth.realm.is_empty() {
        errors.push(ValidationError::new("auth.realm", "must not be empty"));
    } else if config.auth.realm.contains('"') || config.auth.realm.chars().any(char::is_control) {
        errors.push(ValidationError::new(
            "auth.realm",
            "must not contain quotes or control characters",
        ));
    }

    match config.auth.credentials_file.as_deref() {
        None | Some("") => errors.push(ValidationError::new(
            "auth.credentials_file",
            "must be set (no built-in credentials exist)",
        )),
        Some(_) => {}
    }

    for path in &config.auth.exempt_paths {
        if !path.starts_with('/') {
            errors.push(ValidationError::new(
                "auth.exempt_paths",
                format!("'{path}' must start with '/'"),
            ));
        }
    }

    check_observability(&mut errors, &config.observability);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate the backend service configuration.
pub fn validate_backend_config(config: &BackendServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_addr(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be > 0"));
    }
    check_observability(&mut errors, &config.observability);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_proxy() -> ProxyConfig {
        let mut config = ProxyConfig::default();
        config.auth.credentials_file = Some("/etc/authgate/users".into());
        config
    }

    #[test]
    fn defaults_need_a_credentials_file() {
        let errors = validate_proxy_config(&ProxyConfig::default()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "auth.credentials_file");

        assert!(validate_proxy_config(&valid_proxy()).is_ok());
    }

    #[test]
    fn collects_every_error() {
        let mut config = valid_proxy();
        config.listener.bind_address = "nowhere".into();
        config.upstream.response_timeout_ms = 0;
        config.auth.realm = "bad\"realm".into();
        config.auth.exempt_paths = vec!["health".into()];

        let fields: Vec<_> = validate_proxy_config(&config)
            .unwrap_err()
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "upstream.response_timeout_ms",
                "auth.realm",
                "auth.exempt_paths",
            ]
        );
    }

    #[test]
    fn request_timeout_must_outlast_upstream_timeouts() {
        let mut config = valid_proxy();
        config.timeouts.request_secs = 1;
        config.upstream.response_timeout_ms = 10_000;
        let errors = validate_proxy_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "timeouts.request_secs");

        // Exactly equal still leaves no room for the gateway answer.
        config.timeouts.request_secs = 12;
        config.upstream.connect_timeout_ms = 2_000;
        assert!(validate_proxy_config(&config).is_err());

        config.timeouts.request_secs = 13;
        assert!(validate_proxy_config(&config).is_ok());
    }

    #[test]
    fn metrics_address_checked_only_when_enabled() {
        let mut config = valid_proxy();
        config.observability.metrics_address = "bogus".into();
        assert!(validate_proxy_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_proxy_config(&config).is_err());
    }

    #[test]
    fn backend_defaults_are_valid() {
        assert!(validate_backend_config(&BackendServiceConfig::default()).is_ok());
    }
}
