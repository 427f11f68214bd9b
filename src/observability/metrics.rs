//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by method, status, outcome
//! - `proxy_request_duration_seconds` (histogram): latency distribution
//! - `proxy_auth_failures_total` (counter): rejected credentials by reason
//! - `backend_requests_total` (counter): backend requests by endpoint
//!
//! Recording is a no-op until a recorder is installed, so unit tests and
//! deployments with metrics disabled pay almost nothing.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
///
/// Fails if the address cannot be bound or a recorder is already installed.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one proxied request.
pub fn record_request(method: &str, status: u16, outcome: &'static str, start: Instant) {
    counter!(
        "proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!("proxy_request_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

/// Record a rejected credential check.
pub fn record_auth_failure(reason: &'static str) {
    counter!("proxy_auth_failures_total", "reason" => reason).increment(1);
}

/// Record a request answered by the backend service.
pub fn record_backend_request(endpoint: &'static str) {
    counter!("backend_requests_total", "endpoint" => endpoint).increment(1);
}
