//! Startup orchestration.
//!
//! # Responsibilities
//! - Load the credential store before anything listens
//! - Start the optional metrics exporter
//! - Bind listeners and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners start last (traffic only when ready)

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use metrics_exporter_prometheus::BuildError;
use tokio::net::TcpListener;

use crate::auth::{CredentialError, CredentialStore};
use crate::backend::{BackendServer, ServiceIdentity};
use crate::config::{BackendServiceConfig, ObservabilityConfig, ProxyConfig};
use crate::http::{HttpServer, ServerError};
use crate::lifecycle::shutdown::Shutdown;
use crate::observability::metrics;

/// Fatal errors before or while serving.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("no credential file configured")]
    NoCredentials,

    #[error(transparent)]
    Credentials(#[from] CredentialError),

    #[error(transparent)]
    Server(#[from] ServerError),

    #[error("invalid metrics address '{address}': {source}")]
    MetricsAddress {
        address: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] BuildError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

async fn bind(address: &str) -> Result<TcpListener, StartupError> {
    TcpListener::bind(address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.to_string(),
            source,
        })
}

fn start_metrics(config: &ObservabilityConfig) -> Result<(), StartupError> {
    if !config.metrics_enabled {
        return Ok(());
    }
    let addr: SocketAddr =
        config
            .metrics_address
            .parse()
            .map_err(|source| StartupError::MetricsAddress {
                address: config.metrics_address.clone(),
                source,
            })?;
    metrics::init_metrics(addr)?;
    Ok(())
}

/// Load credentials, bind, and serve the edge proxy until shutdown.
pub async fn run_proxy(config: ProxyConfig, shutdown: Shutdown) -> Result<(), StartupError> {
    let path = config
        .auth
        .credentials_file
        .clone()
        .filter(|p| !p.is_empty())
        .ok_or(StartupError::NoCredentials)?;
    let credentials = Arc::new(CredentialStore::load(Path::new(&path))?);

    start_metrics(&config.observability)?;

    let server = HttpServer::new(config, credentials)?;
    let listener = bind(&server.config().listener.bind_address).await?;

    server
        .run(listener, shutdown.subscribe())
        .await
        .map_err(StartupError::Serve)
}

/// Bind and serve the backend service until shutdown.
pub async fn run_backend(
    config: BackendServiceConfig,
    shutdown: Shutdown,
) -> Result<(), StartupError> {
    start_metrics(&config.observability)?;

    let identity = ServiceIdentity::detect(&config.identity);
    let listener = bind(&config.listener.bind_address).await?;
    let server = BackendServer::new(&config, identity);

    server
        .run(listener, shutdown.subscribe())
        .await
        .map_err(StartupError::Serve)
}
