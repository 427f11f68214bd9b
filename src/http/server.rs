//! Edge proxy HTTP server.
//!
//! # Responsibilities
//! - Create the Axum router with the forwarding handler
//! - Wire up middleware (request ID, tracing, timeout, Basic auth)
//! - Bind server to listener and shut down gracefully
//! - Forward authorized requests to the upstream backend

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{uri::InvalidUri, Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::auth::{
    basic_auth_middleware, AuthState, AuthenticatedUser, CredentialStore, ExemptPaths,
};
use crate::config::ProxyConfig;
use crate::http::upstream::Upstream;
use crate::observability::metrics;

/// Errors raised while assembling the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid upstream address: {0}")]
    Upstream(#[from] InvalidUri),

    #[error("realm cannot be used in a WWW-Authenticate header: {0}")]
    Realm(#[from] axum::http::header::InvalidHeaderValue),
}

/// Application state injected into the forwarding handler.
#[derive(Clone)]
pub struct AppState {
    pub upstream: Upstream,
}

/// HTTP server for the edge proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new server from validated configuration and a loaded store.
    pub fn new(config: ProxyConfig, credentials: Arc<CredentialStore>) -> Result<Self, ServerError> {
        let upstream = Upstream::new(&config.upstream)?;
        let auth = AuthState::new(
            credentials,
            ExemptPaths::new(config.auth.exempt_paths.iter().cloned()),
            &config.auth.realm,
        )?;

        let router = Self::build_router(&config, AppState { upstream }, auth);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The overall request timeout answers 504 like the upstream timeout does.
    fn build_router(config: &ProxyConfig, state: AppState, auth: AuthState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(middleware::from_fn_with_state(auth, basic_auth_middleware))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::GATEWAY_TIMEOUT,
                Duration::from_secs(config.timeouts.request_secs),
            ))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.address,
            exempt_paths = ?self.config.auth.exempt_paths,
            "Edge proxy starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Edge proxy received shutdown signal");
            })
            .await?;

        tracing::info!("Edge proxy stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Forward an already-authorized request and relay the upstream's answer.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .map(|user| user.0.clone());

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        user = user.as_deref().unwrap_or("-"),
        upstream = %state.upstream.authority(),
        "Forwarding request"
    );

    match state.upstream.forward(request).await {
        Ok(response) => {
            metrics::record_request(&method, response.status().as_u16(), "forwarded", start_time);
            response
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                method = %method,
                path = %path,
                error = %e,
                "Upstream error"
            );
            metrics::record_request(&method, e.status_code().as_u16(), e.outcome(), start_time);
            e.into_response()
        }
    }
}
