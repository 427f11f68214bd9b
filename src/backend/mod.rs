//! Demo backend service.
//!
//! A stateless responder with three read-only JSON endpoints:
//!
//! | Method | Path        | Body                                 |
//! |--------|-------------|--------------------------------------|
//! | GET    | `/`         | `{message, hostname, version}`       |
//! | GET    | `/health`   | `{status}`                           |
//! | GET    | `/api/info` | `{app_name, environment, hostname}`  |
//!
//! Unknown paths answer 404 and other methods on these paths answer 405,
//! both with the JSON error body. The backend never looks at credentials;
//! it relies on the edge proxy in front of it.

pub mod handlers;
pub mod identity;

use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{request_id::PropagateRequestIdLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::BackendServiceConfig;

pub use identity::{detect_hostname, ServiceIdentity};

/// Build the backend router around a fixed identity.
pub fn router(identity: Arc<ServiceIdentity>, request_timeout: Duration) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::home).fallback(handlers::method_not_allowed),
        )
        .route(
            "/health",
            get(handlers::health).fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/info",
            get(handlers::info).fallback(handlers::method_not_allowed),
        )
        .fallback(handlers::not_found)
        .with_state(identity)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
}

/// HTTP server for the backend service.
pub struct BackendServer {
    router: Router,
    identity: Arc<ServiceIdentity>,
}

impl BackendServer {
    pub fn new(config: &BackendServiceConfig, identity: ServiceIdentity) -> Self {
        let identity = Arc::new(identity);
        let router = router(
            identity.clone(),
            Duration::from_secs(config.timeouts.request_secs),
        );
        Self { router, identity }
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        tracing::info!(
            address = %listener.local_addr()?,
            hostname = %self.identity.hostname,
            environment = %self.identity.environment,
            version = %self.identity.version,
            "Backend service starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Backend service received shutdown signal");
            })
            .await?;

        tracing::info!("Backend service stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::handlers::{HealthResponse, HomeResponse, InfoResponse};
    use super::*;
    use crate::config::IdentityConfig;
    use crate::http::ErrorBody;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use serde::de::DeserializeOwned;
    use tower::ServiceExt;

    fn app() -> Router {
        let identity = ServiceIdentity::new(&IdentityConfig::default(), "test-host".into());
        router(Arc::new(identity), Duration::from_secs(5))
    }

    async fn call(method: Method, path: &str, auth: Option<&str>) -> Response {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        app().oneshot(builder.body(Body::empty()).unwrap()).await.unwrap()
    }

    async fn json<T: DeserializeOwned>(response: Response) -> T {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn home_reports_identity() {
        let response = call(Method::GET, "/", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json::<HomeResponse>(response).await,
            HomeResponse {
                message: "Hello from Flask Demo!".into(),
                hostname: "test-host".into(),
                version: "1.0.0".into(),
            }
        );
    }

    #[tokio::test]
    async fn health_is_healthy() {
        let response = call(Method::GET, "/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json::<HealthResponse>(response).await,
            HealthResponse { status: "healthy".into() }
        );
    }

    #[tokio::test]
    async fn info_reports_environment() {
        let response = call(Method::GET, "/api/info", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json::<InfoResponse>(response).await,
            InfoResponse {
                app_name: "Flask Demo Container".into(),
                environment: "production".into(),
                hostname: "test-host".into(),
            }
        );
    }

    #[tokio::test]
    async fn unknown_path_is_404_regardless_of_credentials() {
        for auth in [None, Some("Basic YWRtaW46cGFzc3dvcmQxMjM="), Some("garbage")] {
            let response = call(Method::GET, "/nope", auth).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
            let body: ErrorBody = json(response).await;
            assert_eq!(body.status, 404);
        }
        let response = call(Method::GET, "/api/info/extra", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn wrong_method_is_405() {
        for (method, path) in [
            (Method::POST, "/health"),
            (Method::PUT, "/"),
            (Method::DELETE, "/api/info"),
        ] {
            let response = call(method, path, None).await;
            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
            let body: ErrorBody = json(response).await;
            assert_eq!(body.status, 405);
        }
    }

    #[tokio::test]
    async fn repeated_requests_are_byte_identical() {
        let first = axum::body::to_bytes(call(Method::GET, "/api/info", None).await.into_body(), usize::MAX)
            .await
            .unwrap();
        let second = axum::body::to_bytes(call(Method::GET, "/api/info", None).await.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(first, second);
    }
}
