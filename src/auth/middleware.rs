//! Basic Authentication middleware for the edge proxy.
//!
//! Runs before the forwarding handler. Exempt paths pass straight through;
//! every other request must carry a credential the store accepts, otherwise
//! it is answered with 401 and a `WWW-Authenticate` challenge without ever
//! reaching the upstream.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::auth::basic::{challenge, BasicCredentials};
use crate::auth::credentials::{CredentialStore, Verification};
use crate::auth::exemption::{Access, ExemptPaths};
use crate::http::response::error_response;
use crate::observability::metrics;

/// State injected into the middleware.
#[derive(Clone)]
pub struct AuthState {
    credentials: Arc<CredentialStore>,
    exempt: Arc<ExemptPaths>,
    challenge: HeaderValue,
}

impl AuthState {
    pub fn new(
        credentials: Arc<CredentialStore>,
        exempt: ExemptPaths,
        realm: &str,
    ) -> Result<Self, header::InvalidHeaderValue> {
        Ok(Self {
            credentials,
            exempt: Arc::new(exempt),
            challenge: challenge(realm)?,
        })
    }

    /// 401 response carrying the challenge header.
    fn reject(&self) -> Response {
        let mut response = error_response(StatusCode::UNAUTHORIZED, "Authentication required");
        response
            .headers_mut()
            .insert(header::WWW_AUTHENTICATE, self.challenge.clone());
        response
    }
}

/// Username of a caller that passed the credential check.
///
/// Inserted into request extensions for downstream handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub String);

/// Reason a protected request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    MissingHeader,
    MalformedHeader,
    UnknownUser,
    BadSecret,
}

impl AuthFailure {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthFailure::MissingHeader => "missing_header",
            AuthFailure::MalformedHeader => "malformed_header",
            AuthFailure::UnknownUser => "unknown_user",
            AuthFailure::BadSecret => "bad_secret",
        }
    }
}

/// Check the `Authorization` header against the store.
pub fn authenticate(
    credentials: &CredentialStore,
    headers: &HeaderMap,
) -> Result<AuthenticatedUser, AuthFailure> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthFailure::MissingHeader)?;
    let creds = BasicCredentials::from_header(value).map_err(|e| {
        tracing::debug!(error = %e, "Unparseable Authorization header");
        AuthFailure::MalformedHeader
    })?;

    match credentials.verify(&creds.username, &creds.password) {
        Verification::Valid => Ok(AuthenticatedUser(creds.username)),
        Verification::UnknownUser => Err(AuthFailure::UnknownUser),
        Verification::BadSecret => Err(AuthFailure::BadSecret),
    }
}

pub async fn basic_auth_middleware(
    State(state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if state.exempt.access(request.uri().path()) == Access::Exempt {
        return next.run(request).await;
    }

    match authenticate(&state.credentials, request.headers()) {
        Ok(user) => {
            tracing::debug!(user = %user.0, path = %request.uri().path(), "Authenticated");
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(failure) => {
            let peer = request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|info| info.0);
            tracing::warn!(
                reason = failure.as_str(),
                method = %request.method(),
                path = %request.uri().path(),
                peer = ?peer,
                "Authentication failed"
            );
            metrics::record_auth_failure(failure.as_str());
            state.reject()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::credentials::{format_entry, PasswordHash};
    use axum::{middleware, routing::get, Extension, Router};
    use base64::{engine::general_purpose::STANDARD, Engine};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    fn store() -> Arc<CredentialStore> {
        let line = format_entry("admin", &PasswordHash::generate("password123")).unwrap();
        Arc::new(CredentialStore::parse(&line).unwrap())
    }

    fn app(hits: Arc<AtomicUsize>) -> Router {
        let state = AuthState::new(store(), ExemptPaths::new(["/health"]), "Restricted").unwrap();
        let home_hits = hits.clone();
        Router::new()
            .route(
                "/",
                get(move |Extension(user): Extension<AuthenticatedUser>| {
                    let hits = home_hits.clone();
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        user.0
                    }
                }),
            )
            .route(
                "/health",
                get(move || {
                    let hits = hits.clone();
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        "ok"
                    }
                }),
            )
            .layer(middleware::from_fn_with_state(state, basic_auth_middleware))
    }

    fn request(path: &str, auth: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(path);
        if let Some(pair) = auth {
            builder = builder.header(header::AUTHORIZATION, format!("Basic {}", STANDARD.encode(pair)));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn missing_credentials_are_challenged() {
        let hits = Arc::new(AtomicUsize::new(0));
        let response = app(hits.clone()).oneshot(request("/", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers()[header::WWW_AUTHENTICATE],
            "Basic realm=\"Restricted\""
        );
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn wrong_secret_and_unknown_user_are_challenged() {
        let hits = Arc::new(AtomicUsize::new(0));
        for pair in ["admin:wrong", "root:password123", "admin"] {
            let response = app(hits.clone()).oneshot(request("/", Some(pair))).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{pair}");
            assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
        }
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn valid_credentials_pass_user_downstream() {
        let hits = Arc::new(AtomicUsize::new(0));
        let response = app(hits.clone())
            .oneshot(request("/", Some("admin:password123")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "admin");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exempt_path_ignores_credentials() {
        let hits = Arc::new(AtomicUsize::new(0));
        for auth in [None, Some("admin:wrong"), Some("admin:password123")] {
            let response = app(hits.clone()).oneshot(request("/health", auth)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn authenticate_reports_reason() {
        let store = store();
        let mut headers = HeaderMap::new();
        assert_eq!(authenticate(&store, &headers), Err(AuthFailure::MissingHeader));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer token"));
        assert_eq!(authenticate(&store, &headers), Err(AuthFailure::MalformedHeader));

        let value = format!("Basic {}", STANDARD.encode("admin:nope"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(&value).unwrap());
        assert_eq!(authenticate(&store, &headers), Err(AuthFailure::BadSecret));
    }
}
