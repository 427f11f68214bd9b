//! Forwarding to the backend service.
//!
//! # Responsibilities
//! - Rewrite the request URI to the fixed upstream authority
//! - Stream the request body through unchanged
//! - Bound the upstream call with connect and response timeouts
//! - Abort relayed bodies that stall for longer than the response timeout
//! - Map upstream failures to gateway errors (502 / 504)

use std::time::Duration;

use axum::{
    body::Body,
    http::{
        uri::{Authority, InvalidUri, InvalidUriParts, PathAndQuery, Scheme},
        Request, StatusCode, Uri, Version,
    },
    response::{IntoResponse, Response},
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tower_http::timeout::TimeoutBody;

use crate::config::UpstreamConfig;
use crate::http::response::error_response;

/// Failure while talking to the upstream.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("upstream unreachable: {0}")]
    Unreachable(#[source] hyper_util::client::legacy::Error),

    #[error("upstream request failed: {0}")]
    Failed(#[source] hyper_util::client::legacy::Error),

    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),

    #[error("could not build upstream uri: {0}")]
    Uri(#[from] InvalidUriParts),
}

impl ProxyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::Unreachable(_) | ProxyError::Failed(_) => StatusCode::BAD_GATEWAY,
            ProxyError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::Uri(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Short label for logs and metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            ProxyError::Unreachable(_) => "upstream_unreachable",
            ProxyError::Failed(_) => "upstream_failed",
            ProxyError::Timeout(_) => "upstream_timeout",
            ProxyError::Uri(_) => "bad_uri",
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            ProxyError::Unreachable(_) => "Upstream unavailable",
            ProxyError::Failed(_) => "Upstream request failed",
            ProxyError::Timeout(_) => "Upstream timed out",
            ProxyError::Uri(_) => "Invalid request target",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        error_response(self.status_code(), self.public_message())
    }
}

/// The single backend every authorized request goes to.
#[derive(Clone)]
pub struct Upstream {
    client: Client<HttpConnector, Body>,
    authority: Authority,
    response_timeout: Duration,
}

impl Upstream {
    pub fn new(config: &UpstreamConfig) -> Result<Self, InvalidUri> {
        let authority: Authority = config.address.parse()?;

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_millis(config.connect_timeout_ms)));
        connector.set_nodelay(true);

        let client = Client::builder(TokioExecutor::new()).build(connector);

        Ok(Self {
            client,
            authority,
            response_timeout: Duration::from_millis(config.response_timeout_ms),
        })
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Send `request` upstream and relay whatever comes back.
    ///
    /// Method, path, query, headers and body are forwarded as received.
    /// The response body errors out, closing the client connection, if the
    /// upstream goes quiet for longer than the response timeout mid-body.
    pub async fn forward(&self, request: Request<Body>) -> Result<Response, ProxyError> {
        let (mut parts, body) = request.into_parts();

        let mut uri_parts = parts.uri.into_parts();
        uri_parts.scheme = Some(Scheme::HTTP);
        uri_parts.authority = Some(self.authority.clone());
        if uri_parts.path_and_query.is_none() {
            uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
        }
        parts.uri = Uri::from_parts(uri_parts)?;
        // The upstream leg is always plain HTTP/1.1.
        parts.version = Version::HTTP_11;

        let request = Request::from_parts(parts, body);

        match tokio::time::timeout(self.response_timeout, self.client.request(request)).await {
            Ok(Ok(response)) => {
                let (parts, body) = response.into_parts();
                let body = TimeoutBody::new(self.response_timeout, body);
                Ok(Response::from_parts(parts, Body::new(body)))
            }
            Ok(Err(e)) if e.is_connect() => Err(ProxyError::Unreachable(e)),
            Ok(Err(e)) => Err(ProxyError::Failed(e)),
            Err(_) => Err(ProxyError::Timeout(self.response_timeout)),
        }
    }
}
