use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Response, Json};
use serde::{Deserialize, Serialize};

use crate::backend::identity::ServiceIdentity;
use crate::http::response::error_response;
use crate::observability::metrics;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HomeResponse {
    pub message: String,
    pub hostname: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct InfoResponse {
    pub app_name: String,
    pub environment: String,
    pub hostname: String,
}

pub async fn home(State(identity): State<Arc<ServiceIdentity>>) -> Json<HomeResponse> {
    metrics::record_backend_request("home");
    Json(HomeResponse {
        message: identity.message.clone(),
        hostname: identity.hostname.clone(),
        version: identity.version.clone(),
    })
}

/// Liveness only; no dependency checks.
pub async fn health() -> Json<HealthResponse> {
    metrics::record_backend_request("health");
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

pub async fn info(State(identity): State<Arc<ServiceIdentity>>) -> Json<InfoResponse> {
    metrics::record_backend_request("info");
    Json(InfoResponse {
        app_name: identity.app_name.clone(),
        environment: identity.environment.clone(),
        hostname: identity.hostname.clone(),
    })
}

pub async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not Found")
}

pub async fn method_not_allowed() -> Response {
    error_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
}
