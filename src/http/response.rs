//! Response helpers shared by the proxy and the backend.
//!
//! Every failure path answers with a small JSON body:
//! `{"error": "<diagnostic>", "status": <code>}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// JSON body carried by every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub status: u16,
}

/// Build an error response with the standard JSON body.
pub fn error_response(status: StatusCode, message: &str) -> Response {
    let body = ErrorBody {
        error: message.to_string(),
        status: status.as_u16(),
    };
    (status, Json(body)).into_response()
}
