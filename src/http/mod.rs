//! Edge proxy HTTP handling.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, timeout)
//!     → auth::middleware (exempt path? else Basic credential check)
//!     → upstream.rs (rewrite URI, forward, bound by timeouts)
//!     → response relayed verbatim, or response.rs error body
//!     → Send to client
//! ```

pub mod response;
pub mod server;
pub mod upstream;

pub use response::{error_response, ErrorBody};
pub use server::{AppState, HttpServer, ServerError};
pub use upstream::{ProxyError, Upstream};
