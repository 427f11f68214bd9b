//! authgate: a demo JSON backend and the authenticating edge proxy that
//! fronts it.
//!
//! ```text
//!   caller ──▶ edge proxy :8080 ──(auth ok / exempt)──▶ backend :5000
//!              │  401 + WWW-Authenticate on bad credentials
//!              │  502 / 504 when the backend is down or slow
//! ```

pub mod auth;
pub mod backend;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use auth::CredentialStore;
pub use backend::BackendServer;
pub use config::{BackendServiceConfig, ProxyConfig};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
