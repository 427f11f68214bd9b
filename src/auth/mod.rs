//! HTTP Basic Authentication for the edge proxy.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     credential file → credentials.rs (parse, validate) → Arc<CredentialStore>
//!
//! Per request:
//!     exemption.rs (is the path allow-listed?)
//!         yes → forward
//!         no  → basic.rs (parse Authorization header)
//!             → credentials.rs (constant-time verify)
//!             → forward, or 401 + WWW-Authenticate
//! ```
//!
//! # Design Decisions
//! - The store is immutable and injected as middleware state, never global
//! - No sessions: every request is checked on its own
//! - No built-in credentials; the file is always provisioned externally

pub mod basic;
pub mod credentials;
pub mod exemption;
pub mod middleware;

pub use basic::{BasicAuthError, BasicCredentials};
pub use credentials::{format_entry, CredentialError, CredentialStore, PasswordHash, Verification};
pub use exemption::{Access, ExemptPaths};
pub use middleware::{authenticate, basic_auth_middleware, AuthFailure, AuthState, AuthenticatedUser};
