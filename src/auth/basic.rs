//! `Authorization: Basic` header parsing and the matching challenge.

use std::fmt;

use axum::http::HeaderValue;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Why an `Authorization` header could not be turned into credentials.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BasicAuthError {
    #[error("header is not valid ASCII")]
    NotAscii,

    #[error("scheme is not Basic")]
    WrongScheme,

    #[error("payload is not valid base64")]
    InvalidBase64,

    #[error("decoded payload is not valid UTF-8")]
    InvalidUtf8,

    #[error("decoded payload has no ':' separator")]
    MissingSeparator,
}

/// A username/secret pair taken from a Basic header.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl BasicCredentials {
    /// Parse an `Authorization` header value.
    ///
    /// The scheme is matched case-insensitively. The username ends at the
    /// first ':'; the secret may itself contain ':'.
    pub fn from_header(value: &HeaderValue) -> Result<Self, BasicAuthError> {
        let value = value.to_str().map_err(|_| BasicAuthError::NotAscii)?;
        let (scheme, payload) = value
            .trim()
            .split_once(' ')
            .ok_or(BasicAuthError::WrongScheme)?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return Err(BasicAuthError::WrongScheme);
        }

        let decoded = STANDARD
            .decode(payload.trim())
            .map_err(|_| BasicAuthError::InvalidBase64)?;
        let decoded = String::from_utf8(decoded).map_err(|_| BasicAuthError::InvalidUtf8)?;
        let (username, password) = decoded
            .split_once(':')
            .ok_or(BasicAuthError::MissingSeparator)?;

        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

/// Build the `WWW-Authenticate` value for `realm`.
pub fn challenge(realm: &str) -> Result<HeaderValue, axum::http::header::InvalidHeaderValue> {
    HeaderValue::from_str(&format!("Basic realm=\"{realm}\""))
}
