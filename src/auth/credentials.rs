//! Credential store backed by a static file of salted SHA-256 hashes.
//!
//! # File format
//! ```text
//! # comment
//! admin:$sha256$<salt-hex>$<digest-hex>
//! ```
//! `digest = SHA-256(salt || secret)`. The store is built once at startup and
//! never mutated; it is shared behind an `Arc`.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Identifier of the only supported hash scheme.
pub const HASH_SCHEME: &str = "sha256";

const SALT_LEN: usize = 16;
const DIGEST_LEN: usize = 32;

/// Errors produced while parsing a single password hash.
#[derive(Debug, thiserror::Error)]
pub enum HashParseError {
    #[error("expected '$sha256$<salt>$<digest>'")]
    Malformed,

    #[error("unsupported hash scheme '{0}'")]
    UnknownScheme(String),

    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("salt must not be empty")]
    EmptySalt,

    #[error("digest must be 32 bytes, got {0}")]
    DigestLength(usize),
}

/// Errors produced while loading the credential store.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("failed to read credential file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: missing ':' between username and hash")]
    MissingSeparator { line: usize },

    #[error("line {line}: empty username")]
    EmptyUsername { line: usize },

    #[error("line {line}: duplicate username '{username}'")]
    DuplicateUser { line: usize, username: String },

    #[error("line {line}: {source}")]
    InvalidHash {
        line: usize,
        #[source]
        source: HashParseError,
    },

    #[error("invalid username '{0}': must be non-empty and contain no ':'")]
    InvalidUsername(String),

    #[error("credential file contains no entries")]
    Empty,
}

/// A salted SHA-256 password hash.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash {
    salt: Vec<u8>,
    digest: [u8; DIGEST_LEN],
}

impl PasswordHash {
    /// Hash `secret` with a fresh random salt.
    pub fn generate(secret: &str) -> Self {
        let mut salt = vec![0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        Self::with_salt(salt, secret)
    }

    /// Hash `secret` with the given salt.
    pub fn with_salt(salt: Vec<u8>, secret: &str) -> Self {
        let digest = compute_digest(&salt, secret);
        Self { salt, digest }
    }

    /// Check `secret` against this hash in constant time.
    pub fn verify(&self, secret: &str) -> bool {
        let candidate = compute_digest(&self.salt, secret);
        candidate[..].ct_eq(&self.digest[..]).into()
    }
}

fn compute_digest(salt: &[u8], secret: &str) -> [u8; DIGEST_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(secret.as_bytes());
    hasher.finalize().into()
}

impl fmt::Display for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "${}${}${}",
            HASH_SCHEME,
            hex::encode(&self.salt),
            hex::encode(self.digest)
        )
    }
}

// Never print digests in logs.
impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHash")
            .field("scheme", &HASH_SCHEME)
            .finish_non_exhaustive()
    }
}

impl FromStr for PasswordHash {
    type Err = HashParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s.strip_prefix('$').ok_or(HashParseError::Malformed)?;
        let mut fields = rest.split('$');
        let (scheme, salt, digest) = match (fields.next(), fields.next(), fields.next(), fields.next()) {
            (Some(scheme), Some(salt), Some(digest), None) => (scheme, salt, digest),
            _ => return Err(HashParseError::Malformed),
        };

        if scheme != HASH_SCHEME {
            return Err(HashParseError::UnknownScheme(scheme.to_string()));
        }

        let salt = hex::decode(salt)?;
        if salt.is_empty() {
            return Err(HashParseError::EmptySalt);
        }
        let digest = hex::decode(digest)?;
        let digest: [u8; DIGEST_LEN] = digest
            .as_slice()
            .try_into()
            .map_err(|_| HashParseError::DigestLength(digest.len()))?;

        Ok(Self { salt, digest })
    }
}

/// Result of checking a username/secret pair against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Valid,
    UnknownUser,
    BadSecret,
}

impl Verification {
    pub fn is_valid(self) -> bool {
        self == Verification::Valid
    }
}

/// Immutable mapping from username to password hash.
pub struct CredentialStore {
    users: HashMap<String, PasswordHash>,
    // Verified against for unknown users so both paths do the same work.
    decoy: PasswordHash,
}

impl CredentialStore {
    /// Read and parse a credential file.
    pub fn load(path: &Path) -> Result<Self, CredentialError> {
        let content = fs::read_to_string(path).map_err(|source| CredentialError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::parse(&content)?;

        tracing::info!(
            path = %path.display(),
            users = store.len(),
            "Credential store loaded"
        );
        Ok(store)
    }

    /// Parse credential file contents.
    pub fn parse(content: &str) -> Result<Self, CredentialError> {
        let mut users = HashMap::new();

        for (index, raw) in content.lines().enumerate() {
            let line = index + 1;
            let entry = raw.trim();
            if entry.is_empty() || entry.starts_with('#') {
                continue;
            }

            let (username, hash) = entry
                .split_once(':')
                .ok_or(CredentialError::MissingSeparator { line })?;
            if username.is_empty() {
                return Err(CredentialError::EmptyUsername { line });
            }
            let hash: PasswordHash = hash
                .parse()
                .map_err(|source| CredentialError::InvalidHash { line, source })?;

            if users.insert(username.to_string(), hash).is_some() {
                return Err(CredentialError::DuplicateUser {
                    line,
                    username: username.to_string(),
                });
            }
        }

        if users.is_empty() {
            return Err(CredentialError::Empty);
        }

        Ok(Self {
            users,
            decoy: PasswordHash::with_salt(vec![0u8; SALT_LEN], ""),
        })
    }

    /// Check a username/secret pair.
    pub fn verify(&self, username: &str, secret: &str) -> Verification {
        match self.users.get(username) {
            Some(hash) if hash.verify(secret) => Verification::Valid,
            Some(_) => Verification::BadSecret,
            None => {
                let _ = self.decoy.verify(secret);
                Verification::UnknownUser
            }
        }
    }

    fn len(&self) -> usize {
        self.users.len()
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("users", &self.users.len())
            .finish()
    }
}

/// Render one credential file line for `username`.
pub fn format_entry(username: &str, hash: &PasswordHash) -> Result<String, CredentialError> {
    if username.is_empty() || username.contains(':') || username.chars().any(char::is_whitespace) {
        return Err(CredentialError::InvalidUsername(username.to_string()));
    }
    Ok(format!("{username}:{hash}"))
}
