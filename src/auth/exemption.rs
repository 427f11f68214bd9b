//! Paths that bypass authentication.
//!
//! The allow-list is the single place where the proxy decides whether a
//! request needs credentials. Matching is exact and case-sensitive; query
//! strings are not part of the path.

/// What the proxy requires before forwarding a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Forward without looking at credentials.
    Exempt,
    /// A valid Basic credential is required.
    Protected,
}

/// Static allow-list of unauthenticated paths.
#[derive(Debug, Clone, Default)]
pub struct ExemptPaths {
    paths: Vec<String>,
}

impl ExemptPaths {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut paths: Vec<String> = paths.into_iter().map(Into::into).collect();
        paths.sort();
        paths.dedup();
        Self { paths }
    }

    /// Classify a request path.
    pub fn access(&self, path: &str) -> Access {
        if self.paths.iter().any(|p| p == path) {
            Access::Exempt
        } else {
            Access::Protected
        }
    }
}
