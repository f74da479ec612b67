//! Admin privilege check via bearer token
//!
//! The site has a single administrator role. A request is privileged when it
//! carries `Authorization: Bearer <token>` and the token matches the configured
//! admin token. Tokens are compared as SHA-256 digests so the comparison time
//! does not depend on how many leading bytes match.
//!
//! # Pure Functions
//!
//! This module contains no HTTP framework dependencies; each service wraps it
//! in its own extractor.

use sha2::{Digest, Sha256};

/// Configured admin token, stored as a digest
#[derive(Clone)]
pub struct AdminToken {
    digest: Option<[u8; 32]>,
}

impl std::fmt::Debug for AdminToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminToken")
            .field("configured", &self.is_configured())
            .finish()
    }
}

impl AdminToken {
    /// Build from the configured token; `None` or empty disables admin access
    ///
    /// # Examples
    ///
    /// ```
    /// use lsync_common::api::auth::AdminToken;
    ///
    /// let token = AdminToken::new(Some("s3cret"));
    /// assert!(token.verify("s3cret"));
    /// assert!(!token.verify("S3CRET"));
    ///
    /// let disabled = AdminToken::new(None);
    /// assert!(!disabled.verify(""));
    /// ```
    pub fn new(token: Option<&str>) -> Self {
        let digest = token.filter(|t| !t.is_empty()).map(sha256);
        Self { digest }
    }

    pub fn is_configured(&self) -> bool {
        self.digest.is_some()
    }

    /// Check a presented token
    pub fn verify(&self, presented: &str) -> bool {
        match &self.digest {
            Some(expected) => {
                let provided = sha256(presented);
                expected
                    .iter()
                    .zip(provided.iter())
                    .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                    == 0
            }
            None => false,
        }
    }

    /// Privilege oracle for an optional `Authorization` header value
    pub fn is_privileged(&self, authorization: Option<&str>) -> bool {
        authorization
            .and_then(parse_bearer)
            .map(|token| self.verify(token))
            .unwrap_or(false)
    }
}

/// Extract the token from a `Bearer <token>` header value
///
/// # Examples
///
/// ```
/// use lsync_common::api::auth::parse_bearer;
///
/// assert_eq!(parse_bearer("Bearer abc"), Some("abc"));
/// assert_eq!(parse_bearer("bearer abc"), Some("abc"));
/// assert_eq!(parse_bearer("Basic abc"), None);
/// ```
pub fn parse_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

fn sha256(value: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hasher.finalize().into()
}
