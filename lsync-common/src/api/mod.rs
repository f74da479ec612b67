//! API module for shared HTTP API functionality
//!
//! Provides admin authentication and response types used by lsync services.
//! Contains no HTTP framework dependencies; each service wraps these with its
//! own extractors and `IntoResponse` impls.

pub mod auth;
pub mod types;

pub use auth::{parse_bearer, AdminToken};
pub use types::{ErrorBody, ErrorResponse};
