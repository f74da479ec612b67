//! Request privilege
//!
//! A request is privileged when it carries `Authorization: Bearer <token>`
//! matching the configured admin token. Anything else is an ordinary user;
//! privilege is never an error by itself.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use std::convert::Infallible;
use tracing::debug;

use crate::AppState;

/// Whether the current request comes from an administrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Privileged(pub bool);

#[async_trait]
impl FromRequestParts<AppState> for Privileged {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        let privileged = state.admin_token.is_privileged(header);
        if header.is_some() && !privileged {
            debug!("Authorization header present but not an admin token");
        }
        Ok(Privileged(privileged))
    }
}
