use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use sharebox_core::Identity;

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

/// Caller resolved from the `Authorization: Bearer` header
#[derive(Clone, Debug)]
pub struct AuthUser(pub Identity);

/// Extract the bearer token from request headers
pub fn bearer_token(headers: &HeaderMap) -> ServerResult<&str> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ServerError::Unauthorized("Not authenticated".into()))?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or_else(|| ServerError::Unauthorized("Not authenticated".into()))?;
    if !scheme.eq_ignore_ascii_case("bearer") || token.trim().is_empty() {
        return Err(ServerError::Unauthorized("Not authenticated".into()));
    }

    Ok(token.trim())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> ServerResult<Self> {
        let token = bearer_token(&parts.headers)?;
        let identity = state.accounts.authenticate(token).await?;
        Ok(AuthUser(identity))
    }
}
