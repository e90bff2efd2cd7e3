use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::warn;
use uuid::Uuid;

use super::jwt::{JwtKeys, TokenError};
use crate::error::ApiError;

/// Identity of the caller, resolved from a verified bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let token = bearer_token(&parts.headers)?;

        let claims = keys.verify(token).map_err(|e| {
            warn!(reason = %e, "rejected bearer token");
            e
        })?;

        Ok(AuthUser {
            id: claims.sub,
            email: claims.email,
        })
    }
}

/// Expect "Bearer <token>". An absent header or empty token counts as missing.
fn bearer_token(headers: &HeaderMap) -> Result<&str, TokenError> {
    let Some(raw) = headers.get(AUTHORIZATION) else {
        return Err(TokenError::Missing);
    };
    let raw = raw.to_str().map_err(|_| TokenError::Malformed)?.trim();
    if raw.is_empty() {
        return Err(TokenError::Missing);
    }

    let token = raw
        .strip_prefix("Bearer")
        .or_else(|| raw.strip_prefix("bearer"))
        .ok_or(TokenError::Malformed)?;
    if token.is_empty() {
        return Err(TokenError::Missing);
    }
    // "Bearerxyz" is not a bearer header
    let token = token.strip_prefix(' ').ok_or(TokenError::Malformed)?.trim();
    if token.is_empty() {
        Err(TokenError::Missing)
    } else {
        Ok(token)
    }
}
