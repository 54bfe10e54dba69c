use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use super::jwt::{Claims, JwtKeys};
use crate::response::ApiError;

/// Bearer-token gate for protected routes.
///
/// Missing header, wrong scheme and failed verification all reject with the
/// identical 403 body, so the response never reveals which check failed.
/// On success the verified claims travel into the handler as an argument.
#[derive(Debug)]
pub struct AuthUser(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);

        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                warn!("missing Authorization header");
                ApiError::Unauthorized
            })?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                warn!("Authorization header is not a Bearer token");
                ApiError::Unauthorized
            })?;

        let claims = keys.verify(token).map_err(|e| {
            warn!(reason = %e, "token rejected");
            ApiError::Unauthorized
        })?;

        Ok(AuthUser(claims))
    }
}
