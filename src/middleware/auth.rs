use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::auth::{require_role, AuthError, Role, SessionClaims};
use crate::error::ApiError;
use crate::state::AppState;

/// Verifies the bearer token and stores the claims in request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok());

    let claims = match state.tokens.verify(header) {
        Ok(claims) => claims,
        Err(reason) => {
            match reason {
                AuthError::MissingToken => tracing::debug!("Rejected {}: missing token", request.uri().path()),
                AuthError::Expired => tracing::info!("Rejected {}: token expired", request.uri().path()),
                AuthError::Invalid => tracing::warn!("Rejected {}: token invalid", request.uri().path()),
            }
            return Err(reason.into());
        }
    };

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Admin gate. Must run after [`require_auth`].
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let claims = request
        .extensions()
        .get::<SessionClaims>()
        .ok_or(ApiError::from(AuthError::MissingToken))?;
    require_role(claims, Role::Admin)?;

    Ok(next.run(request).await)
}

/// Handlers behind [`require_auth`] take the verified claims as an argument.
#[async_trait]
impl<S> FromRequestParts<S> for SessionClaims
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionClaims>()
            .cloned()
            .ok_or_else(|| AuthError::MissingToken.into())
    }
}
