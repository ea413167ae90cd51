use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::domain::error::DomainError;
use crate::presentation::AppState;
use crate::presentation::app_error::AppError;

/// Caller identified from a valid bearer token.
#[derive(Debug, Clone)]
pub(crate) struct CurrentUser {
    pub(crate) id: i64,
    pub(crate) preferred_locale: Option<String>,
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

impl<S> OptionalFromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<CurrentUser>().cloned())
    }
}

/// Attaches [`CurrentUser`] when the request carries a usable token.
/// Missing or invalid tokens leave the request anonymous.
pub(crate) async fn identify_user(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(request.headers()) {
        match state.jwt.verify(token) {
            Ok(claims) => match state.user_service.get_profile(claims.sub).await {
                Ok(user) => {
                    request.extensions_mut().insert(CurrentUser {
                        id: user.id,
                        preferred_locale: user.preferred_locale,
                    });
                }
                Err(DomainError::NotFound(_)) => {
                    debug!(user_id = claims.sub, "token refers to a missing user");
                }
                Err(err) => {
                    warn!(error = %err, "failed to load token owner");
                }
            },
            Err(err) => debug!(error = %err, "rejected bearer token"),
        }
    }

    next.run(request).await
}

pub(crate) async fn require_auth(request: Request, next: Next) -> Result<Response, AppError> {
    if request.extensions().get::<CurrentUser>().is_none() {
        return Err(AppError::Unauthorized);
    }
    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;

    let mut parts = value.split_whitespace();
    let scheme = parts.next()?;
    let token = parts.next()?;
    if parts.next().is_some() || !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token)
}
