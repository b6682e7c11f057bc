//! Bearer-token gate for authenticated routes.
//!
//! A request passes only when its token verifies and names a user that still
//! exists. The resolved [`CurrentUser`] is put into the request extensions for
//! handlers, and into the response extensions for the request logger.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, models::user::UserId, store::StoreError, AppState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
}

pub async fn require_identity(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers());

    let user_id = state.tokens.extract_user_id(token).map_err(|e| {
        tracing::debug!("rejecting token: {}", e);
        AppError::Unauthenticated
    })?;

    let user = match state.users.find_by_id(user_id).await {
        Ok(user) => user,
        Err(StoreError::NotFound) => {
            tracing::debug!(user_id, "token names an unknown user");
            return Err(AppError::Unauthenticated);
        }
        Err(e) => {
            tracing::error!("unable to fetch user {}: {}", user_id, e);
            return Err(AppError::Internal("unable to fetch user".to_string()));
        }
    };

    let current = CurrentUser { id: user.id };
    req.extensions_mut().insert(current);

    let mut res = next.run(req).await;
    res.extensions_mut().insert(current);
    Ok(res)
}

/// Returns the second half of a `"<scheme> <token>"` header, or `""`.
pub fn bearer_token(headers: &HeaderMap) -> &str {
    let Some(value) = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) else {
        return "";
    };

    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(token), None) => token,
        _ => "",
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .copied()
            .ok_or_else(|| AppError::Internal("unable to fetch user details".to_string()))
    }
}
