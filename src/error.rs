use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::{auth::TokenError, store::StoreError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Duplicate(String),
    #[error("Unauthenticated")]
    Unauthenticated,
    #[error("invalid password")]
    InvalidCredentials,
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Duplicate(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthenticated | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converts a store failure, prefixing the client-facing message with `context`.
    pub fn from_store(context: &str, err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AppError::NotFound(format!("{}: {}", context, err)),
            StoreError::Duplicate => AppError::Duplicate(format!("{}: {}", context, err)),
            StoreError::Fault(_) | StoreError::Hashing(_) => {
                tracing::error!("{}: {}", context, err);
                AppError::Internal(context.to_string())
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(inner: StoreError) -> Self {
        AppError::from_store("store error", inner)
    }
}

impl From<TokenError> for AppError {
    fn from(inner: TokenError) -> Self {
        match inner {
            TokenError::Signing(e) => {
                tracing::error!("JWT error: {}", e);
                AppError::Internal("unable to create JWT".to_string())
            }
            _ => AppError::Unauthenticated,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.to_string(),
        }));

        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cross_user_misses_surface_as_not_found() {
        let err = AppError::from_store("unable to fetch service", StoreError::NotFound);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "unable to fetch service: record not found");
    }

    #[test]
    fn duplicates_are_client_errors() {
        let err = AppError::from(StoreError::Duplicate);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn faults_hide_details() {
        let err = AppError::from_store(
            "unable to list services",
            StoreError::Fault(sqlx::Error::PoolTimedOut),
        );
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "unable to list services");
    }

    #[test]
    fn every_verification_failure_is_unauthenticated() {
        for e in [
            TokenError::Malformed,
            TokenError::BadSignature,
            TokenError::Expired,
            TokenError::ClaimMissing,
            TokenError::ClaimTypeInvalid,
        ] {
            assert_eq!(AppError::from(e).status(), StatusCode::UNAUTHORIZED);
        }
    }
}
