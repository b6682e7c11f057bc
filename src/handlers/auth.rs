use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};

use super::{require, MAX_PASSWORD_LEN, MAX_USERNAME_LEN};
use crate::{
    auth::verify_password,
    error::AppError,
    models::{
        user::{AuthResponse, CredentialsPayload, User},
        DataResponse,
    },
    store::StoreError,
    AppState,
};

fn validate(payload: &CredentialsPayload) -> Result<(), AppError> {
    require("username", &payload.username, MAX_USERNAME_LEN)?;
    require("password", &payload.password, MAX_PASSWORD_LEN)
}

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<DataResponse<User>>), AppError> {
    let Json(payload) = payload.map_err(|e| {
        AppError::Validation(format!("invalid registration input: {}", e.body_text()))
    })?;
    validate(&payload)?;

    let user = state
        .users
        .create(&payload.username, &payload.password)
        .await
        .map_err(|e| AppError::from_store("unable to create user", e))?;

    tracing::info!(user_id = user.id, "user registered");
    Ok((StatusCode::CREATED, Json(DataResponse { data: user })))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsPayload>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    let Json(payload) = payload
        .map_err(|e| AppError::Validation(format!("invalid login input: {}", e.body_text())))?;
    validate(&payload)?;

    let user = state
        .users
        .find_by_username(&payload.username)
        .await
        .map_err(|e| AppError::from_store("unable to fetch user", e))?;

    let hash = user.password_hash.clone();
    let password = payload.password;
    let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| {
            AppError::from_store("unable to verify password", StoreError::Hashing(e.to_string()))
        })?;
    if !matches {
        return Err(AppError::InvalidCredentials);
    }

    let access_token = state.tokens.issue(user.id)?;

    Ok(Json(AuthResponse { access_token }))
}
