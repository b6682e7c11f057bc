use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::{max_len, require, MAX_NAME_LEN};
use crate::{
    error::AppError,
    middleware::CurrentUser,
    models::{
        service::{
            CreateServicePayload, GetServiceQuery, ListServicesFilter, Service, ServiceId,
            UpdateServicePayload,
        },
        version::{CreateVersionPayload, Version},
        DataResponse,
    },
    store::StoreError,
    AppState,
};

// Ids that fail to parse are treated like ids that do not exist.
fn service_id(path: Result<Path<ServiceId>, PathRejection>) -> Result<ServiceId, AppError> {
    path.map(|Path(id)| id)
        .map_err(|e| AppError::NotFound(format!("invalid service id: {}", e.body_text())))
}

pub async fn list_services(
    State(state): State<AppState>,
    user: CurrentUser,
    filter: Result<Query<ListServicesFilter>, QueryRejection>,
) -> Result<Json<DataResponse<Vec<Service>>>, AppError> {
    let Query(filter) = filter.map_err(|e| {
        AppError::Validation(format!("invalid query parameters: {}", e.body_text()))
    })?;

    let services = state
        .catalog
        .list(user.id, &filter)
        .await
        .map_err(|e| AppError::from_store("unable to list services", e))?;

    Ok(Json(DataResponse { data: services }))
}

pub async fn get_service(
    State(state): State<AppState>,
    user: CurrentUser,
    path: Result<Path<ServiceId>, PathRejection>,
    query: Result<Query<GetServiceQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let id = service_id(path)?;
    let Query(query) = query.map_err(|e| {
        AppError::Validation(format!("invalid query parameters: {}", e.body_text()))
    })?;

    let res = if query.with_versions() {
        let service = state
            .catalog
            .get_with_versions(id, user.id)
            .await
            .map_err(|e| AppError::from_store("unable to fetch service", e))?;
        Json(DataResponse { data: service }).into_response()
    } else {
        let service = state
            .catalog
            .get(id, user.id)
            .await
            .map_err(|e| AppError::from_store("unable to fetch service", e))?;
        Json(DataResponse { data: service }).into_response()
    };

    Ok(res)
}

pub async fn create_service(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<CreateServicePayload>, JsonRejection>,
) -> Result<(StatusCode, Json<DataResponse<Service>>), AppError> {
    let Json(payload) = payload
        .map_err(|e| AppError::Validation(format!("invalid service input: {}", e.body_text())))?;
    require("name", &payload.name, MAX_NAME_LEN)?;

    let service = state
        .catalog
        .create(user.id, &payload.name, &payload.description)
        .await
        .map_err(|e| AppError::from_store("unable to create service", e))?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: service })))
}

pub async fn update_service(
    State(state): State<AppState>,
    user: CurrentUser,
    path: Result<Path<ServiceId>, PathRejection>,
    payload: Result<Json<UpdateServicePayload>, JsonRejection>,
) -> Result<Response, AppError> {
    let id = service_id(path)?;
    let Json(patch) = payload.map_err(|e| {
        AppError::Validation(format!("invalid service update input: {}", e.body_text()))
    })?;
    max_len("name", &patch.name, MAX_NAME_LEN)?;

    if patch.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let service = state
        .catalog
        .update(id, user.id, &patch)
        .await
        .map_err(|e| AppError::from_store("unable to update service", e))?;

    Ok(Json(DataResponse { data: service }).into_response())
}

pub async fn create_version(
    State(state): State<AppState>,
    user: CurrentUser,
    path: Result<Path<ServiceId>, PathRejection>,
    payload: Result<Json<CreateVersionPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<DataResponse<Version>>), AppError> {
    let id = service_id(path)?;
    let Json(payload) = payload
        .map_err(|e| AppError::Validation(format!("invalid version input: {}", e.body_text())))?;
    require("version", &payload.version, MAX_NAME_LEN)?;

    let version = state
        .catalog
        .create_version(id, user.id, &payload.version, &payload.changelog)
        .await
        .map_err(|e| match e {
            // a missing or foreign service is the caller's input problem here
            StoreError::NotFound | StoreError::Duplicate => {
                AppError::Validation(format!("unable to create version: {}", e))
            }
            other => AppError::from_store("unable to create version", other),
        })?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: version })))
}
