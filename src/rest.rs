use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;

use crate::{
    handlers::{auth, health, services},
    middleware::{log_requests, require_identity},
    AppState,
};

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/services",
            get(services::list_services).post(services::create_service),
        )
        .route(
            "/services/:id",
            get(services::get_service).patch(services::update_service),
        )
        .route("/services/:id/version", post(services::create_version))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_identity,
        ));

    Router::new()
        .route("/health", get(health::health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .merge(protected)
        .layer(ServiceBuilder::new().layer(middleware::from_fn(log_requests)))
        .with_state(state)
}
