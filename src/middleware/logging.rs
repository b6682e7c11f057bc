use std::{net::SocketAddr, time::Instant};

use axum::{
    extract::{ConnectInfo, Request},
    middleware::Next,
    response::Response,
};

use super::CurrentUser;

/// Emits one event per request; server errors are logged at `error`.
pub async fn log_requests(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req
        .uri()
        .path_and_query()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());
    let client_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string());

    let res = next.run(req).await;

    let latency = start.elapsed();
    let status = res.status().as_u16();
    let user_id = res.extensions().get::<CurrentUser>().map(|u| u.id);

    if res.status().is_server_error() {
        tracing::error!(
            %method,
            path = %path,
            status,
            ?latency,
            client_ip = client_ip.as_deref(),
            user_id,
            "request failed"
        );
    } else {
        tracing::info!(
            %method,
            path = %path,
            status,
            ?latency,
            client_ip = client_ip.as_deref(),
            user_id,
            "request handled"
        );
    }

    res
}
