use std::net::SocketAddr;

use service_catalog::{config::AppConfig, rest, store, telemetry, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv = dotenvy::dotenv();
    let config = AppConfig::from_env()?;

    let _log_guard = telemetry::init(config.log_file.as_deref())?;

    if let Err(e) = dotenv {
        tracing::info!("failed to read .env: {}", e);
    }
    if let Some(path) = &config.log_file {
        tracing::info!(path = %path.display(), "writing logs to file");
    }

    let pool = store::connect(&config.database_url, config.max_connections).await?;
    if config.auto_migrate {
        tracing::info!("running migrations...");
        store::migrate(&pool).await?;
    }

    let app = rest::router(AppState::new(pool, &config.token));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("REST API listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
