//! Badgebridge API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod dev_seed;
mod dto;
mod error;
mod handlers;
mod interaction_signature;
mod state;

use badgebridge_core::AppError;
use tracing::{info, warn};

use crate::api_config::{ApiConfig, init_tracing};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;
    let address = config.socket_address()?;

    let directory_services = api_services::build_directory_services(&config)?;
    let directory = directory_services.directory.clone();
    let app_state = api_services::build_app_state(&config, directory.clone())?;

    // The server starts even when the directory is down; /status reports it.
    if let Err(error) = directory.ensure_ready().await {
        warn!(error = %error, "member directory is not ready yet");
    }
    if let Some(registration) = directory_services.command_registration {
        registration.run().await;
    }

    let app = api_router::build_router(app_state);
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(
        %address,
        guild_id = %config.guild_id,
        directory_provider = config.directory_provider.as_str(),
        "badgebridge-api listening"
    );

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")));

    directory.shutdown().await;
    info!("badgebridge-api stopped");
    served
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(error = %error, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                warn!(error = %error, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    info!("shutdown signal received");
}
