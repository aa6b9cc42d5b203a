use std::path::Path;
use crate::cli::commands::ServeArgs;
use crate::config::load_config;
use crate::errors::GatewayError;
use crate::api;
use tracing::{info, warn};

pub async fn handle_serve(args: ServeArgs) -> Result<(), GatewayError> {
    let mut config = load_config(args.config.as_deref().map(Path::new)).await?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if args.no_guardrails {
        config.guardrails.enabled = false;
    }
    if !config.guardrails.enabled {
        warn!("Guardrails disabled, prompts and responses pass through unmoderated");
    }

    let state = api::create_app_state(&config)?;
    let available = state.gateway.registry().providers();
    if available.is_empty() {
        warn!("No provider has credentials configured; every completion will fail");
    }
    info!(providers = ?available, "Providers ready");

    let app = api::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| GatewayError::Internal(format!("Server error: {}", e)))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
