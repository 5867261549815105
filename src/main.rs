use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use prediction_gateway::config::Config;
use prediction_gateway::gateway::{self, AppState};
use prediction_gateway::ml_api::{MlApiClient, PredictionService};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let client = MlApiClient::new(&config.ml_api_url, config.request_timeout())?;
    info!(
        "Prediction API: {} (timeout {:?})",
        config.ml_api_url,
        config.request_timeout()
    );

    // Not fatal: the gateway still validates and reports upstream state on /health
    match client.health().await {
        Ok(h) => info!("Prediction API status: {} (model_loaded={:?})", h.status, h.model_loaded),
        Err(e) => warn!("Prediction API not reachable at startup: {}", e),
    }

    let state = AppState {
        service: Arc::new(client),
    };
    let app = gateway::router(state, gateway::cors_layer(&config.allowed_origins)?);

    let addr: SocketAddr = config.listen_addr.parse()?;
    info!("Gateway listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutting down");
        })
        .await?;

    Ok(())
}
