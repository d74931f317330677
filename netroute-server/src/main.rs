//! HTTP front end for routing waypoints along line networks.
//!
//! # Endpoints
//!
//! - `GET /health`
//! - `POST /route` routes over a network posted with the request
//! - `POST /route/catalog` routes over a network read from the configured catalogue

use std::{sync::Arc, time::Duration};

use clap::Parser;
use tracing::{error, info};

use crate::{
    api::AppState,
    catalog::CatalogSource,
    config::{Cli, ServerConfig},
    logging::init_logging,
};

mod api;
mod catalog;
mod config;
mod logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = ServerConfig::resolve(&cli)?;
    init_logging(&config.log_level, config.log_format);

    let catalog = match &config.catalog {
        Some(catalog_config) => {
            let source = CatalogSource::load(catalog_config).await.map_err(|e| {
                error!(error = %e, manifest = %catalog_config.manifest.display(), "failed to load catalogue");
                e
            })?;
            Some(Arc::new(source))
        }
        None => {
            info!("no catalogue configured, /route/catalog is disabled");
            None
        }
    };

    let state = AppState {
        router: config.router,
        catalog,
    };
    let app = api::app(
        state,
        Duration::from_secs(config.request_timeout_secs),
        config.max_concurrent_requests,
    );

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(addr = %config.bind, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
    }
    info!("shutting down");
}
