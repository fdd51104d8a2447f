use anyhow::Context;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{error, info};

use electricals_store::{
    create_app, init_observability, shutdown_observability, AppServices, Config, Metrics,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration first (basic logging only)
    let config = Config::from_environment().context("Failed to load configuration")?;
    println!("Configuration loaded successfully");

    init_observability(&config.observability)?;

    info!(
        "Starting {} v{}",
        config.observability.service_name, config.observability.service_version
    );
    info!(
        "Merchant: {} ({})",
        config.store.merchant_name, config.store.merchant_vpa
    );

    let metrics = Arc::new(Metrics::new()?);
    info!("Metrics initialized successfully");

    let gateway = Arc::new(config.payments.gateway());
    let services = AppServices::in_memory(&config, gateway, metrics.clone());

    let seeded = services
        .seed_if_configured(&config)
        .await
        .context("Failed to seed catalog")?;
    info!("Services initialized, catalog holds {} sample products", seeded);

    let app = create_app(services, &config, metrics);

    let addr: SocketAddr = config
        .server
        .bind_address()
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.bind_address()))?;

    let listener = TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
        }
        info!("Shutdown signal received");
        shutdown_observability().await;
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
