//! ttmd - TTM Vehicle Gateway Daemon
//!
//! Relays binary records between the Mabx and JSON messages to and from the
//! TTM infrastructure backend.
//!
//! # Usage
//!
//! With built-in bench defaults:
//! ```bash
//! ./ttmd
//! ```
//!
//! With a config file and overrides:
//! ```bash
//! ./ttmd --config config/ttmd.toml --vehicle-id 204 --ttm-host 10.0.0.5
//! ```

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ttm_link::{
    provision, shutdown, Gateway, GatewayConfig, ProvisionError, TcpProvisioningLink, TtmPorts,
};

/// How long endpoint tasks get to stop after Ctrl+C
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Parser, Debug)]
#[command(name = "ttmd")]
#[command(about = "TTM vehicle gateway: relays Mabx records to and from the TTM backend")]
struct Args {
    /// Configuration file path (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Vehicle identifier sent during provisioning (overrides config)
    #[arg(long)]
    vehicle_id: Option<String>,

    /// TTM backend address (overrides config)
    #[arg(long)]
    ttm_host: Option<IpAddr>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "ttmd=debug,ttm_link=debug,ttm_conv=debug,ttm_core=debug"
    } else {
        "ttmd=info,ttm_link=info,ttm_conv=info,ttm_core=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ttmd (TTM vehicle gateway)");

    let config = load_config(&args)?;
    info!(
        vehicle_id = %config.vehicle_id,
        mabx_rx_port = config.mabx.rx_port,
        mabx_destination = %config.mabx.destination(),
        provisioning = %config.ttm.provisioning_addr(),
        queue_capacity = config.relay.queue_capacity,
        "Configuration loaded"
    );

    let (trigger, shutdown) = shutdown::channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutting down..."),
            Err(e) => error!(error = %e, "Cannot listen for Ctrl+C, shutting down"),
        }
        trigger.trigger();
    });

    // Provisioning must finish before any UDP socket exists
    let mut link = TcpProvisioningLink::new();
    let mut provisioning_shutdown = shutdown.clone();
    let port = match provision(
        &mut link,
        config.ttm.provisioning_addr(),
        &config.vehicle_id,
        &mut provisioning_shutdown,
    )
    .await
    {
        Ok(port) => port,
        Err(ProvisionError::Cancelled) => {
            info!("Stopped before provisioning completed");
            return Ok(());
        }
        Err(e) => return Err(anyhow::anyhow!("Provisioning failed: {}", e)),
    };

    let (rx_port, tx_port) = config.ttm.ports(port)?;
    info!(rx_port, tx_port, "TTM ports assigned");

    let gateway = Gateway::start(&config, TtmPorts { rx_port, tx_port }, shutdown.clone())
        .map_err(|e| anyhow::anyhow!("Failed to start gateway: {}", e))?;

    info!("Press Ctrl+C to stop");

    let mut stop = shutdown;
    stop.wait().await;

    if !gateway.join(SHUTDOWN_TIMEOUT).await {
        warn!("Some endpoint tasks were aborted");
    }

    info!("ttmd stopped");
    Ok(())
}

fn load_config(args: &Args) -> Result<GatewayConfig> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading config from: {}", path.display());
            GatewayConfig::load(path)?
        }
        None => GatewayConfig::default(),
    };

    if let Some(vehicle_id) = &args.vehicle_id {
        config.vehicle_id = vehicle_id.clone();
    }
    if let Some(host) = args.ttm_host {
        config.ttm.host = host;
    }

    config.validate()?;
    Ok(config)
}
