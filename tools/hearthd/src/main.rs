//! Hearth gateway service
//!
//! Wires the transport, router, and commander together and serves the
//! HTTP API until interrupted.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hearth_core::DeviceDirectory;
use hearth_gateway::{http, Commander, CorrelationTracker, GatewayConfig, MessageRouter};
use hearth_transport::MqttTransport;

/// Hearth - smart-home command gateway over MQTT
#[derive(Parser)]
#[command(name = "hearthd")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// MQTT broker host
    #[arg(short = 'H', long, env = "HEARTH_BROKER_HOST", default_value = "localhost")]
    broker_host: String,

    /// MQTT broker port
    #[arg(short = 'P', long, env = "HEARTH_BROKER_PORT", default_value = "1883")]
    broker_port: u16,

    /// Seconds to wait for a device acknowledgment
    #[arg(short, long, env = "HEARTH_REQUEST_TIMEOUT", default_value = "8")]
    timeout: u64,

    /// Bind address for the HTTP API
    #[arg(short, long, env = "HEARTH_HTTP_BIND", default_value = "0.0.0.0:8000")]
    bind: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(&cli.log_level, cli.json_logs)?;

    let config = GatewayConfig {
        broker_host: cli.broker_host,
        broker_port: cli.broker_port,
        request_timeout_secs: cli.timeout,
        http_bind: cli.bind,
    };

    let directory = Arc::new(DeviceDirectory::default_home());
    info!(
        "device directory loaded: {} devices",
        directory.device_count()
    );

    let (transport, inbound_rx) = MqttTransport::connect(config.mqtt());
    let transport = Arc::new(transport);

    let tracker = Arc::new(CorrelationTracker::new());
    let router = MessageRouter::new(tracker.clone()).spawn(inbound_rx);

    let commander = Arc::new(Commander::new(
        directory,
        transport.clone(),
        tracker,
        config.request_timeout(),
    ));

    let shutdown = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl+c");
        info!("received shutdown signal");
    };

    http::serve(&config.http_bind, commander, shutdown)
        .await
        .context("HTTP server failed")?;

    transport.disconnect().await;
    router.abort();
    info!("hearth gateway stopped");

    Ok(())
}

fn setup_logging(level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .context("failed to parse log level")?;

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).compact())
            .init();
    }

    Ok(())
}
