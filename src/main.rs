//! force-gzip-upstream
//!
//! A synthetic HTTP upstream that gzip-encodes every payload response
//! regardless of `Accept-Encoding`, for exercising how intermediaries
//! handle compressed bodies.
//!
//! ```text
//!     Client ──▶ request id ──▶ trace ──▶ request log ──▶ encoding probe ──▶ handler
//!                                                                             │
//!                                                  ┌──────────────────────────┤
//!                                                  ▼                          ▼
//!                                       single-shot gzip JSON        SSE emitter task
//!                                                                    frame → gzip flush
//!                                                                          → transport flush
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use force_gzip_upstream::config::load_config;
use force_gzip_upstream::lifecycle::{wait_for_signal, Shutdown};
use force_gzip_upstream::observability::{logging, metrics};
use force_gzip_upstream::HttpServer;

#[derive(Parser)]
#[command(name = "force-gzip-upstream")]
#[command(about = "Synthetic upstream that always answers with gzip bodies", long_about = None)]
struct Cli {
    /// Optional TOML config file. `PORT` in the environment overrides its port.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    logging::init_logging(&config.observability);
    tracing::info!("force-gzip-upstream v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address(),
        channel_capacity = config.stream.channel_capacity,
        probe_enabled = config.probe.enabled,
        probe_debug = config.probe.debug_mode,
        probe_config_json = config.probe.config_json.is_some(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(config.listener.bind_address()).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let signal = wait_for_signal().await;
        tracing::info!(signal, "Shutdown signal received");
        shutdown.trigger();
    });

    let server = HttpServer::new(config);
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
