//! Git webhook filter (v1)
//!
//! Receives push webhooks from a git server and forwards each one to the
//! target chosen by its `ref`.
//!
//! # Architecture Overview
//!
//! ```text
//!                           ┌──────────────────────────────────────────────────┐
//!                           │                  WEBHOOK FILTER                  │
//!                           │                                                  │
//!     Git server webhook    │  ┌──────────┐    ┌───────────┐    ┌───────────┐  │
//!     ──────────────────────┼─▶│   http   │───▶│  routing  │───▶│ template  │  │
//!                           │  │  server  │    │  rule set │    │ (targets) │  │
//!                           │  └────┬─────┘    └─────┬─────┘    └───────────┘  │
//!                           │       │                │ target URL              │
//!     OK / 500              │       │                ▼                         │
//!     ◀─────────────────────┼───────┘          ┌───────────┐                   │
//!                           │                  │  forward  │───────────────────┼──▶ Target
//!                           │                  └───────────┘                   │
//!                           │                                                  │
//!                           │  config · lifecycle · observability              │
//!                           └──────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::process;

use clap::Parser;
use tokio::net::TcpListener;

use webhook_filter::config::{resolve_config, Args, ObservabilityConfig};
use webhook_filter::http::HttpServer;
use webhook_filter::lifecycle::{load_rules, spawn_signal_handler, Shutdown};
use webhook_filter::observability::{logging, metrics};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match resolve_config(&args) {
        Ok(config) => config,
        Err(e) => {
            logging::init_logging(&ObservabilityConfig::default());
            tracing::error!(error = %e, "Failed to load configuration");
            process::exit(1);
        }
    };

    logging::init_logging(&config.observability);
    tracing::info!("webhook-filter v{} starting", env!("CARGO_PKG_VERSION"));

    let rules = match load_rules(&config) {
        Ok(rules) => rules,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load rules");
            process::exit(1);
        }
    };

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
        tracing::info!(address = %addr, "Metrics endpoint enabled");
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        forward_timeout_secs = config.timeouts.forward_secs,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, rules)?;
    spawn_signal_handler(shutdown.clone());

    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown successful");
    Ok(())
}
