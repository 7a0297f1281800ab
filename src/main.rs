//! Treasury engine (v1)
//!
//! Converts earning events into on-chain claims against a fixed set of
//! contracts and pays out withdrawals from a single custodial account.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌──────────────────────────────────────────────────┐
//!                  │                 TREASURY ENGINE                   │
//!                  │                                                   │
//!   HTTP Request   │  ┌────────┐    ┌──────────┐    ┌──────────────┐  │
//!   ───────────────┼─▶│  http  │───▶│  claims  │───▶│  blockchain  │──┼──▶ JSON-RPC
//!                  │  │ server │    │  engine  │    │  submitter   │  │     node
//!                  │  └───┬────┘    └────┬─────┘    └──────▲───────┘  │
//!                  │      │              ▼                 │          │
//!                  │      │         ┌─────────┐            │          │
//!                  │      │         │ ledger  │            │          │
//!                  │      │         └─────────┘            │          │
//!                  │      └──────▶ ┌───────────┐ ─────────┘          │
//!                  │               │ transfers │                      │
//!                  │               └───────────┘                      │
//!                  │                                                   │
//!                  │  config · observability · lifecycle               │
//!                  └──────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use treasury_engine::config::load_config;
use treasury_engine::lifecycle::{initialize, signals, Shutdown};
use treasury_engine::observability::{logging, metrics};
use treasury_engine::HttpServer;

#[derive(Parser)]
#[command(name = "treasury-engine", version, about = "Treasury claim and settlement service")]
struct Args {
    /// Path to a TOML config file (also TREASURY_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "treasury-engine starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        eth_price_usd = config.pricing.eth_price_usd,
        confirmation_timeout_secs = config.blockchain.confirmation_timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let ctx = initialize(&config).await;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        ready = ctx.is_some(),
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(&shutdown);

    let server = HttpServer::new(&config, ctx);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
