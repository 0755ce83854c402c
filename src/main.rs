//! Vehicle listing API host.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ───────────────▶ http::server (request ID, trace, timeout, body limit)
//!                          │
//!                          ▼  mount path
//!                      functions::Function ── one per deployable unit
//!                          │
//!                          ▼
//!                      dispatch::Dispatcher
//!                          ├─ security::CorsPolicy (every response)
//!                          ├─ OPTIONS → 200, empty
//!                          ├─ routing::RouteTable → handlers::*
//!                          └─ ErrorBoundary → 404 / 500 envelopes
//!     Client Response
//!     ◀─────────────── exactly one response
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use vehicle_api::config::{load_config, AppConfig};
use vehicle_api::lifecycle::{build_functions, signals, Shutdown};
use vehicle_api::observability::{init_logging, metrics};
use vehicle_api::security::CorsPolicy;
use vehicle_api::HttpServer;

#[derive(Parser)]
#[command(name = "vehicle-api")]
#[command(about = "Serves the vehicle listing API functions", long_about = None)]
struct Args {
    /// TOML configuration file; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "vehicle-api starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.listener.request_timeout_secs,
        upstream = %config.upstream.base_url,
        functions = config.functions.enabled.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(err) = metrics::init_metrics(addr) {
                    tracing::error!(error = %err, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let functions = build_functions(&config)?;
    let cors = CorsPolicy::from_config(&config.cors)?;
    let server = HttpServer::new(config.listener.clone(), &functions, cors);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    signals::spawn_signal_handler(shutdown);
    server.run(listener, receiver).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
