//! Authentication service.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────────────┐
//!                         │                    AUTH SERVICE                      │
//!                         │                                                      │
//!   POST /login           │  ┌─────────┐    ┌──────────────┐    ┌─────────────┐  │
//!   ──────────────────────┼─▶│  http   │───▶│    auth      │───▶│ resilience  │  │
//!                         │  │ server  │    │ login        │    │ circuit     │  │
//!                         │  └─────────┘    └──────┬───────┘    │ breaker     │  │
//!                         │                        │            └──────┬──────┘  │
//!                         │                        ▼                   ▼         │
//!   200 {accessToken}     │                 ┌──────────────┐    ┌─────────────┐  │
//!   ◀─────────────────────┼─────────────────│ credentials  │    │ users_api   │──┼──▶ Users API
//!   401 / 503             │                 │ set          │    │ token+client│  │
//!                         │                 └──────────────┘    └─────────────┘  │
//!                         │                                                      │
//!                         │  config · observability · lifecycle                  │
//!                         └──────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use auth_service::config::load_config;
use auth_service::http::HttpServer;
use auth_service::lifecycle::{build_login_service, signals, Shutdown};
use auth_service::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "auth-service")]
#[command(about = "Login service backed by the users API", long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    logging::init_logging(&config.observability.log_level);

    tracing::info!("auth-service v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        users_api = %config.users_api.base_url,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let login = Arc::new(build_login_service(&config)?);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Arc::new(Shutdown::new());
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_handler(shutdown);

    HttpServer::new(&config, login).run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
