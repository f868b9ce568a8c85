//! Sync Monitoring Service (`syncsrv`)
//!
//! Serves the replication dashboard and operator actions over HTTP while
//! background tasks feed records, link samples and health insights.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::serve;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use common::shutdown::cancel_on_shutdown;
use syncsrv::bootstrap;
use syncsrv::routes::create_routes;

#[derive(Parser, Debug)]
#[command(author, version, about = "SyncSrv - sync monitoring service")]
struct Args {
    /// Configuration file (default: config/syncsrv.yaml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Listen port, overrides configuration and environment
    #[arg(short, long)]
    port: Option<u16>,

    /// Validation mode - only validate configuration without starting service
    #[arg(long)]
    validate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let service_info = bootstrap::create_service_info();

    let mut loaded = bootstrap::load_configuration(args.config.as_deref(), &service_info)
        .context("Failed to load configuration")?;
    if let Some(port) = args.port {
        loaded.config.api.port = port;
    }

    bootstrap::init_environment(&service_info, &loaded)?;
    let config = loaded.config;

    if args.validate {
        info!("Validation completed successfully");
        return Ok(());
    }

    let advisor = bootstrap::build_advisor(&config.advisory)?;
    let bind_address = config.api.bind_address();
    let (state, generator) = bootstrap::build_state(config, advisor)?;
    let state = Arc::new(state);

    let shutdown_token = CancellationToken::new();
    let tasks = bootstrap::spawn_background_tasks(&state, generator, &shutdown_token);

    let addr: SocketAddr = bind_address
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", bind_address))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("API server listening on http://{}", addr);

    let app = create_routes(Arc::clone(&state));
    let server_token = shutdown_token.clone();
    let server_handle = tokio::spawn(async move {
        let graceful = server_token.clone();
        let shutdown = async move { graceful.cancelled().await };
        if let Err(e) = serve(listener, app).with_graceful_shutdown(shutdown).await {
            error!("API server error: {}", e);
            server_token.cancel();
        }
    });

    let signal_watcher = cancel_on_shutdown(shutdown_token.clone());
    shutdown_token.cancelled().await;
    info!("Shutting down");
    if let Err(e) = signal_watcher.await {
        warn!("Shutdown watcher ended abnormally: {}", e);
    }

    for task in tasks {
        if let Err(e) = task.await {
            warn!("Background task ended abnormally: {}", e);
        }
    }
    if tokio::time::timeout(Duration::from_secs(10), server_handle)
        .await
        .is_err()
    {
        warn!("API server did not stop within 10s");
    }

    info!("SyncSrv stopped");
    Ok(())
}
