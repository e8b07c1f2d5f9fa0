//! # Courier Server
//!
//! Single-process binary serving the delivery API. All state lives in one
//! SQLite database; restarting the process loses nothing but sessions in
//! flight.

use clap::Parser;
use courier_api::{build_router, AppState};
use courier_db::Database;
use std::net::SocketAddr;

#[derive(Debug, Parser)]
#[command(name = "courier-server", version, about = "End-to-end encrypted message relay")]
struct Args {
    /// Config file (any format the `config` crate reads). Env vars still win.
    #[arg(short, long, env = "COURIER_CONFIG")]
    config: Option<String>,

    /// Override `server.port`.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = courier_common::config::init(args.config.as_deref())?;

    // Initialize tracing (structured logging)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "courier=debug,tower_http=debug".into()),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    tracing::info!("Starting Courier v{}", env!("CARGO_PKG_VERSION"));

    let db = Database::connect(config).await?;
    db.migrate().await?;

    let state = AppState::from_config(db, config)?;
    tracing::info!(
        rsa_bits = state.issuer.bits(),
        retain_private_keys = config.auth.retain_private_keys,
        "Key issuer ready"
    );
    let router = build_router(state);

    let addr = SocketAddr::new(
        config.server.host.parse()?,
        args.port.unwrap_or(config.server.port),
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("REST API listening on http://{addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
