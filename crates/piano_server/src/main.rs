//! Melody service entry point.

use anyhow::{Context, Result};
use log::{error, info, warn};
use piano_core::{init_logging_for, init_stderr_logging};
use piano_server::{router, MelodyStorage, ServerConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::from_env();
    start_logging(&config);
    for warning in &config.warnings {
        warn!("event=config module=server status=fallback detail={warning}");
    }

    let storage = Arc::new(MelodyStorage::new(config.db_location.clone()));
    // Keep serving without storage; requests retry the open and answer 500.
    if let Err(err) = storage.connect() {
        error!("event=server_start module=server status=degraded error={err}");
    }

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("event=server_start module=server status=ok addr={addr}");

    axum::serve(listener, router(storage))
        .await
        .context("server stopped unexpectedly")?;
    Ok(())
}

fn start_logging(config: &ServerConfig) {
    let log_dir = config.log_dir.to_string_lossy();
    if let Err(err) = init_logging_for(&config.log_level, &log_dir, "server") {
        eprintln!("file logging unavailable ({err}); logging to stderr");
        init_stderr_logging(&config.log_level);
    }
}
