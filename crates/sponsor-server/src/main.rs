//! Sponsor Connect Server
//!
//! Serves the marketplace API and, optionally, the built mini app.

use anyhow::{Context, Result};
use sponsor_server::config::{LogFormat, ServerConfig};
use sponsor_server::{build_router, storage, AppState};
use std::net::SocketAddr;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Set up panic hook to log crashes
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()));
        let payload = if let Some(s) = info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        eprintln!("[PANIC] at {:?}: {}", location, payload);
        tracing::error!("PANIC at {:?}: {}", location, payload);
    }));

    // .env is optional
    let dotenv = dotenvy::dotenv();

    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("[FATAL] Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_tracing(config.log_format) {
        eprintln!("[FATAL] Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!(
        "Starting Sponsor Connect Server v{}",
        env!("CARGO_PKG_VERSION")
    );
    info!("PID: {}", std::process::id());
    if let Ok(path) = dotenv {
        info!("Loaded environment from {}", path.display());
    }

    if let Err(e) = run_server(config).await {
        error!("Server failed: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Pretty => builder
            .try_init()
            .map_err(|e| anyhow::anyhow!(e))?,
        LogFormat::Json => builder
            .json()
            .try_init()
            .map_err(|e| anyhow::anyhow!(e))?,
    }
    Ok(())
}

async fn run_server(config: ServerConfig) -> Result<()> {
    info!(
        "Config loaded: bind={}, storage={}",
        config.bind_address, config.storage
    );
    if config.admin_telegram_id.is_none() {
        warn!("SPONSOR_ADMIN_TELEGRAM_ID not set, nobody will be admin");
    }
    if config.image_host_url.is_none() {
        warn!("SPONSOR_IMAGE_HOST_URL not set, profile photo uploads are disabled");
    }

    let storage = storage::open(&config)
        .await
        .context("Failed to initialize storage")?;

    let state = AppState::new(storage, &config);
    if let Some(dir) = &config.static_dir {
        info!("Static files directory: {}", dir.display());
    }
    let app = build_router(state, config.static_dir.as_deref());

    let addr: SocketAddr = config
        .bind_address
        .parse()
        .context("Failed to parse bind address")?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!("Server ready to accept connections");
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
