//! Kiosk Player (kiosk-player) - Main entry point
//!
//! Starts the simulated playback engine and its clock, opens the resume
//! store, loads the catalog and serves the HTTP API plus the web UI.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use kiosk_common::catalog::{Catalog, CatalogError};
use kiosk_common::config::TomlConfig;
use kiosk_common::ResumeStore;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

use kiosk_player::config::{log_directives, Config, Overrides};
use kiosk_player::playback::{ClockHandle, LoadedItem, PlaybackEngine};
use kiosk_player::{build_router, AppState, PlayerControl};

/// Command-line arguments for kiosk-player
#[derive(Parser, Debug)]
#[command(name = "kiosk-player")]
#[command(about = "Playback backend for a kiosk audio device")]
#[command(version)]
struct Args {
    /// Path to TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "KIOSK_PORT")]
    port: Option<u16>,

    /// Resume checkpoint file
    #[arg(long, env = "KIOSK_STATE_PATH")]
    state_path: Option<PathBuf>,

    /// Catalog JSON file
    #[arg(long, env = "KIOSK_CATALOG_PATH")]
    catalog_path: Option<PathBuf>,

    /// Web UI directory
    #[arg(long, env = "KIOSK_STATIC_DIR")]
    static_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing; the configured level replaces the default once loaded
    let env_filter = EnvFilter::try_from_default_env();
    let filter_from_env = env_filter.is_ok();
    let (filter, filter_handle) =
        reload::Layer::new(env_filter.unwrap_or_else(|_| EnvFilter::new(log_directives("info"))));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let toml_config = TomlConfig::resolve_and_load(args.config.as_deref())
        .context("Failed to load configuration")?;
    let overrides = Overrides {
        port: args.port,
        state_path: args.state_path,
        catalog_path: args.catalog_path,
        static_dir: args.static_dir,
    };
    let config = Config::from_parts(toml_config, overrides).context("Invalid configuration")?;

    if !filter_from_env {
        if let Err(e) = filter_handle.reload(EnvFilter::new(log_directives(&config.log_level))) {
            warn!("Failed to apply log level '{}': {}", config.log_level, e);
        }
    }

    info!(
        "Starting Kiosk Player v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let store = ResumeStore::open(&config.state_path)
        .with_context(|| format!("Failed to open resume store {}", config.state_path.display()))?;
    info!(
        "Resume store {} ({} checkpoints)",
        store.path().display(),
        store.len()
    );

    let catalog = load_catalog(&config)?;

    let engine = Arc::new(PlaybackEngine::new(LoadedItem::demo(), config.initial_volume));
    let clock = ClockHandle::spawn(Arc::clone(&engine), config.tick_interval);

    let state = AppState::new(
        PlayerControl::new(engine),
        Arc::new(store),
        Arc::new(catalog),
        config.static_dir.clone(),
        config.device_mode.clone(),
    );
    let app = build_router(state);

    info!("Starting HTTP server on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error");

    clock.stop().await;
    served?;

    info!("Server shutdown complete");
    Ok(())
}

/// Load the catalog; a missing file leaves the kiosk with nothing to browse
fn load_catalog(config: &Config) -> Result<Catalog> {
    match Catalog::load(&config.catalog_path) {
        Ok(catalog) => {
            info!(
                "Catalog {}: {} categories, {} items",
                config.catalog_path.display(),
                catalog.categories.len(),
                catalog.item_count()
            );
            Ok(catalog)
        }
        Err(CatalogError::Read { path, source }) if source.kind() == std::io::ErrorKind::NotFound => {
            warn!("Catalog {} not found, starting with an empty catalog", path.display());
            Ok(Catalog::default())
        }
        Err(e) => Err(e).context("Failed to load catalog"),
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
