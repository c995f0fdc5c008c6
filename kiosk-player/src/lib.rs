//! # Kiosk Player Library (kiosk-player)
//!
//! Playback backend for a kiosk-style audio device.
//!
//! **Purpose:** Track what is currently playing, expose transport controls
//! over HTTP, and remember playback positions so listeners can resume.
//!
//! **Architecture:** A lock-guarded simulated transport ([`playback`]) driven
//! by a cancellable clock task, a thin control facade ([`control`]), and an
//! axum router ([`api`]) that also serves the resume store, the catalog
//! views and the static web UI.

use axum::Router;
use kiosk_common::{Catalog, ResumeStore};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod control;
pub mod error;
pub mod playback;

pub use control::{Command, PlayerControl};
pub use error::{Error, Result};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Control facade over the playback engine
    pub control: PlayerControl,
    /// Resume checkpoint store
    pub store: Arc<ResumeStore>,
    /// Read-only catalog
    pub catalog: Arc<Catalog>,
    /// Web UI directory (also used to check cover files)
    pub static_dir: PathBuf,
    /// Device mode reported by the status endpoint
    pub device_mode: String,
}

impl AppState {
    /// Create new application state
    pub fn new(
        control: PlayerControl,
        store: Arc<ResumeStore>,
        catalog: Arc<Catalog>,
        static_dir: PathBuf,
        device_mode: String,
    ) -> Self {
        Self {
            control,
            store,
            catalog,
            static_dir,
            device_mode,
        }
    }
}

/// Build application router
///
/// Unmatched paths fall through to the static web UI.
pub fn build_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.static_dir);

    Router::new()
        .merge(api::health_routes())
        .merge(api::player_routes())
        .merge(api::resume_routes())
        .merge(api::home_routes())
        .fallback_service(static_files)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
