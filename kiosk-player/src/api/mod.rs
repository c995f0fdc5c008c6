//! HTTP API handlers for kiosk-player

pub mod device;
pub mod health;
pub mod home;
pub mod player;
pub mod resume;

pub use health::health_routes;
pub use home::home_routes;
pub use player::player_routes;
pub use resume::resume_routes;

use kiosk_common::ResumeStore;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::AppState;

/// Acknowledgement body for commands
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

/// Run `f` against the resume store on the blocking pool
///
/// The store lock is held across file writes, so even reads can wait on disk.
pub(crate) async fn with_store<T, F>(state: &AppState, f: F) -> Result<T>
where
    F: FnOnce(&ResumeStore) -> T + Send + 'static,
    T: Send + 'static,
{
    let store = state.store.clone();
    tokio::task::spawn_blocking(move || f(&store))
        .await
        .map_err(|e| Error::Internal(format!("Resume store task failed: {}", e)))
}
