//! Resume checkpoint endpoints
//!
//! Every store access goes through [`with_store`], off the async workers.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use kiosk_common::{ResumeEntry, ResumeState};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::home::pick_cover;
use super::with_store;
use crate::error::Result;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    /// 0 or absent lists everything
    #[serde(default)]
    pub limit: usize,
}

/// Resume checkpoint decorated with catalog data
#[derive(Debug, Serialize)]
pub struct ContinueResponse {
    pub id: String,
    pub title: String,
    pub cover: String,
    pub track_index: u32,
    pub position_sec: i64,
    pub item_id: Option<String>,
    pub updated_at: Option<String>,
}

/// Build resume routes
pub fn resume_routes() -> Router<AppState> {
    Router::new()
        .route("/api/resume", get(list_recent))
        .route("/api/resume/:key", get(get_checkpoint).put(put_checkpoint))
        .route("/api/continue/:key", get(continue_details))
}

/// GET /api/resume?limit=N - Most recently updated checkpoints
pub async fn list_recent(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<Vec<ResumeEntry>>> {
    let limit = query.limit;
    let recent = with_store(&state, move |store| store.list_recent(limit)).await?;
    Ok(Json(recent))
}

/// GET /api/resume/:key
pub async fn get_checkpoint(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ResumeState>> {
    let checkpoint = with_store(&state, move |store| store.require(&key)).await??;
    Ok(Json(checkpoint))
}

/// PUT /api/resume/:key - Save a checkpoint; `updated_at` is set by the server
pub async fn put_checkpoint(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(checkpoint): Json<ResumeState>,
) -> Result<Json<ResumeState>> {
    let stored = with_store(&state, move |store| store.set(&key, checkpoint)).await??;

    Ok(Json(stored))
}

/// GET /api/continue/:key - Checkpoint with catalog title and cover
pub async fn continue_details(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ContinueResponse>> {
    let lookup = key.clone();
    let checkpoint = with_store(&state, move |store| store.require(&lookup)).await??;

    let item = checkpoint
        .item_id
        .as_deref()
        .and_then(|id| state.catalog.find_item(id));

    let title = match (item, checkpoint.item_id.as_deref()) {
        (Some(item), _) => item.display_name.clone(),
        (None, Some(id)) => id.to_string(),
        (None, None) => key.clone(),
    };

    info!("Continue view for '{}' at {}s", key, checkpoint.position_sec);

    Ok(Json(ContinueResponse {
        id: key,
        title,
        cover: pick_cover(&state.static_dir, item),
        track_index: checkpoint.track_index,
        position_sec: checkpoint.position_sec,
        item_id: checkpoint.item_id,
        updated_at: checkpoint.updated_at,
    }))
}
