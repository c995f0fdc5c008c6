//! Home, collection and artist views
//!
//! Joins the catalog with the resume store: the home screen starts with a
//! "Continue listening" row built from recent checkpoints, followed by one
//! row per catalog category.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use kiosk_common::catalog::Item;
use kiosk_common::ResumeState;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path as FsPath;

use super::with_store;
use crate::error::{Error, Result};
use crate::playback::state::PLACEHOLDER_COVER;
use crate::AppState;

/// Entries shown in the "Continue listening" row
const CONTINUE_ROW_LIMIT: usize = 15;
const CONTINUE_ROW_TITLE: &str = "Continue listening";
const RESUME_LABEL: &str = "Continue";

/// Episodes listed for an artist until real source browsing exists
const MOCK_EPISODE_COUNT: u32 = 2;
const MOCK_EPISODE_DURATION: u32 = 3600;

#[derive(Debug, Serialize)]
pub struct HomeResponse {
    pub sections: Vec<HomeSection>,
}

#[derive(Debug, Serialize)]
pub struct HomeSection {
    pub title: String,
    pub items: Vec<HomeItem>,
}

#[derive(Debug, Serialize)]
pub struct HomeItem {
    pub id: String,
    pub title: String,
    /// artist, playlist, podcast, continue
    #[serde(rename = "type")]
    pub kind: String,
    pub image: String,
    pub can_resume: bool,
    #[serde(rename = "resume_pos_sec", skip_serializing_if = "Option::is_none")]
    pub resume_pos: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_label: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ArtistResponse {
    pub id: String,
    pub title: String,
    pub cover: String,
    pub albums: Vec<AlbumSummary>,
}

#[derive(Debug, Serialize)]
pub struct AlbumSummary {
    pub id: String,
    pub title: String,
    pub duration: u32,
}

#[derive(Debug, Serialize)]
pub struct CollectionSummary {
    pub id: String,
    pub title: String,
    pub item_count: usize,
}

/// Build home, collection and artist routes
pub fn home_routes() -> Router<AppState> {
    Router::new()
        .route("/api/home", get(home))
        .route("/api/collections", get(collections))
        .route("/api/artist/:id", get(artist_details))
}

/// Cover URL for `item`: the first source cover present under `static_dir`,
/// else the placeholder
pub fn pick_cover(static_dir: &FsPath, item: Option<&Item>) -> String {
    item.and_then(|item| {
        item.cover_paths()
            .find(|cover| static_dir.join(cover.trim_start_matches('/')).is_file())
    })
    .unwrap_or(PLACEHOLDER_COVER)
    .to_string()
}

/// GET /api/home
pub async fn home(State(state): State<AppState>) -> Result<Json<HomeResponse>> {
    let resumable: Vec<String> = state
        .catalog
        .categories
        .iter()
        .flat_map(|c| c.items.iter())
        .filter(|item| item.resume)
        .map(|item| item.id.clone())
        .collect();

    let (recent, checkpoints) = with_store(&state, move |store| {
        let checkpoints: HashMap<String, ResumeState> = resumable
            .into_iter()
            .filter_map(|id| store.get(&id).map(|c| (id, c)))
            .collect();
        (store.list_recent(CONTINUE_ROW_LIMIT), checkpoints)
    })
    .await?;

    let mut sections = Vec::new();
    if !recent.is_empty() {
        let items = recent
            .into_iter()
            .map(|entry| {
                let item = entry
                    .state
                    .item_id
                    .as_deref()
                    .and_then(|id| state.catalog.find_item(id));
                let title = match item {
                    Some(item) => item.display_name.clone(),
                    None => entry.state.item_id.clone().unwrap_or_default(),
                };
                HomeItem {
                    id: entry.key,
                    title,
                    kind: "continue".to_string(),
                    image: pick_cover(&state.static_dir, item),
                    can_resume: true,
                    resume_pos: Some(entry.state.position_sec),
                    resume_label: Some(RESUME_LABEL.to_string()),
                }
            })
            .collect();

        sections.push(HomeSection {
            title: CONTINUE_ROW_TITLE.to_string(),
            items,
        });
    }

    for category in &state.catalog.categories {
        let items = category
            .items
            .iter()
            .map(|item| {
                let checkpoint = checkpoints
                    .get(&item.id)
                    .filter(|c| item.resume && c.position_sec > 0);

                HomeItem {
                    id: item.id.clone(),
                    title: item.display_name.clone(),
                    kind: item.kind.clone(),
                    image: pick_cover(&state.static_dir, Some(item)),
                    can_resume: item.resume,
                    resume_pos: checkpoint.map(|c| c.position_sec),
                    resume_label: checkpoint.map(|_| RESUME_LABEL.to_string()),
                }
            })
            .collect();

        sections.push(HomeSection {
            title: category.title.clone(),
            items,
        });
    }

    Ok(Json(HomeResponse { sections }))
}

/// GET /api/collections - Catalog categories with their sizes
pub async fn collections(State(state): State<AppState>) -> Json<Vec<CollectionSummary>> {
    Json(
        state
            .catalog
            .categories
            .iter()
            .map(|c| CollectionSummary {
                id: c.id.clone(),
                title: c.title.clone(),
                item_count: c.items.len(),
            })
            .collect(),
    )
}

/// GET /api/artist/:id
pub async fn artist_details(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ArtistResponse>> {
    let item = state
        .catalog
        .find_item(&id)
        .filter(|item| item.kind == "artist")
        .ok_or_else(|| Error::NotFound(format!("artist '{}'", id)))?;

    let albums = (1..=MOCK_EPISODE_COUNT)
        .map(|n| AlbumSummary {
            id: format!("{}_{}", item.id, n),
            title: format!("Episode {}", n),
            duration: MOCK_EPISODE_DURATION,
        })
        .collect();

    Ok(Json(ArtistResponse {
        id: item.id.clone(),
        title: item.display_name.clone(),
        cover: pick_cover(&state.static_dir, Some(item)),
        albums,
    }))
}
