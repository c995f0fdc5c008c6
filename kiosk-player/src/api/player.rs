//! Player endpoints
//!
//! Status query plus transport and volume commands. Commands are POST-only
//! and answer `{"ok": true}` once the mutation has been applied. Numeric
//! arguments travel as query parameters (`?nr=`, `?position=`, `?seconds=`,
//! `?level=`); out-of-range values are clamped by the engine, only missing or
//! non-integer values are rejected.

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use std::collections::HashMap;

use super::OkResponse;
use crate::control::Command;
use crate::error::{Error, Result};
use crate::playback::{LoadedItem, PlaybackStatus};
use crate::AppState;

type Params = Query<HashMap<String, String>>;

/// Build player routes
pub fn player_routes() -> Router<AppState> {
    Router::new()
        .route("/api/player/status", get(status))
        // Transport
        .route("/api/player/play", post(play))
        .route("/api/player/pause", post(pause))
        .route("/api/player/toggle", post(toggle))
        // Navigation
        .route("/api/player/next", post(next))
        .route("/api/player/prev", post(prev))
        .route("/api/player/track", post(set_track))
        // Time control
        .route("/api/player/seek", post(seek))
        .route("/api/player/skip", post(skip))
        // Volume
        .route("/api/player/volume", post(set_volume))
        .route("/api/player/mute", post(mute))
        .route("/api/player/unmute", post(unmute))
        .route("/api/player/mute/toggle", post(toggle_mute))
        // Item
        .route("/api/player/load", post(load))
}

/// Parse a required integer query parameter
fn int_param(params: &HashMap<String, String>, key: &str) -> Result<i64> {
    let raw = params
        .get(key)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::BadRequest(format!("missing query param: {}", key)))?;
    raw.parse::<i64>()
        .map_err(|_| Error::BadRequest(format!("invalid int for {}", key)))
}

fn run(state: &AppState, command: Command) -> Json<OkResponse> {
    state.control.apply(command);
    Json(OkResponse::ok())
}

/// GET /api/player/status
pub async fn status(State(state): State<AppState>) -> Json<PlaybackStatus> {
    Json(state.control.status())
}

/// POST /api/player/play
pub async fn play(State(state): State<AppState>) -> Json<OkResponse> {
    run(&state, Command::Play)
}

/// POST /api/player/pause
pub async fn pause(State(state): State<AppState>) -> Json<OkResponse> {
    run(&state, Command::Pause)
}

/// POST /api/player/toggle
pub async fn toggle(State(state): State<AppState>) -> Json<OkResponse> {
    run(&state, Command::Toggle)
}

/// POST /api/player/next
pub async fn next(State(state): State<AppState>) -> Json<OkResponse> {
    run(&state, Command::Next)
}

/// POST /api/player/prev
pub async fn prev(State(state): State<AppState>) -> Json<OkResponse> {
    run(&state, Command::Prev)
}

/// POST /api/player/track?nr=N (1-based)
pub async fn set_track(State(state): State<AppState>, Query(params): Params) -> Result<Json<OkResponse>> {
    let nr = int_param(&params, "nr")?;
    Ok(run(&state, Command::SetTrack(nr)))
}

/// POST /api/player/seek?position=N
pub async fn seek(State(state): State<AppState>, Query(params): Params) -> Result<Json<OkResponse>> {
    let position = int_param(&params, "position")?;
    Ok(run(&state, Command::Seek(position)))
}

/// POST /api/player/skip?seconds=N
pub async fn skip(State(state): State<AppState>, Query(params): Params) -> Result<Json<OkResponse>> {
    let seconds = int_param(&params, "seconds")?;
    Ok(run(&state, Command::Skip(seconds)))
}

/// POST /api/player/volume?level=N
pub async fn set_volume(State(state): State<AppState>, Query(params): Params) -> Result<Json<OkResponse>> {
    let level = int_param(&params, "level")?;
    Ok(run(&state, Command::SetVolume(level)))
}

/// POST /api/player/mute
pub async fn mute(State(state): State<AppState>) -> Json<OkResponse> {
    run(&state, Command::Mute)
}

/// POST /api/player/unmute
pub async fn unmute(State(state): State<AppState>) -> Json<OkResponse> {
    run(&state, Command::Unmute)
}

/// POST /api/player/mute/toggle
pub async fn toggle_mute(State(state): State<AppState>) -> Json<OkResponse> {
    run(&state, Command::ToggleMute)
}

/// POST /api/player/load - Replace the loaded item
pub async fn load(State(state): State<AppState>, Json(item): Json<LoadedItem>) -> Json<PlaybackStatus> {
    tracing::info!("Loading '{}' ({} tracks)", item.title, item.track_count());
    Json(state.control.load(item))
}
