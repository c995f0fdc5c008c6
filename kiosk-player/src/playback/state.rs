//! Playback status types

use serde::{Deserialize, Serialize};

/// Transport state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackState::Stopped => write!(f, "stopped"),
            PlaybackState::Playing => write!(f, "playing"),
            PlaybackState::Paused => write!(f, "paused"),
        }
    }
}

/// Kind of content loaded; informational only, transport logic ignores it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackMode {
    Music,
    AudiobookSingle,
    AudiobookChapters,
}

/// Snapshot of the player as reported to clients
///
/// Invariants, upheld by the engine after every operation:
/// - `position <= duration`
/// - `1 <= track <= track_count` whenever `track_count > 0`
/// - `volume <= 100`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackStatus {
    pub state: PlaybackState,
    pub mode: PlaybackMode,

    pub series: String,
    pub title: String,

    /// 1-based
    pub track: u32,
    /// 0 means a single continuous item without a track list
    pub track_count: u32,

    /// Seconds within the current track
    pub position: u32,
    /// Seconds of the current track
    pub duration: u32,

    pub cover: String,

    /// 0..=100
    pub volume: u8,
    /// Presentation flag, independent of `volume`
    pub muted: bool,

    pub can_seek: bool,
    pub can_skip_track: bool,
    pub can_skip_time: bool,
}

/// Description of a playable item handed to the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedItem {
    pub mode: PlaybackMode,
    #[serde(default)]
    pub series: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub cover: String,

    /// Per-track durations in seconds; the track count is its length
    #[serde(default)]
    pub track_durations: Vec<u32>,

    /// Duration used when the table has no usable entry
    #[serde(default)]
    pub duration: u32,

    #[serde(default = "enabled")]
    pub can_seek: bool,
    #[serde(default = "enabled")]
    pub can_skip_track: bool,
    #[serde(default = "enabled")]
    pub can_skip_time: bool,

    /// 1-based track to start at (clamped)
    #[serde(default = "first_track")]
    pub start_track: u32,
    /// Seconds into the start track (clamped)
    #[serde(default)]
    pub start_position: u32,
}

fn enabled() -> bool {
    true
}

fn first_track() -> u32 {
    1
}

pub const PLACEHOLDER_COVER: &str = "/covers/placeholder.png";

impl LoadedItem {
    /// Built-in demo audiobook: 20 chapters of 5:00, 5:10, 5:20, ...
    pub fn demo() -> Self {
        Self {
            mode: PlaybackMode::AudiobookChapters,
            series: "Benjamin the Elephant".to_string(),
            title: "Episode 12 - The Zoo Is on Fire".to_string(),
            cover: PLACEHOLDER_COVER.to_string(),
            track_durations: (0..20).map(|i| 300 + i * 10).collect(),
            duration: 420,
            can_seek: true,
            can_skip_track: true,
            can_skip_time: true,
            start_track: 1,
            start_position: 0,
        }
    }

    /// Number of tracks described by the duration table
    pub fn track_count(&self) -> u32 {
        u32::try_from(self.track_durations.len()).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_wire_names() {
        assert_eq!(serde_json::to_value(PlaybackState::Playing).unwrap(), "playing");
        assert_eq!(PlaybackState::Stopped.to_string(), "stopped");
        assert_eq!(
            serde_json::to_value(PlaybackMode::AudiobookChapters).unwrap(),
            "audiobook_chapters"
        );
    }

    #[test]
    fn test_demo_item() {
        let demo = LoadedItem::demo();
        assert_eq!(demo.track_count(), 20);
        assert_eq!(demo.track_durations[0], 300);
        assert_eq!(demo.track_durations[19], 490);
    }

    #[test]
    fn test_loaded_item_defaults_from_json() {
        let item: LoadedItem = serde_json::from_str(r#"{"mode": "music"}"#).unwrap();
        assert_eq!(item.mode, PlaybackMode::Music);
        assert_eq!(item.track_count(), 0);
        assert!(item.can_seek && item.can_skip_track && item.can_skip_time);
        assert_eq!(item.start_track, 1);
        assert_eq!(item.start_position, 0);
    }
}
