//! Catalog model and loader
//!
//! The catalog describes what the kiosk can browse: categories of items
//! (artists, playlists, podcasts, albums), each with one or more sources.
//! It is loaded once from JSON at startup and is read-only afterwards.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Catalog loading errors
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub display_name: String,
    /// artist, playlist, podcast, album
    #[serde(rename = "type")]
    pub kind: String,
    /// Whether the item offers "continue where you left off"
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub resume: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub play_behavior: Option<PlayBehavior>,
    #[serde(default)]
    pub sources: Vec<Source>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayBehavior {
    #[serde(default)]
    pub shuffle: bool,
    #[serde(default)]
    pub repeat: bool,
    /// "resume" or "beginning"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    /// amazon, spotify, local, rss
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub priority: i32,

    #[serde(rename = "artistId", default, skip_serializing_if = "Option::is_none")]
    pub artist_id: Option<String>,
    #[serde(rename = "artistUrl", default, skip_serializing_if = "Option::is_none")]
    pub artist_url: Option<String>,
    #[serde(rename = "playlistUrl", default, skip_serializing_if = "Option::is_none")]
    pub playlist_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Source {
    /// Whether the backend can currently play from this source type
    pub fn is_available(&self) -> bool {
        matches!(self.kind.as_str(), "amazon" | "spotify" | "rss" | "local")
    }
}

impl Catalog {
    /// Load and parse the catalog JSON at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&raw).map_err(|source| CatalogError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// First item with `id` across all categories
    pub fn find_item(&self, id: &str) -> Option<&Item> {
        self.categories
            .iter()
            .flat_map(|c| c.items.iter())
            .find(|item| item.id == id)
    }

    /// Total number of items
    pub fn item_count(&self) -> usize {
        self.categories.iter().map(|c| c.items.len()).sum()
    }
}

impl Item {
    /// Available source with the lowest priority value
    ///
    /// Sources sharing a priority keep their declaration order.
    pub fn resolve_source(&self) -> Option<&Source> {
        let mut candidates: Vec<&Source> = self.sources.iter().collect();
        candidates.sort_by_key(|s| s.priority);
        candidates.into_iter().find(|s| s.is_available())
    }

    /// Non-empty cover paths of the sources, in declaration order
    pub fn cover_paths(&self) -> impl Iterator<Item = &str> {
        self.sources
            .iter()
            .filter_map(|s| s.cover_path.as_deref())
            .filter(|p| !p.is_empty())
    }
}
