//! Resume checkpoint store
//!
//! Durable map from an opaque key to a [`ResumeState`], persisted as a single
//! JSON object. The whole map is loaded once at startup and kept in memory;
//! every write re-serializes the complete map before returning.
//!
//! All operations are serialized behind one mutex, which is held across the
//! file write so that two concurrent `set` calls never interleave on disk.

use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Resume store errors
#[derive(Error, Debug)]
pub enum ResumeError {
    /// No checkpoint stored under the key
    #[error("No resume checkpoint for key '{0}'")]
    NotFound(String),

    /// Writing the backing file failed; the write may be retried
    #[error("Failed to persist resume state to {}: {source}", .path.display())]
    PersistFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The backing file exists but does not contain a valid checkpoint map
    #[error("Resume state file {} is corrupt: {source}", .path.display())]
    StartupCorruption {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The backing file exists but could not be read
    #[error("Failed to read resume state file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Serializing the checkpoint map failed
    #[error("Failed to encode resume state: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ResumeError {
    /// Whether repeating the failed operation may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, ResumeError::PersistFailure { .. })
    }
}

/// One resume checkpoint
///
/// `updated_at` is owned by the store: any value supplied by the caller is
/// replaced on [`ResumeStore::set`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeState {
    /// Catalog item (artist, playlist, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,

    /// Album or episode within the item
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_id: Option<String>,

    /// 0-based track index
    #[serde(default)]
    pub track_index: u32,

    /// Seconds into the track; only positive positions are listed as recent
    #[serde(default)]
    pub position_sec: i64,

    /// RFC 3339 timestamp of the last write
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl ResumeState {
    /// Parsed `updated_at`, or `None` when missing or unparsable
    pub fn updated_at_time(&self) -> Option<DateTime<Utc>> {
        self.updated_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&Utc))
    }
}

/// A keyed checkpoint, as returned by [`ResumeStore::list_recent`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResumeEntry {
    pub key: String,
    pub state: ResumeState,
}

struct StoreInner {
    entries: BTreeMap<String, ResumeState>,
    /// Most recent stamp issued or loaded, keeps `updated_at` strictly increasing
    last_stamp: Option<DateTime<Utc>>,
}

impl StoreInner {
    fn next_stamp(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let now = now.trunc_subsecs(6);
        match self.last_stamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        }
    }
}

/// File-backed resume checkpoint store
pub struct ResumeStore {
    path: PathBuf,
    inner: Mutex<StoreInner>,
}

impl ResumeStore {
    /// Open the store backed by `path`
    ///
    /// A missing file is created (with missing parent directories) holding an
    /// empty map. An existing file that does not parse is reported as
    /// [`ResumeError::StartupCorruption`]; the store never starts empty over it.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ResumeError> {
        let path = path.into();

        let entries: BTreeMap<String, ResumeState> = match fs::read(&path) {
            Ok(raw) => serde_json::from_slice(&raw).map_err(|source| {
                ResumeError::StartupCorruption {
                    path: path.clone(),
                    source,
                }
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let entries = BTreeMap::new();
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent).map_err(|source| ResumeError::PersistFailure {
                        path: path.clone(),
                        source,
                    })?;
                }
                persist(&path, &entries)?;
                info!("Created empty resume state file at {}", path.display());
                entries
            }
            Err(source) => return Err(ResumeError::Read { path, source }),
        };

        let last_stamp = entries.values().filter_map(ResumeState::updated_at_time).max();

        debug!("Loaded {} resume checkpoints from {}", entries.len(), path.display());

        Ok(Self {
            path,
            inner: Mutex::new(StoreInner {
                entries,
                last_stamp,
            }),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of stored checkpoints
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Exact lookup
    pub fn get(&self, key: &str) -> Option<ResumeState> {
        self.lock().entries.get(key).cloned()
    }

    /// Exact lookup, reporting a missing key as [`ResumeError::NotFound`]
    pub fn require(&self, key: &str) -> Result<ResumeState, ResumeError> {
        self.get(key)
            .ok_or_else(|| ResumeError::NotFound(key.to_string()))
    }

    /// Store `state` under `key` and persist the whole map
    ///
    /// Stamps `updated_at` with the current time. If the file write fails the
    /// in-memory map is restored to its previous content for `key`, so memory
    /// and disk never disagree after an error.
    ///
    /// Returns the state as stored (with its stamp).
    pub fn set(&self, key: &str, mut state: ResumeState) -> Result<ResumeState, ResumeError> {
        let mut inner = self.lock();

        let stamp = inner.next_stamp(Utc::now());
        state.updated_at = Some(stamp.to_rfc3339_opts(SecondsFormat::Micros, true));

        let previous = inner.entries.insert(key.to_string(), state.clone());

        if let Err(e) = persist(&self.path, &inner.entries) {
            match previous {
                Some(previous) => {
                    inner.entries.insert(key.to_string(), previous);
                }
                None => {
                    inner.entries.remove(key);
                }
            }
            warn!("Resume checkpoint '{}' not saved: {}", key, e);
            return Err(e);
        }

        inner.last_stamp = Some(stamp);
        debug!(
            "Saved resume checkpoint '{}' at {}s (track index {})",
            key, state.position_sec, state.track_index
        );

        Ok(state)
    }

    /// Checkpoints with a positive position, most recently updated first
    ///
    /// Entries without a parsable timestamp sort last; equal timestamps are
    /// ordered by key. A `limit` of 0 returns every matching entry.
    pub fn list_recent(&self, limit: usize) -> Vec<ResumeEntry> {
        let inner = self.lock();

        let mut ranked: Vec<(Option<DateTime<Utc>>, ResumeEntry)> = inner
            .entries
            .iter()
            .filter(|(_, state)| state.position_sec > 0)
            .map(|(key, state)| {
                (
                    state.updated_at_time(),
                    ResumeEntry {
                        key: key.clone(),
                        state: state.clone(),
                    },
                )
            })
            .collect();

        ranked.sort_by(|(ta, a), (tb, b)| tb.cmp(ta).then_with(|| a.key.cmp(&b.key)));

        let mut out: Vec<ResumeEntry> = ranked.into_iter().map(|(_, entry)| entry).collect();
        if limit > 0 {
            out.truncate(limit);
        }
        out
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn persist(path: &Path, entries: &BTreeMap<String, ResumeState>) -> Result<(), ResumeError> {
    let raw = serde_json::to_vec_pretty(entries)?;
    write_atomically(path, &raw).map_err(|source| ResumeError::PersistFailure {
        path: path.to_path_buf(),
        source,
    })
}

/// Write through a sibling temp file and rename over the target
///
/// The temp file is removed when any step after its creation fails.
fn write_atomically(path: &Path, contents: &[u8]) -> io::Result<()> {
    let tmp = tmp_path(path);
    let mut file = fs::File::create(&tmp)?;

    let written = (|| {
        file.write_all(contents)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp, path)
    })();

    if written.is_err() {
        if let Err(e) = fs::remove_file(&tmp) {
            warn!("Could not remove temp file {}: {}", tmp.display(), e);
        }
    }
    written
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
