//! Player control facade
//!
//! The operation surface request handling uses against the engine: a status
//! query plus the transport and volume commands. Each command is applied under
//! the engine lock and acknowledged with the snapshot taken in that same
//! critical section, so callers never observe a half-applied command or a
//! position beyond the track duration. Commands never wait for a clock tick.

use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::playback::{LoadedItem, PlaybackEngine, PlaybackStatus};

/// Transport and volume commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Play,
    Pause,
    Toggle,
    Next,
    Prev,
    /// 1-based track number
    SetTrack(i64),
    /// Absolute position in seconds
    Seek(i64),
    /// Relative move in seconds
    Skip(i64),
    /// Volume level 0-100
    SetVolume(i64),
    Mute,
    Unmute,
    ToggleMute,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Play => write!(f, "play"),
            Command::Pause => write!(f, "pause"),
            Command::Toggle => write!(f, "toggle"),
            Command::Next => write!(f, "next"),
            Command::Prev => write!(f, "prev"),
            Command::SetTrack(nr) => write!(f, "track {}", nr),
            Command::Seek(pos) => write!(f, "seek {}", pos),
            Command::Skip(secs) => write!(f, "skip {:+}", secs),
            Command::SetVolume(level) => write!(f, "volume {}", level),
            Command::Mute => write!(f, "mute"),
            Command::Unmute => write!(f, "unmute"),
            Command::ToggleMute => write!(f, "toggle mute"),
        }
    }
}

/// Cloneable handle over the shared engine
#[derive(Clone)]
pub struct PlayerControl {
    engine: Arc<PlaybackEngine>,
}

impl PlayerControl {
    pub fn new(engine: Arc<PlaybackEngine>) -> Self {
        Self { engine }
    }

    /// Shared engine, for wiring the clock
    pub fn engine(&self) -> &Arc<PlaybackEngine> {
        &self.engine
    }

    /// Full status snapshot
    pub fn status(&self) -> PlaybackStatus {
        self.engine.status()
    }

    /// Apply one command and return the resulting status
    pub fn apply(&self, command: Command) -> PlaybackStatus {
        let status = match command {
            Command::Play => self.engine.play(),
            Command::Pause => self.engine.pause(),
            Command::Toggle => self.engine.toggle(),
            Command::Next => self.engine.next(),
            Command::Prev => self.engine.prev(),
            Command::SetTrack(nr) => self.engine.set_track(nr),
            Command::Seek(pos) => self.engine.seek(pos),
            Command::Skip(secs) => self.engine.skip(secs),
            Command::SetVolume(level) => self.engine.set_volume(level),
            Command::Mute => self.engine.mute(),
            Command::Unmute => self.engine.unmute(),
            Command::ToggleMute => self.engine.toggle_mute(),
        };

        debug!(
            "Player command '{}' -> {} track {}/{} at {}/{}s",
            command, status.state, status.track, status.track_count, status.position, status.duration
        );

        status
    }

    /// Replace the loaded item
    pub fn load(&self, item: LoadedItem) -> PlaybackStatus {
        self.engine.load(item)
    }
}
