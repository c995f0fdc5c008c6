//! Playback engine
//!
//! Simulated transport for one loaded playable item. The engine owns the
//! [`PlaybackStatus`] and the per-track duration table behind a single mutex.
//! Every operation, including the clock tick, takes the lock for a bounded,
//! constant-time mutation and returns the resulting snapshot.
//!
//! No operation fails: out-of-range input is clamped or ignored so the
//! transport is always in a valid state.

use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

use super::state::{LoadedItem, PlaybackState, PlaybackStatus};

/// Seconds into a track after which "previous" restarts the current track
const PREV_RESTART_THRESHOLD: u32 = 3;

/// Status plus duration table, always mutated together
#[derive(Debug)]
struct Transport {
    status: PlaybackStatus,
    /// Index = track - 1
    track_durations: Vec<u32>,
}

impl Transport {
    fn new(item: LoadedItem, volume: u8) -> Self {
        let mut transport = Self {
            status: PlaybackStatus {
                state: PlaybackState::Paused,
                mode: item.mode,
                series: String::new(),
                title: String::new(),
                track: 1,
                track_count: 0,
                position: 0,
                duration: 0,
                cover: String::new(),
                volume: volume.min(100),
                muted: false,
                can_seek: false,
                can_skip_track: false,
                can_skip_time: false,
            },
            track_durations: Vec::new(),
        };
        transport.load(item);
        transport
    }

    /// Duration of the current track
    ///
    /// Table entry for the track when present and positive, otherwise the
    /// status' own `duration`. Without a track list only the latter is used.
    fn current_duration(&self) -> u32 {
        if self.status.track_count == 0 {
            return self.status.duration;
        }
        let idx = self.status.track.saturating_sub(1) as usize;
        match self.track_durations.get(idx) {
            Some(&d) if d > 0 => d,
            _ => self.status.duration,
        }
    }

    fn refresh_duration(&mut self) {
        self.status.duration = self.current_duration();
    }

    fn snapshot(&mut self) -> PlaybackStatus {
        self.refresh_duration();
        self.status.clone()
    }

    fn load(&mut self, item: LoadedItem) {
        let track_count = item.track_count();

        self.status.mode = item.mode;
        self.status.series = item.series;
        self.status.title = item.title;
        self.status.cover = item.cover;
        self.status.track_count = track_count;
        self.status.track = if track_count > 0 {
            item.start_track.clamp(1, track_count)
        } else {
            1
        };
        self.status.duration = item.duration;
        self.status.can_seek = item.can_seek;
        self.status.can_skip_track = item.can_skip_track;
        self.status.can_skip_time = item.can_skip_time;
        self.status.state = PlaybackState::Paused;
        self.track_durations = item.track_durations;

        let duration = self.current_duration();
        self.status.position = item.start_position.min(duration);
        self.status.duration = duration;
    }

    fn play(&mut self) {
        if self.status.state == PlaybackState::Stopped {
            self.status.position = 0;
        }
        self.status.state = PlaybackState::Playing;
    }

    fn pause(&mut self) {
        if self.status.state == PlaybackState::Playing {
            self.status.state = PlaybackState::Paused;
        }
    }

    fn toggle(&mut self) {
        if self.status.state == PlaybackState::Playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Advance one track; shared by the manual command and the clock
    fn next(&mut self) {
        if self.status.track_count == 0 {
            self.status.state = PlaybackState::Stopped;
            self.status.position = 0;
            return;
        }

        self.status.track += 1;
        if self.status.track > self.status.track_count {
            // End of content: park on the last track, at its end
            self.status.track = self.status.track_count;
            self.status.state = PlaybackState::Paused;
            let duration = self.current_duration();
            self.status.position = duration;
            self.status.duration = duration;
            return;
        }

        self.status.position = 0;
        self.refresh_duration();
    }

    fn prev(&mut self) {
        if self.status.position > PREV_RESTART_THRESHOLD {
            self.status.position = 0;
            return;
        }
        if self.status.track_count == 0 {
            return;
        }

        self.status.track = self.status.track.saturating_sub(1).max(1);
        self.status.position = 0;
        self.refresh_duration();
    }

    fn set_track(&mut self, nr: i64) {
        if self.status.track_count == 0 {
            return;
        }
        self.status.track = clamp_to(nr, 1, self.status.track_count);
        self.status.position = 0;
        self.refresh_duration();
    }

    fn seek(&mut self, position: i64) {
        if !self.status.can_seek {
            return;
        }
        let duration = self.current_duration();
        self.status.position = clamp_to(position, 0, duration);
        self.status.duration = duration;
    }

    fn skip(&mut self, seconds: i64) {
        if !self.status.can_skip_time {
            return;
        }
        let duration = self.current_duration();
        let target = i64::from(self.status.position).saturating_add(seconds);
        self.status.position = clamp_to(target, 0, duration);
        self.status.duration = duration;
    }

    fn set_volume(&mut self, level: i64) {
        let level = clamp_to(level, 0, 100) as u8;
        self.status.volume = level;
        if level > 0 {
            self.status.muted = false;
        }
    }

    fn tick(&mut self) {
        if self.status.state != PlaybackState::Playing {
            return;
        }
        self.status.position = self.status.position.saturating_add(1);
        if self.status.position >= self.current_duration() {
            self.next();
        }
    }
}

fn clamp_to(value: i64, min: u32, max: u32) -> u32 {
    // Bounds fit in u32, so the clamped value does too
    value.clamp(i64::from(min), i64::from(max)) as u32
}

/// Thread-safe playback engine
///
/// Operations return the status snapshot taken under the same lock
/// acquisition as the mutation.
pub struct PlaybackEngine {
    transport: Mutex<Transport>,
}

impl PlaybackEngine {
    /// Create an engine with `item` loaded and paused at its start position
    pub fn new(item: LoadedItem, volume: u8) -> Self {
        info!(
            "Creating playback engine: '{}' ({} tracks)",
            item.title,
            item.track_count()
        );
        Self {
            transport: Mutex::new(Transport::new(item, volume)),
        }
    }

    /// Current status with `duration` refreshed for the current track
    pub fn status(&self) -> PlaybackStatus {
        self.lock().snapshot()
    }

    /// Replace the loaded item; volume and mute are kept
    pub fn load(&self, item: LoadedItem) -> PlaybackStatus {
        debug!("Loading '{}' ({} tracks)", item.title, item.track_count());
        self.apply(|t| t.load(item))
    }

    /// Start playback; restarts the track from 0 when stopped
    pub fn play(&self) -> PlaybackStatus {
        self.apply(Transport::play)
    }

    pub fn pause(&self) -> PlaybackStatus {
        self.apply(Transport::pause)
    }

    pub fn toggle(&self) -> PlaybackStatus {
        self.apply(Transport::toggle)
    }

    /// Next track; pauses at the end of the last track, stops without a track list
    pub fn next(&self) -> PlaybackStatus {
        self.apply(Transport::next)
    }

    /// Restart the current track if more than 3 s in, else go to the previous one
    pub fn prev(&self) -> PlaybackStatus {
        self.apply(Transport::prev)
    }

    /// Jump to 1-based track `nr`, clamped to the track list
    pub fn set_track(&self, nr: i64) -> PlaybackStatus {
        self.apply(|t| t.set_track(nr))
    }

    pub fn seek(&self, position: i64) -> PlaybackStatus {
        self.apply(|t| t.seek(position))
    }

    /// Move the position by `seconds` (negative rewinds)
    pub fn skip(&self, seconds: i64) -> PlaybackStatus {
        self.apply(|t| t.skip(seconds))
    }

    /// Set volume clamped to 0..=100; a positive level also unmutes
    pub fn set_volume(&self, level: i64) -> PlaybackStatus {
        self.apply(|t| t.set_volume(level))
    }

    pub fn mute(&self) -> PlaybackStatus {
        self.apply(|t| t.status.muted = true)
    }

    pub fn unmute(&self) -> PlaybackStatus {
        self.apply(|t| t.status.muted = false)
    }

    pub fn toggle_mute(&self) -> PlaybackStatus {
        self.apply(|t| t.status.muted = !t.status.muted)
    }

    /// One clock step: advance a playing position by one second and move to
    /// the next track when the current one is exhausted
    pub fn tick(&self) -> PlaybackStatus {
        self.apply(Transport::tick)
    }

    fn apply<F>(&self, f: F) -> PlaybackStatus
    where
        F: FnOnce(&mut Transport),
    {
        let mut transport = self.lock();
        f(&mut transport);
        transport.snapshot()
    }

    fn lock(&self) -> MutexGuard<'_, Transport> {
        // Every mutation leaves the transport valid, so a poisoned lock is safe to reuse
        self.transport.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for PlaybackEngine {
    fn default() -> Self {
        Self::new(LoadedItem::demo(), 40)
    }
}
