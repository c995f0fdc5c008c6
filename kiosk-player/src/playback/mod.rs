//! Playback engine, clock and status types

pub mod clock;
pub mod engine;
pub mod state;

pub use clock::{ClockHandle, DEFAULT_TICK_INTERVAL};
pub use engine::PlaybackEngine;
pub use state::{LoadedItem, PlaybackMode, PlaybackState, PlaybackStatus};
