//! Playback clock
//!
//! Background task that drives [`PlaybackEngine::tick`] once per period.
//! The task is owned by a [`ClockHandle`]; stopping the handle cancels the
//! timer and waits for the task to exit.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::engine::PlaybackEngine;

/// Default clock period: one real second per simulated second
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Handle to a running playback clock
pub struct ClockHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl ClockHandle {
    /// Spawn the clock on the current tokio runtime
    ///
    /// The first tick fires one full `period` after start. Ticks missed while
    /// the runtime was busy are skipped rather than replayed.
    pub fn spawn(engine: Arc<PlaybackEngine>, period: Duration) -> Self {
        let period = period.max(Duration::from_millis(1));
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        info!("Starting playback clock ({:?} per tick)", period);

        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        debug!("Playback clock cancelled");
                        break;
                    }
                    _ = ticker.tick() => {
                        engine.tick();
                    }
                }
            }
        });

        Self { cancel, task }
    }

    /// Whether the clock task is still running
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Token that stops the clock when cancelled
    ///
    /// Lets a shutdown path share cancellation with the clock.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancel the clock and wait for the task to finish
    ///
    /// No tick is applied after this returns.
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            warn!("Playback clock task ended abnormally: {}", e);
        }
        info!("Playback clock stopped");
    }
}
