//! Real-time driver: feeds a round session from a fixed-rate wall-clock interval

use std::future::Future;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::util::time::{frame_interval, Timer};

use super::ai::RandomSource;
use super::round::{RoundObserver, RoundOutcome, RoundPhase, RoundSession};
use super::snapshot::SnapshotBuilder;

/// Drives one round at a fixed frame rate until it ends or is cancelled
pub struct RoundRunner {
    fps: u32,
    snapshot_every: u32,
}

impl RoundRunner {
    pub fn new(fps: u32, snapshot_every: u32) -> Self {
        Self {
            fps,
            snapshot_every,
        }
    }

    /// Run the frame loop. Returns the outcome, or `None` if `shutdown` fired first
    /// (the session is left stopped after its last completed frame) or the session
    /// had already ended and needs a reset.
    pub async fn run<R, O, F>(
        &self,
        session: &mut RoundSession<R>,
        observer: &mut O,
        shutdown: F,
    ) -> Option<RoundOutcome>
    where
        R: RandomSource,
        O: RoundObserver + ?Sized,
        F: Future<Output = ()>,
    {
        let mut ticker = interval(frame_interval(self.fps));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut snapshots = SnapshotBuilder::new(self.snapshot_every);
        let clock = Timer::new();

        tokio::pin!(shutdown);
        session.start(clock.elapsed_ms());
        if session.phase() != RoundPhase::Running {
            warn!(round_id = %session.id(), "Round already over; reset it before running");
            return None;
        }
        info!(round_id = %session.id(), fps = self.fps, "Frame loop started");

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    session.stop();
                    info!(round_id = %session.id(), "Frame loop cancelled");
                    return None;
                }
                _ = ticker.tick() => {}
            }

            let result = session.frame(clock.elapsed_ms());
            result.notify(observer);

            if result.outcome().is_some() {
                snapshots.force_next();
            }
            if snapshots.should_send() {
                let snapshot = snapshots.build(
                    session.frame_index(),
                    session.seconds_left(),
                    session.actors(),
                );
                match serde_json::to_string(&snapshot) {
                    Ok(json) => debug!(round_id = %session.id(), snapshot = %json, "Frame snapshot"),
                    Err(err) => debug!(error = %err, "Snapshot serialization failed"),
                }
            }

            if let Some(outcome) = result.outcome() {
                return Some(outcome.clone());
            }
        }
    }
}

/// Observer that reports the round through `tracing`
#[derive(Debug, Default)]
pub struct TracingObserver {
    last_hp: Option<(f32, f32)>,
    last_seconds: Option<u32>,
}

impl RoundObserver for TracingObserver {
    fn on_frame(&mut self, hp1: f32, hp2: f32, seconds_left: u32) {
        if self.last_hp != Some((hp1, hp2)) {
            info!(hp_left = hp1, hp_right = hp2, "HP changed");
            self.last_hp = Some((hp1, hp2));
        }
        if self.last_seconds != Some(seconds_left) {
            debug!(seconds_left, "Clock");
            self.last_seconds = Some(seconds_left);
        }
    }

    fn on_round_end(&mut self, label: &str) {
        info!(outcome = %label, "Round over");
    }
}
