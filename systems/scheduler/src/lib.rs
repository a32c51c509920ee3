#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-cadence scheduler that turns frame time into logic ticks.
//!
//! Rendering may run faster than the simulation; the scheduler decides on
//! which frames a [`Command::Tick`] is issued and how far the renderer should
//! interpolate between the previous and current positions.

use std::time::Duration;

use log::debug;
use robotrain_core::{Command, Event};

const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_millis(100);
const DEFAULT_FRAMES_PER_SECOND: u32 = 30;

/// Configuration parameters required to construct the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    update_interval: Duration,
    frame_interval: Duration,
}

impl Config {
    /// Creates a configuration from explicit logic and frame intervals.
    #[must_use]
    pub const fn new(update_interval: Duration, frame_interval: Duration) -> Self {
        Self {
            update_interval,
            frame_interval,
        }
    }

    /// Creates a configuration from a logic interval and a frame rate.
    ///
    /// A frame rate of zero is treated as one frame per second.
    #[must_use]
    pub fn from_rates(update_interval: Duration, frames_per_second: u32) -> Self {
        let frames = frames_per_second.max(1);
        Self::new(update_interval, Duration::from_secs(1) / frames)
    }

    /// Time between two logic ticks.
    #[must_use]
    pub const fn update_interval(&self) -> Duration {
        self.update_interval
    }

    /// Time between two rendered frames.
    #[must_use]
    pub const fn frame_interval(&self) -> Duration {
        self.frame_interval
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_rates(DEFAULT_UPDATE_INTERVAL, DEFAULT_FRAMES_PER_SECOND)
    }
}

/// Pure system emitting at most one tick per frame while running.
#[derive(Debug)]
pub struct Scheduler {
    update_interval: Duration,
    since_update: Option<Duration>,
    running: bool,
}

impl Scheduler {
    /// Creates a stopped scheduler using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            update_interval: config.update_interval,
            since_update: None,
            running: false,
        }
    }

    /// Starts ticking. The first frame after starting ticks immediately.
    pub fn start(&mut self) {
        self.running = true;
        self.since_update = None;
    }

    /// Stops ticking until [`Scheduler::start`] is called again.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Reports whether frames currently produce ticks.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Advances the frame clock, pushing a tick when the logic interval elapsed.
    ///
    /// Time beyond the interval is discarded rather than carried over, so a
    /// long frame never yields a burst of ticks.
    pub fn handle(&mut self, frame_dt: Duration, out: &mut Vec<Command>) {
        if !self.running {
            return;
        }

        let elapsed = match self.since_update {
            None => {
                self.since_update = Some(Duration::ZERO);
                out.push(Command::Tick);
                return;
            }
            Some(elapsed) => elapsed.saturating_add(frame_dt),
        };

        if elapsed >= self.update_interval {
            self.since_update = Some(Duration::ZERO);
            out.push(Command::Tick);
        } else {
            self.since_update = Some(elapsed);
        }
    }

    /// Stops the scheduler once the level attempt ends.
    pub fn observe(&mut self, events: &[Event]) {
        let finished = events
            .iter()
            .any(|event| matches!(event, Event::GameOver { .. }));
        if finished && self.running {
            debug!("level finished, scheduler stopped");
            self.stop();
        }
    }

    /// Fraction of the logic interval elapsed since the last tick, in `0.0..=1.0`.
    #[must_use]
    pub fn interpolation(&self) -> f32 {
        let interval = self.update_interval.as_secs_f32();
        match self.since_update {
            Some(elapsed) if interval > 0.0 => (elapsed.as_secs_f32() / interval).min(1.0),
            _ => 0.0,
        }
    }
}
