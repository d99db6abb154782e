#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wall-clock statistics system that samples evacuation progress.
//!
//! The world advances in discrete ticks whose rate depends on the host. This
//! system runs on real time instead: hosts report the duration that elapsed
//! between consecutive frames, and once per accumulated second the system
//! rotates the evacuation-history window and publishes a [`StatsSnapshot`].

use std::{collections::VecDeque, time::Duration};

use evacsim_core::{Event, SimulationStats, StatsSnapshot, HISTORY_WINDOW};
use tracing::trace;

const SAMPLE_PERIOD: Duration = Duration::from_secs(1);
const FRAME_RATE_PERIOD: Duration = Duration::from_millis(500);

/// Pure statistics system that maintains the rolling evacuation history.
#[derive(Debug)]
pub struct Analytics {
    history: VecDeque<u32>,
    since_sample: Duration,
    frame_rate: FrameRate,
    last_snapshot: Option<StatsSnapshot>,
}

impl Analytics {
    /// Creates a system with a zero-filled history window.
    #[must_use]
    pub fn new() -> Self {
        Self {
            history: std::iter::repeat(0).take(HISTORY_WINDOW).collect(),
            since_sample: Duration::ZERO,
            frame_rate: FrameRate::default(),
            last_snapshot: None,
        }
    }

    /// Returns the last snapshot published by the system, if any.
    #[must_use]
    pub fn last_snapshot(&self) -> Option<&StatsSnapshot> {
        self.last_snapshot.as_ref()
    }

    /// Evacuated totals sampled once per second, oldest first.
    pub fn history(&self) -> impl Iterator<Item = u32> + '_ {
        self.history.iter().copied()
    }

    /// Most recent frame-rate estimate.
    #[must_use]
    pub fn frames_per_second(&self) -> f32 {
        self.frame_rate.estimate
    }

    /// Consumes one frame's events and the wall-clock time since the previous frame.
    ///
    /// `stats` carries the world's counters after the frame's tick. A
    /// [`Event::StatsPublished`] is pushed to `out` whenever at least one full
    /// sample period has accumulated. A world reset, observed as
    /// [`Event::GridConfigured`], clears the history.
    pub fn handle(
        &mut self,
        events: &[Event],
        elapsed: Duration,
        stats: SimulationStats,
        out: &mut Vec<Event>,
    ) {
        if events
            .iter()
            .any(|event| matches!(event, Event::GridConfigured { .. }))
        {
            self.history.iter_mut().for_each(|sample| *sample = 0);
            self.since_sample = Duration::ZERO;
        }

        self.frame_rate.record(elapsed);

        self.since_sample = self.since_sample.saturating_add(elapsed);
        let mut rotated = false;
        while self.since_sample >= SAMPLE_PERIOD {
            self.since_sample -= SAMPLE_PERIOD;
            let _ = self.history.pop_front();
            self.history.push_back(stats.evacuated);
            rotated = true;
        }

        if !rotated {
            return;
        }

        let snapshot = StatsSnapshot {
            stats,
            history: self.history.iter().copied().collect(),
            frames_per_second: self.frame_rate.estimate,
        };
        trace!(
            active = stats.active,
            evacuated = stats.evacuated,
            casualties = stats.casualties,
            "stats published"
        );
        self.last_snapshot = Some(snapshot.clone());
        out.push(Event::StatsPublished { snapshot });
    }
}

impl Default for Analytics {
    fn default() -> Self {
        Self::new()
    }
}

/// Frame counter that re-estimates the frame rate a couple of times per second.
#[derive(Debug, Default)]
struct FrameRate {
    frames: u32,
    elapsed: Duration,
    estimate: f32,
}

impl FrameRate {
    fn record(&mut self, elapsed: Duration) {
        self.frames += 1;
        self.elapsed = self.elapsed.saturating_add(elapsed);
        if self.elapsed >= FRAME_RATE_PERIOD {
            self.estimate = self.frames as f32 / self.elapsed.as_secs_f32();
            self.frames = 0;
            self.elapsed = Duration::ZERO;
        }
    }
}
