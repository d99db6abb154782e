#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame driver that sequences commands, world ticks and statistics.
//!
//! Hosts call [`Driver::frame`] once per presented frame. Commands submitted
//! between frames are held back and applied at the start of the next frame,
//! so every command observes the world at a tick boundary.

use std::{collections::VecDeque, time::Duration};

use evacsim_core::{Command, Event};
use evacsim_system_analytics::Analytics;
use evacsim_system_dispatch::Dispatch;
use evacsim_world::{self as world, query, Config, World};
use tracing::trace;

/// Owns the world together with the systems that observe it.
#[derive(Debug)]
pub struct Driver {
    world: World,
    analytics: Analytics,
    dispatch: Dispatch,
    pending: VecDeque<Command>,
}

impl Driver {
    /// Creates a driver around a freshly configured world.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_dispatch(config, Dispatch::default())
    }

    /// Creates a driver that translates text input with the provided dispatcher.
    #[must_use]
    pub fn with_dispatch(config: Config, dispatch: Dispatch) -> Self {
        Self {
            world: World::with_config(config),
            analytics: Analytics::new(),
            dispatch,
            pending: VecDeque::new(),
        }
    }

    /// Queues a command for the next tick boundary.
    pub fn submit(&mut self, command: Command) {
        self.pending.push_back(command);
    }

    /// Translates a line of operator input and queues the resulting command.
    ///
    /// Unrecognised input is reported through `out` immediately and queues nothing.
    pub fn submit_line(&mut self, line: &str, out: &mut Vec<Event>) {
        let mut commands = Vec::with_capacity(1);
        self.dispatch.handle(line, &mut commands, out);
        self.pending.extend(commands);
    }

    /// Number of commands waiting for the next frame.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Runs one frame: queued commands, a single tick, then statistics.
    ///
    /// `elapsed` is the wall-clock time since the previous frame. Every event
    /// produced during the frame, including published statistics, is appended
    /// to `out`.
    pub fn frame(&mut self, elapsed: Duration, out: &mut Vec<Event>) {
        let start = out.len();

        while let Some(command) = self.pending.pop_front() {
            world::apply(&mut self.world, command, out);
        }
        world::apply(&mut self.world, Command::Tick, out);

        let stats = query::stats(&self.world);
        let mut published = Vec::new();
        self.analytics
            .handle(&out[start..], elapsed, stats, &mut published);
        trace!(
            tick = query::tick_index(&self.world),
            events = out.len() - start,
            published = published.len(),
            "frame complete"
        );
        out.append(&mut published);
    }

    /// Read-only access to the simulated world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Read-only access to the statistics system.
    #[must_use]
    pub fn analytics(&self) -> &Analytics {
        &self.analytics
    }
}

impl Default for Driver {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
