#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command vocabulary that turns operator input into world commands.
//!
//! The vocabulary is small and fixed: `ignite`, `flood`, `evacuate`, `clear`,
//! `spawn [count]`, `heatmap`, `wall <column> <row>`, `pause`, `resume`,
//! `reset` and `seed <value>`. Keywords are case-insensitive. Unknown input is
//! reported as a [`Event::CommandRejected`] and never reaches the world.

use evacsim_core::{CellCoord, Command, Event, RunState, MAX_SPAWN_COUNT};
use thiserror::Error;
use tracing::{debug, warn};

/// Number of agents spawned when `spawn` carries no usable count.
pub const DEFAULT_SPAWN_COUNT: u32 = 10;

/// Reasons a line of input could not be turned into a command.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// The input contained only whitespace.
    #[error("empty command")]
    Empty,
    /// The leading keyword is not part of the vocabulary.
    #[error("unknown command '{0}'")]
    Unknown(String),
    /// A required argument was missing.
    #[error("'{command}' expects {expected}")]
    MissingArgument {
        /// Keyword that lacked the argument.
        command: &'static str,
        /// Description of the expected arguments.
        expected: &'static str,
    },
    /// An argument could not be parsed.
    #[error("invalid {what} '{value}'")]
    InvalidArgument {
        /// Name of the argument that failed to parse.
        what: &'static str,
        /// Raw argument text.
        value: String,
    },
}

/// Parses a single line of input into a command.
///
/// `spawn` falls back to `default_spawn` when its count is missing, malformed
/// or above [`MAX_SPAWN_COUNT`].
pub fn parse(line: &str, default_spawn: u32) -> Result<Command, DispatchError> {
    let mut words = line.split_whitespace();
    let Some(keyword) = words.next() else {
        return Err(DispatchError::Empty);
    };

    let command = match keyword.to_ascii_lowercase().as_str() {
        "ignite" | "fire" => Command::IgniteHazard,
        "flood" => Command::FloodHazard,
        "evacuate" | "evac" => Command::BroadcastEvacuation,
        "clear" => Command::ClearHazards,
        "heatmap" => Command::ToggleHeatmap,
        "pause" => Command::SetRunState {
            state: RunState::Paused,
        },
        "resume" => Command::SetRunState {
            state: RunState::Running,
        },
        "reset" => Command::Reset,
        "spawn" => {
            let count = match words.next() {
                Some(raw) => match raw.parse::<u32>() {
                    Ok(count) if count <= MAX_SPAWN_COUNT => count,
                    _ => {
                        debug!(raw, default_spawn, "malformed spawn count, using default");
                        default_spawn
                    }
                },
                None => default_spawn,
            };
            Command::SpawnAgents { count }
        }
        "wall" => {
            let (Some(column), Some(row)) = (words.next(), words.next()) else {
                return Err(DispatchError::MissingArgument {
                    command: "wall",
                    expected: "<column> <row>",
                });
            };
            Command::ToggleWall {
                cell: CellCoord::new(coordinate(column)?, coordinate(row)?),
            }
        }
        "seed" => {
            let Some(raw) = words.next() else {
                return Err(DispatchError::MissingArgument {
                    command: "seed",
                    expected: "<value>",
                });
            };
            let seed = raw
                .parse::<u64>()
                .map_err(|_| DispatchError::InvalidArgument {
                    what: "seed",
                    value: raw.to_owned(),
                })?;
            Command::Reseed { seed }
        }
        _ => return Err(DispatchError::Unknown(keyword.to_owned())),
    };

    Ok(command)
}

fn coordinate(raw: &str) -> Result<u32, DispatchError> {
    raw.parse::<u32>()
        .map_err(|_| DispatchError::InvalidArgument {
            what: "coordinate",
            value: raw.to_owned(),
        })
}

/// Pure system that routes operator input to the command queue.
#[derive(Clone, Copy, Debug)]
pub struct Dispatch {
    default_spawn: u32,
}

impl Dispatch {
    /// Creates a dispatcher that spawns `default_spawn` agents for a bare `spawn`.
    #[must_use]
    pub const fn new(default_spawn: u32) -> Self {
        Self { default_spawn }
    }

    /// Translates a line of input.
    ///
    /// Recognised input appends one command to `commands`. Anything else
    /// appends a [`Event::CommandRejected`] to `events` and leaves `commands`
    /// untouched.
    pub fn handle(&self, line: &str, commands: &mut Vec<Command>, events: &mut Vec<Event>) {
        match parse(line, self.default_spawn) {
            Ok(command) => {
                debug!(?command, "command accepted");
                commands.push(command);
            }
            Err(error) => {
                warn!(input = line.trim(), %error, "command rejected");
                events.push(Event::CommandRejected {
                    input: line.trim().to_owned(),
                    reason: error.to_string(),
                });
            }
        }
    }
}

impl Default for Dispatch {
    fn default() -> Self {
        Self::new(DEFAULT_SPAWN_COUNT)
    }
}
