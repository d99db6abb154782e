#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the evacuation simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then reports [`Event`] values describing what
//! happened. Every event doubles as a user-facing notification through
//! [`Event::severity`] and [`Event::message`], so callers decide how and where
//! notifications are delivered.

use serde::{Deserialize, Serialize};

/// Number of evacuation samples retained by the rolling history window.
pub const HISTORY_WINDOW: usize = 60;

/// Largest number of agents a single spawn request may add.
pub const MAX_SPAWN_COUNT: u32 = 10_000;

/// Describes whether the simulation advances on tick requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunState {
    /// Ticks advance agents and hazards normally.
    Running,
    /// Ticks are ignored until the simulation is resumed.
    Paused,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Rebuilds the world with an all-clear grid of the provided dimensions.
    ConfigureGrid {
        /// Number of cell columns laid out in the grid.
        columns: u32,
        /// Number of cell rows laid out in the grid.
        rows: u32,
    },
    /// Discards all agents, hazards and counters and reseeds the generator.
    Reset,
    /// Replaces the simulation seed and performs a full reset.
    Reseed {
        /// Seed used by the deterministic generator after the reset.
        seed: u64,
    },
    /// Advances the simulation by a single discrete step.
    Tick,
    /// Pauses or resumes tick processing.
    SetRunState {
        /// State the simulation should enter.
        state: RunState,
    },
    /// Appends new idle agents at random passable cells.
    SpawnAgents {
        /// Number of agents to create.
        count: u32,
    },
    /// Sets fire to a randomly placed region using the configured footprint.
    IgniteHazard,
    /// Sets fire to the provided region.
    IgniteRegion {
        /// Cells that catch fire. Portions outside the grid are ignored.
        region: CellRect,
    },
    /// Floods the lower half of the grid.
    FloodHazard,
    /// Floods the provided region.
    FloodRegion {
        /// Cells that become flooded. Portions outside the grid are ignored.
        region: CellRect,
    },
    /// Marks the provided region as a safe zone without signalling evacuation.
    DesignateSafeZone {
        /// Cells that become safe. Portions outside the grid are ignored.
        region: CellRect,
    },
    /// Designates the configured safe zone and orders every active agent to evacuate.
    BroadcastEvacuation,
    /// Clears every fire, flood and safe-zone flag and stands agents down.
    ClearHazards,
    /// Flips the wall flag of a single cell.
    ToggleWall {
        /// Cell whose wall flag is flipped.
        cell: CellCoord,
    },
    /// Flips the presentation-only heatmap overlay flag.
    ToggleHeatmap,
}

/// Events reported by the world and systems after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation advanced by one tick.
    TimeAdvanced {
        /// Index of the tick that completed.
        tick: u64,
    },
    /// Confirms that the grid was rebuilt.
    GridConfigured {
        /// Number of columns in the rebuilt grid.
        columns: u32,
        /// Number of rows in the rebuilt grid.
        rows: u32,
    },
    /// Confirms that new agents joined the simulation.
    AgentsSpawned {
        /// Number of agents that were placed.
        count: u32,
    },
    /// Reports that a region caught fire.
    HazardIgnited {
        /// Cells that were set on fire.
        region: CellRect,
    },
    /// Reports that a region was flooded.
    AreaFlooded {
        /// Cells that were flooded.
        region: CellRect,
    },
    /// Confirms that a region was marked as a safe zone.
    SafeZoneDesignated {
        /// Cells that became safe.
        region: CellRect,
    },
    /// Confirms that the evacuation signal reached the population.
    EvacuationBroadcast {
        /// Number of agents that started evacuating.
        agents: u32,
    },
    /// Confirms that every hazard flag was cleared.
    HazardsCleared,
    /// Confirms that a cell's wall flag was flipped.
    WallToggled {
        /// Cell that was modified.
        cell: CellCoord,
        /// Wall flag after the toggle.
        wall: bool,
    },
    /// Announces the new state of the heatmap overlay.
    HeatmapToggled {
        /// Whether the overlay is now shown.
        enabled: bool,
    },
    /// Announces that the simulation was paused or resumed.
    RunStateChanged {
        /// State that became active.
        state: RunState,
    },
    /// Reports that an agent was caught by fire.
    AgentDied {
        /// Agent that died.
        agent: AgentId,
        /// Cell where the agent died.
        cell: CellCoord,
    },
    /// Reports that an agent reached a safe zone.
    AgentEvacuated {
        /// Agent that reached safety.
        agent: AgentId,
        /// Safe cell that the agent reached.
        cell: CellCoord,
    },
    /// Publishes the periodic aggregate statistics snapshot.
    StatsPublished {
        /// Snapshot captured at publication time.
        snapshot: StatsSnapshot,
    },
    /// Reports that a command was refused without mutating state.
    CommandRejected {
        /// Raw input or command description that was refused.
        input: String,
        /// Human readable reason for the refusal.
        reason: String,
    },
}

impl Event {
    /// Severity category used when presenting the event as a notification.
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::AgentDied { .. } => Severity::Critical,
            Self::AgentEvacuated { .. } => Severity::Success,
            Self::HazardIgnited { .. }
            | Self::AreaFlooded { .. }
            | Self::EvacuationBroadcast { .. }
            | Self::CommandRejected { .. } => Severity::Warning,
            _ => Severity::Info,
        }
    }

    /// Human readable notification text describing the event.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::TimeAdvanced { tick } => format!("tick {tick}"),
            Self::GridConfigured { columns, rows } => {
                format!("grid reset to {columns}x{rows}")
            }
            Self::AgentsSpawned { count } => format!("spawned {count} agents"),
            Self::HazardIgnited { region } => format!("fire broke out at {region}"),
            Self::AreaFlooded { region } => format!("flooding across {region}"),
            Self::SafeZoneDesignated { region } => format!("safe zone designated at {region}"),
            Self::EvacuationBroadcast { agents } => {
                format!("evacuation ordered for {agents} agents")
            }
            Self::HazardsCleared => "all hazards cleared".to_owned(),
            Self::WallToggled { cell, wall } => {
                if *wall {
                    format!("wall raised at {cell}")
                } else {
                    format!("wall removed at {cell}")
                }
            }
            Self::HeatmapToggled { enabled } => {
                if *enabled {
                    "heatmap shown".to_owned()
                } else {
                    "heatmap hidden".to_owned()
                }
            }
            Self::RunStateChanged { state } => match state {
                RunState::Running => "simulation resumed".to_owned(),
                RunState::Paused => "simulation paused".to_owned(),
            },
            Self::AgentDied { agent, cell } => {
                format!("agent #{} was caught by fire at {cell}", agent.get())
            }
            Self::AgentEvacuated { agent, cell } => {
                format!("agent #{} reached safety at {cell}", agent.get())
            }
            Self::StatsPublished { snapshot } => format!(
                "active {} / evacuated {} / casualties {}",
                snapshot.stats.active, snapshot.stats.evacuated, snapshot.stats.casualties
            ),
            Self::CommandRejected { input, reason } => format!("'{input}' rejected: {reason}"),
        }
    }
}

/// Severity category attached to notifications.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Routine status information.
    Info,
    /// Hazard triggers and refused commands.
    Warning,
    /// Agents reaching safety.
    Success,
    /// Loss of life.
    Critical,
}

/// Unique identifier assigned to an agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new agent identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Lifecycle of a single agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentState {
    /// No evacuation signalled; the agent wanders.
    Idle,
    /// Evacuation signalled; the agent paths toward a safe zone at panic speed.
    Evacuating,
    /// Terminal: the agent occupied a burning cell.
    Dead,
    /// Terminal: the agent occupied a safe-zone cell.
    Evacuated,
}

impl AgentState {
    /// Reports whether the state is permanent until a full reset.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Dead | Self::Evacuated)
    }
}

/// Movement intent of an agent between ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Motion {
    /// The agent holds its cell and decides on a new target next tick.
    Stationary,
    /// The agent is interpolating toward the provided neighbouring cell.
    MovingTo(CellCoord),
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }
}

impl std::fmt::Display for CellCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Axis-aligned rectangle expressed in cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    origin: CellCoord,
    size: CellRectSize,
}

impl CellRect {
    /// Constructs a rectangle from an origin cell and size.
    #[must_use]
    pub const fn from_origin_and_size(origin: CellCoord, size: CellRectSize) -> Self {
        Self { origin, size }
    }

    /// Upper-left cell that anchors the rectangle.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Dimensions of the rectangle measured in whole cells.
    #[must_use]
    pub const fn size(&self) -> CellRectSize {
        self.size
    }

    /// Reports whether the rectangle covers the provided cell.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        let column = u64::from(cell.column());
        let row = u64::from(cell.row());
        let left = u64::from(self.origin.column());
        let top = u64::from(self.origin.row());
        column >= left
            && row >= top
            && column < left + u64::from(self.size.width())
            && row < top + u64::from(self.size.height())
    }

    /// Restricts the rectangle to a grid of the provided dimensions.
    ///
    /// Returns `None` when no covered cell lies inside the grid.
    #[must_use]
    pub fn clipped_to(&self, columns: u32, rows: u32) -> Option<CellRect> {
        if self.origin.column() >= columns || self.origin.row() >= rows {
            return None;
        }

        let width = self
            .size
            .width()
            .min(columns - self.origin.column());
        let height = self.size.height().min(rows - self.origin.row());
        if width == 0 || height == 0 {
            return None;
        }

        Some(Self::from_origin_and_size(
            self.origin,
            CellRectSize::new(width, height),
        ))
    }

    /// Iterates over the covered cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let origin = self.origin;
        let size = self.size;
        (0..size.height()).flat_map(move |row| {
            (0..size.width()).map(move |column| {
                CellCoord::new(origin.column() + column, origin.row() + row)
            })
        })
    }
}

impl std::fmt::Display for CellRect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} spanning {}x{}",
            self.origin,
            self.size.width(),
            self.size.height()
        )
    }
}

/// Size of a [`CellRect`] measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRectSize {
    width: u32,
    height: u32,
}

impl CellRectSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width of the rectangle in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the rectangle in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

/// Aggregate population counters maintained by the world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SimulationStats {
    /// Agents that are neither dead nor evacuated.
    pub active: u32,
    /// Agents that died in fire.
    pub casualties: u32,
    /// Agents that reached a safe zone.
    pub evacuated: u32,
}

/// Immutable statistics snapshot published to presentation layers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Population counters at publication time.
    pub stats: SimulationStats,
    /// Evacuated totals sampled once per second, oldest first.
    pub history: Vec<u32>,
    /// Most recent frame-rate estimate in frames per second.
    pub frames_per_second: f32,
}

#[cfg(test)]
mod tests {
    use super::{
        AgentId, AgentState, CellCoord, CellRect, CellRectSize, Event, Severity, SimulationStats,
        StatsSnapshot,
    };

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn rect_cells_are_row_major() {
        let rect = CellRect::from_origin_and_size(CellCoord::new(2, 3), CellRectSize::new(2, 2));
        let cells: Vec<_> = rect.cells().collect();
        assert_eq!(
            cells,
            vec![
                CellCoord::new(2, 3),
                CellCoord::new(3, 3),
                CellCoord::new(2, 4),
                CellCoord::new(3, 4),
            ]
        );
        assert!(rect.contains(CellCoord::new(3, 4)));
        assert!(!rect.contains(CellCoord::new(4, 4)));
    }

    #[test]
    fn clipping_trims_to_grid_bounds() {
        let rect = CellRect::from_origin_and_size(CellCoord::new(8, 8), CellRectSize::new(3, 3));
        let clipped = rect.clipped_to(10, 9).expect("partially inside");
        assert_eq!(clipped.size(), CellRectSize::new(2, 1));

        let outside = CellRect::from_origin_and_size(CellCoord::new(10, 0), CellRectSize::new(1, 1));
        assert!(outside.clipped_to(10, 10).is_none());
    }

    #[test]
    fn terminal_states_are_dead_and_evacuated() {
        assert!(AgentState::Dead.is_terminal());
        assert!(AgentState::Evacuated.is_terminal());
        assert!(!AgentState::Idle.is_terminal());
        assert!(!AgentState::Evacuating.is_terminal());
    }

    #[test]
    fn notifications_carry_expected_severity() {
        let death = Event::AgentDied {
            agent: AgentId::new(3),
            cell: CellCoord::new(1, 2),
        };
        assert_eq!(death.severity(), Severity::Critical);
        assert_eq!(death.message(), "agent #3 was caught by fire at (1, 2)");

        let evacuated = Event::AgentEvacuated {
            agent: AgentId::new(4),
            cell: CellCoord::new(0, 0),
        };
        assert_eq!(evacuated.severity(), Severity::Success);

        let rejected = Event::CommandRejected {
            input: "dance".to_owned(),
            reason: "unknown command".to_owned(),
        };
        assert_eq!(rejected.severity(), Severity::Warning);
        assert_eq!(Event::HazardsCleared.severity(), Severity::Info);
    }

    #[test]
    fn stats_snapshot_survives_bincode() {
        let snapshot = StatsSnapshot {
            stats: SimulationStats {
                active: 7,
                casualties: 2,
                evacuated: 1,
            },
            history: vec![0, 0, 1],
            frames_per_second: 59.5,
        };
        let bytes = bincode::serialize(&snapshot).expect("serialize");
        let restored: StatsSnapshot = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, snapshot);
    }
}
