#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the evacuation simulation.
//!
//! The [`World`] exclusively owns the grid, the agent population and the
//! deterministic generator. Every mutation goes through [`apply`], which
//! executes one [`Command`] atomically and reports what happened as
//! [`Event`] values. Commands are only ever applied between ticks, so an
//! agent's per-tick transition never observes a half-applied hazard.

mod agents;
pub mod grid;
pub mod navigation;
pub mod rng;

use evacsim_core::{
    AgentId, CellCoord, CellRect, CellRectSize, Command, Event, RunState, SimulationStats,
    MAX_SPAWN_COUNT,
};
use tracing::{debug, info, warn};

use crate::{
    agents::{Agent, Outcome},
    grid::Grid,
    rng::SimRng,
};

const DEFAULT_GRID_COLUMNS: u32 = 40;
const DEFAULT_GRID_ROWS: u32 = 30;
const DEFAULT_SEED: u64 = 0x0e5c_a9e5_1d0c_ba5e;

/// Movement parameters shared by every agent.
#[derive(Clone, Debug, PartialEq)]
pub struct Tuning {
    /// Fraction of a cell covered per tick on dry ground.
    pub base_speed: f32,
    /// Speed multiplier applied while standing in a flooded cell.
    pub flood_modifier: f32,
    /// Speed multiplier applied while evacuating.
    pub panic_modifier: f32,
    /// Maximum number of positions kept in an agent's trail.
    pub trail_capacity: usize,
    /// Trail positions are sampled on ticks divisible by this value.
    pub trail_interval: u64,
    /// Radius of the visual wobble applied while moving, in cells.
    pub jitter_amplitude: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            base_speed: 0.05,
            flood_modifier: 0.5,
            panic_modifier: 1.5,
            trail_capacity: 20,
            trail_interval: 3,
            jitter_amplitude: 0.1,
        }
    }
}

/// Parameters fixed for the lifetime of a world until it is reconfigured.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Number of grid columns.
    pub columns: u32,
    /// Number of grid rows.
    pub rows: u32,
    /// Seed the deterministic generator restarts from on every reset.
    pub seed: u64,
    /// Agent movement parameters.
    pub tuning: Tuning,
    /// Footprint of a randomly placed fire.
    pub ignite_size: CellRectSize,
    /// Region designated as safe when evacuation is broadcast.
    pub safe_zone: CellRect,
}

impl Config {
    /// Creates a configuration with default tuning for the provided grid and seed.
    #[must_use]
    pub fn new(columns: u32, rows: u32, seed: u64) -> Self {
        Self {
            columns,
            rows,
            seed,
            ..Self::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            columns: DEFAULT_GRID_COLUMNS,
            rows: DEFAULT_GRID_ROWS,
            seed: DEFAULT_SEED,
            tuning: Tuning::default(),
            ignite_size: CellRectSize::new(3, 3),
            safe_zone: CellRect::from_origin_and_size(CellCoord::new(1, 1), CellRectSize::new(2, 2)),
        }
    }
}

/// Represents the authoritative simulation state.
#[derive(Debug)]
pub struct World {
    config: Config,
    grid: Grid,
    agents: Vec<Agent>,
    rng: SimRng,
    stats: SimulationStats,
    run_state: RunState,
    heatmap: bool,
    tick_index: u64,
    next_agent_id: u32,
}

impl World {
    /// Creates a world using the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an empty world with an all-clear grid.
    ///
    /// # Panics
    ///
    /// Panics when the configured grid has a zero dimension.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            grid: Grid::new(config.columns, config.rows),
            rng: SimRng::new(config.seed),
            config,
            agents: Vec::new(),
            stats: SimulationStats::default(),
            run_state: RunState::Running,
            heatmap: false,
            tick_index: 0,
            next_agent_id: 0,
        }
    }

    fn reset(&mut self) {
        self.grid = Grid::new(self.config.columns, self.config.rows);
        self.agents.clear();
        self.rng.seed(self.config.seed);
        self.stats = SimulationStats::default();
        self.tick_index = 0;
        self.next_agent_id = 0;
    }

    fn refresh_active(&mut self) {
        self.stats.active = self.agents.iter().filter(|agent| agent.is_active()).count() as u32;
    }

    fn tick(&mut self, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced {
            tick: self.tick_index,
        });

        for agent in self.agents.iter_mut().filter(|agent| agent.is_active()) {
            let outcome = agent.update(
                &self.grid,
                &mut self.rng,
                &self.config.tuning,
                self.tick_index,
            );
            match outcome {
                Some(Outcome::Died) => {
                    self.stats.casualties += 1;
                    out_events.push(Event::AgentDied {
                        agent: agent.id,
                        cell: agent.cell,
                    });
                }
                Some(Outcome::Evacuated) => {
                    self.stats.evacuated += 1;
                    out_events.push(Event::AgentEvacuated {
                        agent: agent.id,
                        cell: agent.cell,
                    });
                }
                None => {}
            }
        }

        self.refresh_active();
    }

    fn spawn_agents(&mut self, count: u32) -> u32 {
        let open: Vec<CellCoord> = self
            .grid
            .iter()
            .filter(|(_, cell)| !cell.is_wall())
            .map(|(coord, _)| coord)
            .collect();
        if open.is_empty() {
            return 0;
        }

        if count > MAX_SPAWN_COUNT {
            debug!(requested = count, limit = MAX_SPAWN_COUNT, "spawn request clamped");
        }
        let count = count.min(MAX_SPAWN_COUNT);
        let last = open.len() as u32 - 1;
        for _ in 0..count {
            let cell = open[self.rng.next_int(0, last) as usize];
            let id = AgentId::new(self.next_agent_id);
            self.next_agent_id += 1;
            self.agents.push(Agent::spawn(id, cell));
        }

        self.refresh_active();
        count
    }

    fn random_fire_region(&mut self) -> CellRect {
        let size = self.config.ignite_size;
        let max_column = self.grid.columns().saturating_sub(size.width());
        let max_row = self.grid.rows().saturating_sub(size.height());
        let origin = CellCoord::new(
            self.rng.next_int(0, max_column),
            self.rng.next_int(0, max_row),
        );
        CellRect::from_origin_and_size(origin, size)
    }

    fn flood_band(&self) -> CellRect {
        let top = self.grid.rows() / 2;
        CellRect::from_origin_and_size(
            CellCoord::new(0, top),
            CellRectSize::new(self.grid.columns(), self.grid.rows() - top),
        )
    }

    fn clip(&self, region: CellRect) -> Option<CellRect> {
        region.clipped_to(self.grid.columns(), self.grid.rows())
    }

    fn broadcast_evacuation(&mut self) -> u32 {
        let mut ordered = 0;
        for agent in self.agents.iter_mut().filter(|agent| agent.is_active()) {
            agent.begin_evacuation(&self.grid);
            ordered += 1;
        }
        ordered
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureGrid { columns, rows } => {
            if columns == 0 || rows == 0 {
                reject(
                    out_events,
                    format!("configure grid {columns}x{rows}"),
                    "grid dimensions must be non-zero",
                );
                return;
            }
            world.config.columns = columns;
            world.config.rows = rows;
            world.reset();
            debug!(columns, rows, "grid configured");
            out_events.push(Event::GridConfigured { columns, rows });
        }
        Command::Reset => {
            world.reset();
            debug!(seed = world.config.seed, "world reset");
            out_events.push(Event::GridConfigured {
                columns: world.config.columns,
                rows: world.config.rows,
            });
        }
        Command::Reseed { seed } => {
            world.config.seed = seed;
            world.reset();
            debug!(seed, "world reseeded");
            out_events.push(Event::GridConfigured {
                columns: world.config.columns,
                rows: world.config.rows,
            });
        }
        Command::Tick => {
            if world.run_state == RunState::Paused {
                return;
            }
            world.tick(out_events);
        }
        Command::SetRunState { state } => {
            if world.run_state != state {
                world.run_state = state;
                out_events.push(Event::RunStateChanged { state });
            }
        }
        Command::SpawnAgents { count } => {
            let count = world.spawn_agents(count);
            debug!(count, active = world.stats.active, "agents spawned");
            out_events.push(Event::AgentsSpawned { count });
        }
        Command::IgniteHazard => {
            let region = world.random_fire_region();
            ignite(world, region, out_events);
        }
        Command::IgniteRegion { region } => ignite(world, region, out_events),
        Command::FloodHazard => {
            let region = world.flood_band();
            flood(world, region, out_events);
        }
        Command::FloodRegion { region } => flood(world, region, out_events),
        Command::DesignateSafeZone { region } => designate_safe_zone(world, region, out_events),
        Command::BroadcastEvacuation => {
            let zone = world.config.safe_zone;
            designate_safe_zone(world, zone, out_events);
            let agents = world.broadcast_evacuation();
            info!(agents, "evacuation broadcast");
            out_events.push(Event::EvacuationBroadcast { agents });
        }
        Command::ClearHazards => {
            world.grid.clear_hazards();
            for agent in world.agents.iter_mut().filter(|agent| agent.is_active()) {
                agent.stand_down();
            }
            info!("hazards cleared");
            out_events.push(Event::HazardsCleared);
        }
        Command::ToggleWall { cell } => {
            if !world.grid.contains(cell) {
                reject(
                    out_events,
                    format!("toggle wall at {cell}"),
                    "cell lies outside the grid",
                );
                return;
            }
            let wall = world.grid.toggle_wall(cell);
            debug!(%cell, wall, "wall toggled");
            out_events.push(Event::WallToggled { cell, wall });
        }
        Command::ToggleHeatmap => {
            world.heatmap = !world.heatmap;
            out_events.push(Event::HeatmapToggled {
                enabled: world.heatmap,
            });
        }
    }
}

fn ignite(world: &mut World, region: CellRect, out_events: &mut Vec<Event>) {
    let Some(region) = world.clip(region) else {
        reject(out_events, format!("ignite {region}"), "region lies outside the grid");
        return;
    };
    world.grid.ignite(region);
    info!(%region, "fire ignited");
    out_events.push(Event::HazardIgnited { region });
}

fn flood(world: &mut World, region: CellRect, out_events: &mut Vec<Event>) {
    let Some(region) = world.clip(region) else {
        reject(out_events, format!("flood {region}"), "region lies outside the grid");
        return;
    };
    world.grid.flood(region);
    info!(%region, "area flooded");
    out_events.push(Event::AreaFlooded { region });
}

fn designate_safe_zone(world: &mut World, region: CellRect, out_events: &mut Vec<Event>) {
    let Some(region) = world.clip(region) else {
        reject(
            out_events,
            format!("safe zone {region}"),
            "region lies outside the grid",
        );
        return;
    };
    world.grid.set_safe_zone(region);
    debug!(%region, "safe zone designated");
    out_events.push(Event::SafeZoneDesignated { region });
}

fn reject(out_events: &mut Vec<Event>, input: String, reason: &str) {
    warn!(%input, reason, "command rejected");
    out_events.push(Event::CommandRejected {
        input,
        reason: reason.to_owned(),
    });
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::collections::VecDeque;

    use evacsim_core::{AgentId, AgentState, CellCoord, Motion, RunState, SimulationStats};
    use glam::Vec2;

    use super::{Config, Grid, World};

    /// Provides read-only access to the cell grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Configuration the world was built from, including the current seed.
    #[must_use]
    pub fn config(world: &World) -> &Config {
        &world.config
    }

    /// Current aggregate population counters.
    #[must_use]
    pub fn stats(world: &World) -> SimulationStats {
        world.stats
    }

    /// Number of ticks processed since the last reset.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Whether ticks are currently processed.
    #[must_use]
    pub fn run_state(world: &World) -> RunState {
        world.run_state
    }

    /// Whether the presentation layer should draw the density heatmap.
    #[must_use]
    pub fn heatmap_enabled(world: &World) -> bool {
        world.heatmap
    }

    /// Captures a read-only view of every agent, including terminal ones.
    #[must_use]
    pub fn agent_view(world: &World) -> AgentView {
        let snapshots = world
            .agents
            .iter()
            .map(|agent| AgentSnapshot {
                id: agent.id,
                cell: agent.cell,
                position: agent.position,
                motion: agent.motion,
                state: agent.state,
                speed: agent.speed,
                progress: agent.progress,
                path: agent.path.iter().copied().collect(),
                trail: agent.trail.clone(),
            })
            .collect();
        AgentView { snapshots }
    }

    /// Counts active agents per cell in row-major order.
    #[must_use]
    pub fn density(world: &World) -> Vec<u32> {
        let mut counts = vec![0; world.grid.len()];
        for agent in world.agents.iter().filter(|agent| agent.is_active()) {
            counts[world.grid.index(agent.cell)] += 1;
        }
        counts
    }

    /// Nearest active agent whose visual position lies within `radius` cells of `point`.
    #[must_use]
    pub fn agent_near(world: &World, point: Vec2, radius: f32) -> Option<AgentId> {
        world
            .agents
            .iter()
            .filter(|agent| agent.is_active())
            .map(|agent| (agent.id, agent.position.distance(point)))
            .filter(|(_, distance)| *distance <= radius)
            .min_by(|left, right| left.1.total_cmp(&right.1))
            .map(|(id, _)| id)
    }

    /// Read-only snapshot describing all agents in identifier order.
    #[derive(Clone, Debug)]
    pub struct AgentView {
        snapshots: Vec<AgentSnapshot>,
    }

    impl AgentView {
        /// Iterator over every captured agent.
        pub fn iter(&self) -> impl Iterator<Item = &AgentSnapshot> {
            self.snapshots.iter()
        }

        /// Iterator over agents that are neither dead nor evacuated.
        pub fn active(&self) -> impl Iterator<Item = &AgentSnapshot> {
            self.snapshots
                .iter()
                .filter(|snapshot| !snapshot.state.is_terminal())
        }

        /// Snapshot of the agent with the provided identifier, if present.
        #[must_use]
        pub fn get(&self, id: AgentId) -> Option<&AgentSnapshot> {
            self.snapshots.iter().find(|snapshot| snapshot.id == id)
        }

        /// Number of captured agents.
        #[must_use]
        pub fn len(&self) -> usize {
            self.snapshots.len()
        }

        /// Whether the view holds no agents.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.snapshots.is_empty()
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<AgentSnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single agent used for queries.
    #[derive(Clone, Debug, PartialEq)]
    pub struct AgentSnapshot {
        /// Unique identifier assigned to the agent.
        pub id: AgentId,
        /// Grid cell the agent logically occupies.
        pub cell: CellCoord,
        /// Interpolated visual position in cell units.
        pub position: Vec2,
        /// Current movement intent.
        pub motion: Motion,
        /// Lifecycle state.
        pub state: AgentState,
        /// Effective speed computed on the most recent tick.
        pub speed: f32,
        /// Interpolation progress toward the motion target, in `[0, 1)`.
        pub progress: f32,
        /// Pending waypoints, nearest first.
        pub path: Vec<CellCoord>,
        /// Recent visual positions, oldest first.
        pub trail: VecDeque<Vec2>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evacsim_core::{AgentState, Motion};

    fn world(columns: u32, rows: u32) -> World {
        World::with_config(Config::new(columns, rows, 0xfeed))
    }

    #[test]
    fn spawn_places_agents_on_open_cells() {
        let mut world = world(4, 4);
        let mut events = Vec::new();
        for row in 0..4 {
            for column in 0..3 {
                apply(
                    &mut world,
                    Command::ToggleWall {
                        cell: CellCoord::new(column, row),
                    },
                    &mut events,
                );
            }
        }

        apply(&mut world, Command::SpawnAgents { count: 6 }, &mut events);

        let view = query::agent_view(&world);
        assert_eq!(view.len(), 6);
        for agent in view.iter() {
            assert_eq!(agent.cell.column(), 3);
            assert_eq!(agent.state, AgentState::Idle);
            assert!(agent.path.is_empty());
        }
        assert_eq!(query::stats(&world).active, 6);
    }

    #[test]
    fn spawn_on_fully_walled_grid_places_nothing() {
        let mut world = world(1, 2);
        let mut events = Vec::new();
        apply(&mut world, Command::ToggleWall { cell: CellCoord::new(0, 0) }, &mut events);
        apply(&mut world, Command::ToggleWall { cell: CellCoord::new(0, 1) }, &mut events);
        events.clear();

        apply(&mut world, Command::SpawnAgents { count: 3 }, &mut events);

        assert_eq!(events, vec![Event::AgentsSpawned { count: 0 }]);
        assert!(query::agent_view(&world).is_empty());
    }

    #[test]
    fn agent_ids_are_sequential() {
        let mut world = world(6, 6);
        let mut events = Vec::new();
        apply(&mut world, Command::SpawnAgents { count: 2 }, &mut events);
        apply(&mut world, Command::SpawnAgents { count: 2 }, &mut events);

        let ids: Vec<u32> = query::agent_view(&world).iter().map(|agent| agent.id.get()).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn random_fire_stays_inside_grid() {
        let mut world = world(5, 4);
        let mut events = Vec::new();
        for _ in 0..32 {
            apply(&mut world, Command::IgniteHazard, &mut events);
        }
        for event in &events {
            match event {
                Event::HazardIgnited { region } => {
                    assert_eq!(region.size(), CellRectSize::new(3, 3));
                    assert!(region.origin().column() <= 2);
                    assert!(region.origin().row() <= 1);
                }
                other => panic!("unexpected event: {other:?}"),
            }
        }
    }

    #[test]
    fn random_fire_shrinks_on_small_grid() {
        let mut world = world(2, 2);
        let mut events = Vec::new();
        apply(&mut world, Command::IgniteHazard, &mut events);
        assert_eq!(
            events,
            vec![Event::HazardIgnited {
                region: CellRect::from_origin_and_size(
                    CellCoord::new(0, 0),
                    CellRectSize::new(2, 2)
                ),
            }]
        );
        assert!(query::grid(&world).cells().iter().all(|cell| cell.is_on_fire()));
    }

    #[test]
    fn flood_covers_lower_half() {
        let mut world = world(4, 5);
        let mut events = Vec::new();
        apply(&mut world, Command::FloodHazard, &mut events);

        for (coord, cell) in query::grid(&world).iter() {
            assert_eq!(cell.is_flooded(), coord.row() >= 2, "{coord}");
            assert!(!cell.is_on_fire());
        }
    }

    #[test]
    fn flood_does_not_extinguish_fire() {
        let mut world = world(4, 4);
        let mut events = Vec::new();
        let region = CellRect::from_origin_and_size(CellCoord::new(0, 3), CellRectSize::new(1, 1));
        apply(&mut world, Command::IgniteRegion { region }, &mut events);
        apply(&mut world, Command::FloodHazard, &mut events);

        let cell = query::grid(&world).cell(CellCoord::new(0, 3));
        assert!(cell.is_on_fire());
        assert!(cell.is_flooded());
    }

    #[test]
    fn out_of_grid_commands_are_rejected_without_mutation() {
        let mut world = world(3, 3);
        let mut events = Vec::new();
        let before = query::grid(&world).clone();

        apply(
            &mut world,
            Command::ToggleWall {
                cell: CellCoord::new(3, 0),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::IgniteRegion {
                region: CellRect::from_origin_and_size(
                    CellCoord::new(5, 5),
                    CellRectSize::new(1, 1),
                ),
            },
            &mut events,
        );
        apply(&mut world, Command::ConfigureGrid { columns: 0, rows: 3 }, &mut events);

        assert_eq!(events.len(), 3);
        assert!(events
            .iter()
            .all(|event| matches!(event, Event::CommandRejected { .. })));
        assert_eq!(query::grid(&world), &before);
    }

    #[test]
    fn paused_world_ignores_ticks() {
        let mut world = world(5, 5);
        let mut events = Vec::new();
        apply(&mut world, Command::SpawnAgents { count: 3 }, &mut events);
        apply(
            &mut world,
            Command::SetRunState {
                state: RunState::Paused,
            },
            &mut events,
        );
        let before = query::agent_view(&world).into_vec();
        events.clear();

        for _ in 0..10 {
            apply(&mut world, Command::Tick, &mut events);
        }

        assert!(events.is_empty());
        assert_eq!(query::tick_index(&world), 0);
        assert_eq!(query::agent_view(&world).into_vec(), before);

        apply(
            &mut world,
            Command::SetRunState {
                state: RunState::Running,
            },
            &mut events,
        );
        apply(&mut world, Command::Tick, &mut events);
        assert_eq!(query::tick_index(&world), 1);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut world = world(6, 6);
        let mut events = Vec::new();
        apply(&mut world, Command::SpawnAgents { count: 4 }, &mut events);
        apply(&mut world, Command::IgniteHazard, &mut events);
        apply(&mut world, Command::Tick, &mut events);

        apply(&mut world, Command::Reset, &mut events);

        assert!(query::agent_view(&world).is_empty());
        assert_eq!(query::stats(&world), SimulationStats::default());
        assert_eq!(query::tick_index(&world), 0);
        assert_eq!(query::grid(&world), &Grid::new(6, 6));
    }

    #[test]
    fn reseed_changes_spawn_layout_reproducibly() {
        let spawn_cells = |seed: u64| {
            let mut world = world(12, 12);
            let mut events = Vec::new();
            apply(&mut world, Command::Reseed { seed }, &mut events);
            apply(&mut world, Command::SpawnAgents { count: 8 }, &mut events);
            query::agent_view(&world)
                .iter()
                .map(|agent| agent.cell)
                .collect::<Vec<_>>()
        };

        assert_eq!(spawn_cells(11), spawn_cells(11));
        assert_ne!(spawn_cells(11), spawn_cells(12));
    }

    #[test]
    fn heatmap_toggle_flips_flag() {
        let mut world = world(3, 3);
        let mut events = Vec::new();
        apply(&mut world, Command::ToggleHeatmap, &mut events);
        apply(&mut world, Command::ToggleHeatmap, &mut events);
        assert_eq!(
            events,
            vec![
                Event::HeatmapToggled { enabled: true },
                Event::HeatmapToggled { enabled: false },
            ]
        );
        assert!(!query::heatmap_enabled(&world));
    }

    #[test]
    fn oversized_spawn_request_is_clamped() {
        let mut world = world(2, 2);
        let mut events = Vec::new();
        apply(&mut world, Command::SpawnAgents { count: u32::MAX }, &mut events);

        assert_eq!(
            events,
            vec![Event::AgentsSpawned {
                count: MAX_SPAWN_COUNT
            }]
        );
        assert_eq!(query::stats(&world).active, MAX_SPAWN_COUNT);
    }

    #[test]
    fn density_counts_active_agents_only() {
        let mut world = world(1, 1);
        let mut events = Vec::new();
        apply(&mut world, Command::SpawnAgents { count: 3 }, &mut events);
        assert_eq!(query::density(&world), vec![3]);

        let region = CellRect::from_origin_and_size(CellCoord::new(0, 0), CellRectSize::new(1, 1));
        apply(&mut world, Command::IgniteRegion { region }, &mut events);
        apply(&mut world, Command::Tick, &mut events);
        assert_eq!(query::density(&world), vec![0]);
        assert_eq!(query::stats(&world).casualties, 3);
    }

    #[test]
    fn agent_near_prefers_closest_active_agent() {
        let mut world = world(10, 1);
        world.agents.push(Agent::spawn(AgentId::new(0), CellCoord::new(2, 0)));
        world.agents.push(Agent::spawn(AgentId::new(1), CellCoord::new(4, 0)));
        world.agents[0].state = AgentState::Dead;
        world.refresh_active();

        let probe = glam::Vec2::new(2.4, 0.0);
        assert_eq!(query::agent_near(&world, probe, 2.0), Some(AgentId::new(1)));
        assert_eq!(query::agent_near(&world, probe, 1.0), None);
    }

    #[test]
    fn toggled_wall_does_not_invalidate_route_in_flight() {
        let mut config = Config::new(6, 1, 5);
        config.safe_zone =
            CellRect::from_origin_and_size(CellCoord::new(5, 0), CellRectSize::new(1, 1));
        let mut world = World::with_config(config);
        world.agents.push(Agent::spawn(AgentId::new(0), CellCoord::new(0, 0)));
        world.refresh_active();
        let mut events = Vec::new();

        apply(&mut world, Command::BroadcastEvacuation, &mut events);
        apply(
            &mut world,
            Command::ToggleWall {
                cell: CellCoord::new(3, 0),
            },
            &mut events,
        );

        for _ in 0..500 {
            apply(&mut world, Command::Tick, &mut events);
        }

        let agent = &query::agent_view(&world).into_vec()[0];
        assert_eq!(agent.state, AgentState::Evacuated);
        assert_eq!(agent.motion, Motion::Stationary);
    }
}
