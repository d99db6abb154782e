#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared presentation contracts for evacuation simulation adapters.
//!
//! Adapters draw a [`Scene`] captured from the world and translate pointer
//! input through a [`Viewport`]. Agent positions are expressed in cell space,
//! where the centre of cell `(c, r)` sits at `Vec2(c, r)`.

use std::{collections::VecDeque, fmt};

use evacsim_core::{AgentId, AgentState, CellCoord, Command, SimulationStats, StatsSnapshot};
use evacsim_world::{grid::Cell, query, World};
use glam::Vec2;

/// Pick radius used by pointer queries, in cells.
pub const AGENT_PICK_RADIUS: f32 = 0.5;

/// Maps pixels on a drawing surface onto grid cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    columns: u32,
    rows: u32,
    cell_size: f32,
}

impl Viewport {
    /// Fits a grid of `columns` x `rows` square cells into `available` pixels.
    ///
    /// The cell side is the largest whole number of pixels that keeps the grid
    /// inside the surface, and never smaller than one pixel.
    #[must_use]
    pub fn fit(available: Vec2, columns: u32, rows: u32) -> Self {
        let columns = columns.max(1);
        let rows = rows.max(1);
        let cell_size = (available.x / columns as f32)
            .min(available.y / rows as f32)
            .floor()
            .max(1.0);

        Self {
            columns,
            rows,
            cell_size,
        }
    }

    /// Recomputes the cell size after the drawing surface changed size.
    pub fn resize(&mut self, available: Vec2) {
        *self = Self::fit(available, self.columns, self.rows);
    }

    /// Side length of a single cell in pixels.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Pixel extent covered by the grid.
    #[must_use]
    pub fn extent(&self) -> Vec2 {
        Vec2::new(self.columns as f32, self.rows as f32) * self.cell_size
    }

    /// Cell under the provided pixel, if the pixel lies on the grid.
    #[must_use]
    pub fn cell_at(&self, pixel: Vec2) -> Option<CellCoord> {
        if !pixel.is_finite() || pixel.x < 0.0 || pixel.y < 0.0 {
            return None;
        }

        let column = (pixel.x / self.cell_size).floor() as u32;
        let row = (pixel.y / self.cell_size).floor() as u32;
        (column < self.columns && row < self.rows).then(|| CellCoord::new(column, row))
    }

    /// Converts a pixel into cell space.
    #[must_use]
    pub fn to_cell_space(&self, pixel: Vec2) -> Vec2 {
        pixel / self.cell_size - Vec2::splat(0.5)
    }

    /// Converts a cell-space position into pixels.
    #[must_use]
    pub fn to_pixels(&self, cell_space: Vec2) -> Vec2 {
        (cell_space + Vec2::splat(0.5)) * self.cell_size
    }

    /// Active agent drawn under the provided pixel.
    #[must_use]
    pub fn agent_at(&self, world: &World, pixel: Vec2) -> Option<AgentId> {
        query::agent_near(world, self.to_cell_space(pixel), AGENT_PICK_RADIUS)
    }

    /// Command that toggles the wall under the provided pixel.
    #[must_use]
    pub fn toggle_wall_at(&self, pixel: Vec2) -> Option<Command> {
        self.cell_at(pixel).map(|cell| Command::ToggleWall { cell })
    }
}

/// Visible agent with its recent movement.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneAgent {
    /// Identifier of the agent.
    pub id: AgentId,
    /// Visual position in cell space.
    pub position: Vec2,
    /// Whether the agent is heading for safety.
    pub evacuating: bool,
    /// Recent positions, oldest first.
    pub trail: VecDeque<Vec2>,
}

/// Read-only description of everything a renderer draws in one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Number of grid columns.
    pub columns: u32,
    /// Number of grid rows.
    pub rows: u32,
    /// Cell flags in row-major order.
    pub cells: Vec<Cell>,
    /// Agents still on the grid.
    pub agents: Vec<SceneAgent>,
    /// Counters at capture time.
    pub stats: SimulationStats,
    /// Evacuation history from the latest published snapshot.
    pub history: Vec<u32>,
    /// Frame-rate estimate from the latest published snapshot.
    pub frames_per_second: f32,
    /// Active agents per cell, present only while the heatmap is enabled.
    pub heatmap: Option<Vec<u32>>,
}

impl Scene {
    /// Captures the world, using `snapshot` for the sampled statistics.
    #[must_use]
    pub fn capture(world: &World, snapshot: Option<&StatsSnapshot>) -> Self {
        let grid = query::grid(world);
        let agents = query::agent_view(world)
            .into_vec()
            .into_iter()
            .filter(|agent| !agent.state.is_terminal())
            .map(|agent| SceneAgent {
                id: agent.id,
                position: agent.position,
                evacuating: agent.state == AgentState::Evacuating,
                trail: agent.trail,
            })
            .collect();

        Self {
            columns: grid.columns(),
            rows: grid.rows(),
            cells: grid.cells().to_vec(),
            agents,
            stats: query::stats(world),
            history: snapshot.map(|s| s.history.clone()).unwrap_or_default(),
            frames_per_second: snapshot.map_or(0.0, |s| s.frames_per_second),
            heatmap: query::heatmap_enabled(world).then(|| query::density(world)),
        }
    }

    /// Flags of the provided cell.
    ///
    /// # Panics
    ///
    /// Panics when `cell` lies outside the captured grid.
    #[must_use]
    pub fn cell(&self, cell: CellCoord) -> &Cell {
        assert!(cell.column() < self.columns && cell.row() < self.rows);
        &self.cells[(cell.row() * self.columns + cell.column()) as usize]
    }
}

/// Character map of the scene: `#` wall, `^` fire, `~` flood, `S` safe zone,
/// `e` evacuating agent, `a` other agent, `.` clear floor.
impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut glyphs: Vec<char> = self.cells.iter().map(cell_glyph).collect();
        for agent in &self.agents {
            let column = agent.position.x.round();
            let row = agent.position.y.round();
            if column < 0.0 || row < 0.0 {
                continue;
            }
            let (column, row) = (column as u32, row as u32);
            if column < self.columns && row < self.rows {
                glyphs[(row * self.columns + column) as usize] =
                    if agent.evacuating { 'e' } else { 'a' };
            }
        }

        for row in glyphs.chunks(self.columns as usize) {
            writeln!(f, "{}", row.iter().collect::<String>())?;
        }
        write!(
            f,
            "active {} | evacuated {} | casualties {}",
            self.stats.active, self.stats.evacuated, self.stats.casualties
        )
    }
}

fn cell_glyph(cell: &Cell) -> char {
    if cell.is_wall() {
        '#'
    } else if cell.is_on_fire() {
        '^'
    } else if cell.is_flooded() {
        '~'
    } else if cell.is_safe_zone() {
        'S'
    } else {
        '.'
    }
}
