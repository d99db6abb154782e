//! Per-agent lifecycle and movement interpolation.

use std::collections::VecDeque;

use evacsim_core::{AgentId, AgentState, CellCoord, Motion};
use glam::Vec2;

use crate::{grid::Grid, navigation, rng::SimRng, Tuning};

/// Terminal transition produced by a single agent update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Outcome {
    Died,
    Evacuated,
}

#[derive(Clone, Debug)]
pub(crate) struct Agent {
    pub(crate) id: AgentId,
    pub(crate) cell: CellCoord,
    pub(crate) position: Vec2,
    pub(crate) motion: Motion,
    pub(crate) state: AgentState,
    pub(crate) speed: f32,
    pub(crate) path: VecDeque<CellCoord>,
    pub(crate) progress: f32,
    pub(crate) trail: VecDeque<Vec2>,
}

impl Agent {
    pub(crate) fn spawn(id: AgentId, cell: CellCoord) -> Self {
        Self {
            id,
            cell,
            position: cell_position(cell),
            motion: Motion::Stationary,
            state: AgentState::Idle,
            speed: 0.0,
            path: VecDeque::new(),
            progress: 0.0,
            trail: VecDeque::new(),
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        !self.state.is_terminal()
    }

    /// Cell the agent will occupy once its in-flight move completes.
    pub(crate) fn committed_cell(&self) -> CellCoord {
        match self.motion {
            Motion::Stationary => self.cell,
            Motion::MovingTo(target) => target,
        }
    }

    /// Switches the agent to evacuation and plans an initial route to safety.
    pub(crate) fn begin_evacuation(&mut self, grid: &Grid) {
        self.state = AgentState::Evacuating;
        self.path = navigation::find_path_to_safety(grid, self.committed_cell()).into();
    }

    /// Returns an evacuating agent to wandering and drops any planned route.
    pub(crate) fn stand_down(&mut self) {
        if self.state == AgentState::Evacuating {
            self.state = AgentState::Idle;
        }
        self.path.clear();
    }

    /// Runs one tick of the lifecycle for an active agent.
    pub(crate) fn update(
        &mut self,
        grid: &Grid,
        rng: &mut SimRng,
        tuning: &Tuning,
        tick: u64,
    ) -> Option<Outcome> {
        debug_assert!(self.is_active(), "terminal agents are not updated");

        let here = *grid.cell(self.cell);
        if here.is_on_fire() {
            self.settle(AgentState::Dead);
            return Some(Outcome::Died);
        }
        if here.is_refuge() {
            self.settle(AgentState::Evacuated);
            return Some(Outcome::Evacuated);
        }

        let mut speed = tuning.base_speed;
        if here.is_flooded() {
            speed *= tuning.flood_modifier;
        }
        if self.state == AgentState::Evacuating {
            speed *= tuning.panic_modifier;
        }
        self.speed = speed;

        if self.motion == Motion::Stationary {
            self.motion = self.decide(grid, rng);
        }

        let Motion::MovingTo(target) = self.motion else {
            return None;
        };

        self.progress += speed;
        if self.progress >= 1.0 {
            self.cell = target;
            self.progress = 0.0;
            self.motion = Motion::Stationary;
            self.position = cell_position(target);
        } else {
            let from = cell_position(self.cell);
            let to = cell_position(target);
            self.position =
                from.lerp(to, self.progress) + jitter(self.id, tick, tuning.jitter_amplitude);
        }

        if tuning.trail_interval > 0 && tick % tuning.trail_interval == 0 {
            self.trail.push_back(self.position);
            while self.trail.len() > tuning.trail_capacity {
                let _ = self.trail.pop_front();
            }
        }

        None
    }

    fn decide(&mut self, grid: &Grid, rng: &mut SimRng) -> Motion {
        if let Some(next) = self.path.pop_front() {
            if grid.cell(next).is_on_fire() {
                self.path.clear();
                return Motion::Stationary;
            }
            return Motion::MovingTo(next);
        }

        match self.state {
            AgentState::Evacuating => {
                self.path = navigation::find_path_to_safety(grid, self.cell).into();
                self.path
                    .pop_front()
                    .map_or(Motion::Stationary, Motion::MovingTo)
            }
            AgentState::Idle => wander(grid, self.cell, rng),
            AgentState::Dead | AgentState::Evacuated => Motion::Stationary,
        }
    }

    fn settle(&mut self, state: AgentState) {
        self.state = state;
        self.motion = Motion::Stationary;
        self.progress = 0.0;
        self.path.clear();
    }
}

fn wander(grid: &Grid, cell: CellCoord, rng: &mut SimRng) -> Motion {
    let mut candidates = [CellCoord::new(0, 0); 4];
    let mut count = 0;
    for neighbor in grid.neighbors(cell) {
        if grid.cell(neighbor).is_passable() {
            candidates[count] = neighbor;
            count += 1;
        }
    }

    if count == 0 {
        return Motion::Stationary;
    }

    let pick = rng.next_int(0, count as u32 - 1) as usize;
    Motion::MovingTo(candidates[pick])
}

/// Visual position of a cell in cell units.
pub(crate) fn cell_position(cell: CellCoord) -> Vec2 {
    Vec2::new(cell.column() as f32, cell.row() as f32)
}

/// Small per-agent wobble that separates agents sharing a lane.
fn jitter(id: AgentId, tick: u64, amplitude: f32) -> Vec2 {
    let phase = id.get() as f32 * 1.618 + (tick % 3600) as f32 * 0.2;
    Vec2::new(phase.sin(), phase.cos()) * amplitude
}
