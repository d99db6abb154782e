//! Breadth-first route planning over the cell grid.
//!
//! Searches expand neighbours in the grid's canonical up, down, left, right
//! order, so equal-length routes are always resolved the same way for the same
//! grid. Walls and burning cells are never entered; flooded cells are
//! traversable and only slow agents down. Predecessor links live in a map
//! scoped to a single search and are discarded when it returns.

use std::collections::VecDeque;

use evacsim_core::CellCoord;

use crate::grid::Grid;

/// Shortest route from `from` to `to`.
///
/// The returned cells exclude the origin and end with the destination. An
/// empty route means the destination is unreachable, or that `from == to`.
///
/// # Panics
///
/// Panics when either coordinate lies outside the grid.
#[must_use]
pub fn find_path(grid: &Grid, from: CellCoord, to: CellCoord) -> Vec<CellCoord> {
    assert!(grid.contains(to), "destination {to} lies outside the grid");
    search(grid, from, |cell| cell == to)
}

/// Shortest route from `from` to the nearest refuge cell.
///
/// Ties between equally distant refuges resolve toward the one discovered
/// first in neighbour order. Returns an empty route when no refuge is
/// reachable.
///
/// # Panics
///
/// Panics when `from` lies outside the grid.
#[must_use]
pub fn find_path_to_safety(grid: &Grid, from: CellCoord) -> Vec<CellCoord> {
    search(grid, from, |cell| grid.cell(cell).is_refuge())
}

fn search<F>(grid: &Grid, from: CellCoord, is_goal: F) -> Vec<CellCoord>
where
    F: Fn(CellCoord) -> bool,
{
    let origin_index = grid.index(from);
    if is_goal(from) {
        return Vec::new();
    }

    let mut predecessors: Vec<Option<CellCoord>> = vec![None; grid.len()];
    let mut visited = vec![false; grid.len()];
    visited[origin_index] = true;

    let mut frontier = VecDeque::new();
    frontier.push_back(from);

    while let Some(cell) = frontier.pop_front() {
        for neighbor in grid.neighbors(cell) {
            let index = grid.index(neighbor);
            if visited[index] || !grid.cell(neighbor).is_passable() {
                continue;
            }

            visited[index] = true;
            predecessors[index] = Some(cell);

            if is_goal(neighbor) {
                return reconstruct(grid, &predecessors, from, neighbor);
            }

            frontier.push_back(neighbor);
        }
    }

    Vec::new()
}

fn reconstruct(
    grid: &Grid,
    predecessors: &[Option<CellCoord>],
    from: CellCoord,
    goal: CellCoord,
) -> Vec<CellCoord> {
    let mut route = vec![goal];
    let mut current = goal;
    while let Some(previous) = predecessors[grid.index(current)] {
        if previous == from {
            break;
        }
        route.push(previous);
        current = previous;
    }
    route.reverse();
    route
}
