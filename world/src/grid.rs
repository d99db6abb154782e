//! Dense cell grid carrying terrain and hazard flags.

use evacsim_core::{CellCoord, CellRect};

/// Terrain and hazard flags stored for a single cell.
///
/// The flags are independent: a cell may burn while flooded, and nothing
/// prevents a wall from standing on a safe-zone cell. Walls take precedence
/// over safe zones, see [`Cell::is_refuge`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Cell {
    wall: bool,
    fire: bool,
    flooded: bool,
    safe_zone: bool,
}

impl Cell {
    /// Whether the cell is blocked by a wall.
    #[must_use]
    pub const fn is_wall(&self) -> bool {
        self.wall
    }

    /// Whether the cell is burning.
    #[must_use]
    pub const fn is_on_fire(&self) -> bool {
        self.fire
    }

    /// Whether the cell is flooded.
    #[must_use]
    pub const fn is_flooded(&self) -> bool {
        self.flooded
    }

    /// Whether the safe-zone flag is set, regardless of walls.
    #[must_use]
    pub const fn is_safe_zone(&self) -> bool {
        self.safe_zone
    }

    /// Whether agents may path through the cell.
    #[must_use]
    pub const fn is_passable(&self) -> bool {
        !self.wall && !self.fire
    }

    /// Whether the cell counts as a reachable safe zone.
    ///
    /// A walled safe-zone cell is not a refuge.
    #[must_use]
    pub const fn is_refuge(&self) -> bool {
        self.safe_zone && !self.wall
    }
}

/// Rectangular matrix of cells stored in row-major order.
///
/// Every accessor asserts that coordinates lie inside the grid. Callers that
/// receive coordinates from the outside must validate them with
/// [`Grid::contains`] first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    columns: u32,
    rows: u32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Allocates an all-clear grid.
    ///
    /// # Panics
    ///
    /// Panics when either dimension is zero.
    #[must_use]
    pub fn new(columns: u32, rows: u32) -> Self {
        assert!(
            columns > 0 && rows > 0,
            "grid dimensions must be non-zero, got {columns}x{rows}"
        );
        let capacity = columns as usize * rows as usize;
        Self {
            columns,
            rows,
            cells: vec![Cell::default(); capacity],
        }
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Total number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the grid holds no cells. Always `false` for constructed grids.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Reports whether the coordinate lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Retrieves the flags stored for the provided cell.
    ///
    /// # Panics
    ///
    /// Panics when the coordinate lies outside the grid.
    #[must_use]
    pub fn cell(&self, cell: CellCoord) -> &Cell {
        &self.cells[self.index(cell)]
    }

    /// Dense cell flags in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Iterates over every coordinate together with its flags, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, &Cell)> {
        let columns = self.columns;
        self.cells.iter().enumerate().map(move |(index, cell)| {
            let index = index as u32;
            (CellCoord::new(index % columns, index / columns), cell)
        })
    }

    /// Orthogonal in-bounds neighbours ordered up, down, left, right.
    ///
    /// # Panics
    ///
    /// Panics when the coordinate lies outside the grid.
    #[must_use]
    pub fn neighbors(&self, cell: CellCoord) -> Neighbors {
        self.assert_contains(cell);
        let mut neighbors = Neighbors::default();

        if cell.row() > 0 {
            neighbors.push(CellCoord::new(cell.column(), cell.row() - 1));
        }
        if cell.row() + 1 < self.rows {
            neighbors.push(CellCoord::new(cell.column(), cell.row() + 1));
        }
        if cell.column() > 0 {
            neighbors.push(CellCoord::new(cell.column() - 1, cell.row()));
        }
        if cell.column() + 1 < self.columns {
            neighbors.push(CellCoord::new(cell.column() + 1, cell.row()));
        }

        neighbors
    }

    pub(crate) fn ignite(&mut self, region: CellRect) {
        self.update_region(region, |cell| cell.fire = true);
    }

    pub(crate) fn flood(&mut self, region: CellRect) {
        self.update_region(region, |cell| cell.flooded = true);
    }

    pub(crate) fn set_safe_zone(&mut self, region: CellRect) {
        self.update_region(region, |cell| cell.safe_zone = true);
    }

    /// Resets fire, flood and safe-zone flags. Walls are terrain and survive.
    pub(crate) fn clear_hazards(&mut self) {
        for cell in &mut self.cells {
            cell.fire = false;
            cell.flooded = false;
            cell.safe_zone = false;
        }
    }

    /// Flips the wall flag and returns the new value.
    pub(crate) fn toggle_wall(&mut self, cell: CellCoord) -> bool {
        let index = self.index(cell);
        let slot = &mut self.cells[index];
        slot.wall = !slot.wall;
        slot.wall
    }

    fn update_region<F>(&mut self, region: CellRect, mut update: F)
    where
        F: FnMut(&mut Cell),
    {
        for coord in region.cells() {
            let index = self.index(coord);
            update(&mut self.cells[index]);
        }
    }

    pub(crate) fn index(&self, cell: CellCoord) -> usize {
        self.assert_contains(cell);
        cell.row() as usize * self.columns as usize + cell.column() as usize
    }

    fn assert_contains(&self, cell: CellCoord) {
        assert!(
            self.contains(cell),
            "cell {cell} lies outside the {}x{} grid",
            self.columns,
            self.rows
        );
    }
}

/// Fixed-capacity iterator over up to four orthogonal neighbours.
#[derive(Clone, Debug, Default)]
pub struct Neighbors {
    buffer: [Option<CellCoord>; 4],
    len: usize,
    cursor: usize,
}

impl Neighbors {
    fn push(&mut self, cell: CellCoord) {
        if self.len < self.buffer.len() {
            self.buffer[self.len] = Some(cell);
            self.len += 1;
        }
    }
}

impl Iterator for Neighbors {
    type Item = CellCoord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.len {
            return None;
        }

        let value = self.buffer[self.cursor];
        self.cursor += 1;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evacsim_core::CellRectSize;

    #[test]
    fn neighbors_follow_up_down_left_right_order() {
        let grid = Grid::new(5, 5);
        let neighbors: Vec<_> = grid.neighbors(CellCoord::new(2, 2)).collect();
        assert_eq!(
            neighbors,
            vec![
                CellCoord::new(2, 1),
                CellCoord::new(2, 3),
                CellCoord::new(1, 2),
                CellCoord::new(3, 2),
            ]
        );
    }

    #[test]
    fn neighbors_are_bounded_and_unique_for_every_cell() {
        for (columns, rows) in [(2, 2), (3, 2), (4, 7), (9, 9)] {
            let grid = Grid::new(columns, rows);
            for (coord, _) in grid.iter() {
                let neighbors: Vec<_> = grid.neighbors(coord).collect();
                assert!((2..=4).contains(&neighbors.len()), "{coord} in {columns}x{rows}");
                for (index, neighbor) in neighbors.iter().enumerate() {
                    assert!(grid.contains(*neighbor));
                    assert_eq!(coord.manhattan_distance(*neighbor), 1);
                    assert!(!neighbors[index + 1..].contains(neighbor));
                }
            }
        }
    }

    #[test]
    fn corner_has_two_neighbors() {
        let grid = Grid::new(3, 3);
        let neighbors: Vec<_> = grid.neighbors(CellCoord::new(0, 0)).collect();
        assert_eq!(neighbors, vec![CellCoord::new(0, 1), CellCoord::new(1, 0)]);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn out_of_bounds_access_panics() {
        let grid = Grid::new(3, 3);
        let _ = grid.cell(CellCoord::new(3, 0));
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn out_of_bounds_region_panics() {
        let mut grid = Grid::new(3, 3);
        grid.ignite(CellRect::from_origin_and_size(
            CellCoord::new(2, 2),
            CellRectSize::new(2, 2),
        ));
    }

    #[test]
    fn clear_hazards_keeps_walls() {
        let mut grid = Grid::new(4, 4);
        let region = CellRect::from_origin_and_size(CellCoord::new(0, 0), CellRectSize::new(2, 2));
        grid.ignite(region);
        grid.flood(region);
        grid.set_safe_zone(region);
        assert!(grid.toggle_wall(CellCoord::new(3, 3)));

        grid.clear_hazards();

        for (coord, cell) in grid.iter() {
            assert!(!cell.is_on_fire());
            assert!(!cell.is_flooded());
            assert!(!cell.is_safe_zone());
            assert_eq!(cell.is_wall(), coord == CellCoord::new(3, 3));
        }
    }

    #[test]
    fn wall_overrides_safe_zone() {
        let mut grid = Grid::new(2, 2);
        let coord = CellCoord::new(1, 1);
        grid.set_safe_zone(CellRect::from_origin_and_size(coord, CellRectSize::new(1, 1)));
        assert!(grid.cell(coord).is_refuge());

        assert!(grid.toggle_wall(coord));
        let cell = grid.cell(coord);
        assert!(cell.is_safe_zone());
        assert!(cell.is_wall());
        assert!(!cell.is_refuge());
        assert!(!cell.is_passable());
    }
}
