use std::collections::HashMap;

use glam::Vec2;

/// Integer cell coordinate: `floor(pos / cell_size)` per axis.
pub type Cell = (i32, i32);

/// Uniform grid bucketing dot indices by cell for pointer proximity queries.
///
/// Cells are keyed by their exact coordinate, so the grid is unbounded and a
/// query never misses an entry regardless of where the pointer is.
/// Rebuilt from scratch on every layout pass, never patched.
pub struct SpatialGrid {
    cell_size: f32,
    /// Each bucket holds dot indices.
    cells: HashMap<Cell, Vec<u32>>,
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(f32::MIN_POSITIVE),
            cells: HashMap::new(),
        }
    }

    /// Drop every entry and switch to a new cell size.
    pub fn reset(&mut self, cell_size: f32) {
        self.cell_size = cell_size.max(f32::MIN_POSITIVE);
        self.clear();
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Number of non-empty cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Register `index` in the cell containing `pos`.
    pub fn insert(&mut self, pos: Vec2, index: u32) {
        let cell = self.cell_of(pos);
        self.cells.entry(cell).or_default().push(index);
    }

    pub fn cell_of(&self, pos: Vec2) -> Cell {
        let cx = (pos.x / self.cell_size).floor() as i32;
        let cy = (pos.y / self.cell_size).floor() as i32;
        (cx, cy)
    }

    /// Call `callback` for every entry that may lie within `radius` of `pos`.
    ///
    /// Visits the square block of cells `ceil(radius / cell_size)` cells around
    /// the query cell (never smaller than 3x3). Every entry truly within
    /// `radius` is visited exactly once; entries further away may be visited too.
    pub fn query_radius(&self, pos: Vec2, radius: f32, mut callback: impl FnMut(u32)) {
        let (cx, cy) = self.cell_of(pos);
        let reach = self.reach(radius);

        // A huge block costs more to walk than the occupied cells themselves.
        let side = 2 * reach as i64 + 1;
        if side * side > self.cells.len() as i64 {
            for (&(x, y), bucket) in &self.cells {
                if (x as i64 - cx as i64).abs() <= reach as i64
                    && (y as i64 - cy as i64).abs() <= reach as i64
                {
                    bucket.iter().for_each(|&i| callback(i));
                }
            }
            return;
        }

        for dy in -reach..=reach {
            for dx in -reach..=reach {
                let cell = (cx.wrapping_add(dx), cy.wrapping_add(dy));
                if let Some(bucket) = self.cells.get(&cell) {
                    bucket.iter().for_each(|&i| callback(i));
                }
            }
        }
    }

    /// Cell radius of the block a query with `radius` has to cover.
    fn reach(&self, radius: f32) -> i32 {
        let cells = (radius.max(0.0) / self.cell_size).ceil();
        if cells.is_finite() {
            (cells as i32).clamp(1, i32::MAX / 4)
        } else {
            i32::MAX / 4
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn found(grid: &SpatialGrid, pos: Vec2, radius: f32) -> Vec<u32> {
        let mut out = Vec::new();
        grid.query_radius(pos, radius, |i| out.push(i));
        out.sort_unstable();
        out
    }

    #[test]
    fn small_radius_still_scans_neighbouring_cells() {
        let mut grid = SpatialGrid::new(64.0);
        grid.insert(Vec2::new(100.0, 100.0), 0);
        grid.insert(Vec2::new(130.0, 105.0), 1);
        grid.insert(Vec2::new(900.0, 900.0), 2);

        // The near dots sit in cells (1, 1) and (2, 1); the far one is 13 cells out.
        assert_eq!(found(&grid, Vec2::new(127.0, 102.0), 10.0), vec![0, 1]);
    }

    #[test]
    fn reset_drops_entries_and_changes_cell_size() {
        let mut grid = SpatialGrid::new(64.0);
        grid.insert(Vec2::new(50.0, 50.0), 42);
        grid.reset(100.0);

        assert!(found(&grid, Vec2::new(50.0, 50.0), 150.0).is_empty());
        assert_eq!(grid.cell_count(), 0);

        grid.insert(Vec2::new(150.0, 50.0), 7);
        assert_eq!(grid.cell_of(Vec2::new(150.0, 50.0)), (1, 0));
        assert_eq!(found(&grid, Vec2::new(50.0, 50.0), 150.0), vec![7]);
    }

    #[test]
    fn negative_coordinates_floor_to_their_own_cell() {
        let grid = SpatialGrid::new(50.0);
        assert_eq!(grid.cell_of(Vec2::new(-0.5, 49.9)), (-1, 0));
        assert_eq!(grid.cell_of(Vec2::new(50.0, -50.0)), (1, -1));
    }

    #[test]
    fn large_radius_reaches_beyond_neighbours() {
        let mut grid = SpatialGrid::new(50.0);
        grid.insert(Vec2::new(10.0, 10.0), 0);
        grid.insert(Vec2::new(260.0, 10.0), 1);

        assert_eq!(found(&grid, Vec2::new(10.0, 10.0), 50.0), vec![0]);
        assert_eq!(found(&grid, Vec2::new(10.0, 10.0), 260.0), vec![0, 1]);
    }

    #[test]
    fn each_entry_is_reported_once() {
        let mut grid = SpatialGrid::new(10.0);
        for i in 0..100u32 {
            grid.insert(Vec2::new((i % 10) as f32 * 7.0, (i / 10) as f32 * 7.0), i);
        }
        assert_eq!(
            found(&grid, Vec2::new(30.0, 30.0), 1000.0),
            (0..100).collect::<Vec<_>>()
        );
    }

    proptest! {
        #[test]
        fn candidates_cover_every_point_within_radius(
            points in prop::collection::vec((-500.0f32..1500.0, -500.0f32..1500.0), 0..200),
            cell_size in 1.0f32..300.0,
            px in -800.0f32..1800.0,
            py in -800.0f32..1800.0,
            radius in 0.0f32..600.0,
        ) {
            let mut grid = SpatialGrid::new(cell_size);
            for (i, &(x, y)) in points.iter().enumerate() {
                grid.insert(Vec2::new(x, y), i as u32);
            }

            let pointer = Vec2::new(px, py);
            let mut candidates = vec![false; points.len()];
            grid.query_radius(pointer, radius, |i| candidates[i as usize] = true);

            for (i, &(x, y)) in points.iter().enumerate() {
                if Vec2::new(x, y).distance(pointer) <= radius {
                    prop_assert!(candidates[i], "point {} at ({}, {}) missed", i, x, y);
                }
            }
        }
    }
}
