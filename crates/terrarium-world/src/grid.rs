//! The lattice: sole owner of every [`Cell`].
//!
//! Dimensions and boundary mode are fixed at construction. Every neighbor
//! query resolves raw offsets through [`Grid::resolve`], which either wraps
//! modulo each dimension ([`BoundaryMode::Toroidal`]) or rejects anything off
//! the edge ([`BoundaryMode::Bounded`]). Lookups that miss return `None` or an
//! empty list; they are ordinary outcomes, never errors.

use std::collections::{BTreeMap, BTreeSet};

use terrarium_types::{BoundaryMode, CellCoord, Weather};
use tracing::debug;

use crate::cell::Cell;
use crate::climate::Climate;
use crate::error::WorldError;
use crate::rng::SimRng;

/// Dense `height x width` lattice of cells, stored row-major.
#[derive(Debug, Clone)]
pub struct Grid {
    height: usize,
    width: usize,
    boundary: BoundaryMode,
    cells: Vec<Cell>,
}

impl Grid {
    /// Build a lattice of fresh cells.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidDimensions`] if either dimension is zero
    /// or the cell count does not fit in memory addressing.
    pub fn new(height: usize, width: usize, boundary: BoundaryMode) -> Result<Self, WorldError> {
        let count = height
            .checked_mul(width)
            .filter(|count| *count > 0)
            .ok_or(WorldError::InvalidDimensions { height, width })?;

        let mut cells = Vec::with_capacity(count);
        for row in 0..height {
            for col in 0..width {
                cells.push(Cell::new(CellCoord::new(row, col)));
            }
        }

        debug!(height, width, ?boundary, "grid constructed");
        Ok(Self {
            height,
            width,
            boundary,
            cells,
        })
    }

    /// Number of rows.
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Number of columns.
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Boundary mode consulted by every neighbor query.
    pub const fn boundary(&self) -> BoundaryMode {
        self.boundary
    }

    /// Whether `coord` lies inside the lattice.
    pub const fn contains(&self, coord: CellCoord) -> bool {
        coord.row < self.height && coord.col < self.width
    }

    fn index_of(&self, coord: CellCoord) -> Option<usize> {
        if !self.contains(coord) {
            return None;
        }
        coord.row.checked_mul(self.width)?.checked_add(coord.col)
    }

    /// The cell at `coord`, or `None` if it is off the lattice.
    pub fn cell(&self, coord: CellCoord) -> Option<&Cell> {
        self.index_of(coord).and_then(|i| self.cells.get(i))
    }

    /// Mutable access to the cell at `coord`, or `None` if it is off the
    /// lattice.
    pub fn cell_mut(&mut self, coord: CellCoord) -> Option<&mut Cell> {
        self.index_of(coord).and_then(|i| self.cells.get_mut(i))
    }

    /// Resolve a signed (row, column) pair through the boundary mode.
    ///
    /// Toroidal grids wrap both coordinates modulo their dimension. Bounded
    /// grids return `None` for anything outside the lattice.
    pub fn resolve(&self, row: i64, col: i64) -> Option<CellCoord> {
        let height = i64::try_from(self.height).ok()?;
        let width = i64::try_from(self.width).ok()?;
        let (row, col) = match self.boundary {
            BoundaryMode::Toroidal => (row.rem_euclid(height), col.rem_euclid(width)),
            BoundaryMode::Bounded => {
                if !(0..height).contains(&row) || !(0..width).contains(&col) {
                    return None;
                }
                (row, col)
            }
        };
        Some(CellCoord::new(
            usize::try_from(row).ok()?,
            usize::try_from(col).ok()?,
        ))
    }

    /// Cells whose offset `(dx, dy)` from `origin` satisfies
    /// `|dx| + |dy| <= distance`, excluding the origin itself.
    ///
    /// Offsets are walked with `dx` ascending, then `dy` ascending, and each
    /// is resolved through the boundary mode. On small toroidal grids several
    /// offsets can wrap onto the same cell (or back onto the origin); only
    /// the first occurrence of each distinct cell is kept, and the origin is
    /// never returned. An origin outside the lattice yields an empty list.
    pub fn neighbors_within_distance(&self, origin: CellCoord, distance: usize) -> Vec<CellCoord> {
        let mut found = Vec::new();
        if !self.contains(origin) {
            return found;
        }
        let (Ok(reach), Ok(row), Ok(col)) = (
            i64::try_from(distance),
            i64::try_from(origin.row),
            i64::try_from(origin.col),
        ) else {
            return found;
        };

        let mut seen = BTreeSet::new();
        for dx in reach.saturating_neg()..=reach {
            let max_dy = reach.saturating_sub(dx.saturating_abs());
            for dy in max_dy.saturating_neg()..=max_dy {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let Some(coord) = self.resolve(row.saturating_add(dx), col.saturating_add(dy))
                else {
                    continue;
                };
                if coord != origin && seen.insert(coord) {
                    found.push(coord);
                }
            }
        }
        found
    }

    /// The (up to four) orthogonal neighbors of `origin`: up, left, right,
    /// down.
    pub fn orthogonal_neighbors(&self, origin: CellCoord) -> Vec<CellCoord> {
        self.neighbors_within_distance(origin, 1)
    }

    /// One orthogonal neighbor of `origin`, chosen uniformly.
    ///
    /// Consumes exactly one draw from `rng` whether or not a neighbor
    /// exists. `None` means "no movement", e.g. a 1x1 grid.
    pub fn random_neighbor(&self, origin: CellCoord, rng: &mut SimRng) -> Option<CellCoord> {
        let neighbors = self.orthogonal_neighbors(origin);
        rng.pick(&neighbors)
    }

    /// All cells, row-major.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// All coordinates, row-major.
    pub fn coords(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells.iter().map(Cell::coord)
    }

    /// Run the environment update on every cell, row-major.
    ///
    /// Draws exactly one value per cell from `rng`.
    pub fn update_environment(&mut self, climate: &Climate, rng: &mut SimRng) {
        for cell in &mut self.cells {
            cell.update_environment(climate, rng);
        }
    }

    /// Number of cells in each weather state. States with no cells are
    /// omitted.
    pub fn weather_counts(&self) -> BTreeMap<Weather, usize> {
        let mut counts = BTreeMap::new();
        for cell in &self.cells {
            let entry = counts.entry(cell.weather()).or_insert(0_usize);
            *entry = entry.saturating_add(1);
        }
        counts
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn torus(height: usize, width: usize) -> Grid {
        Grid::new(height, width, BoundaryMode::Toroidal).unwrap()
    }

    fn bounded(height: usize, width: usize) -> Grid {
        Grid::new(height, width, BoundaryMode::Bounded).unwrap()
    }

    #[test]
    fn zero_dimension_rejected() {
        assert!(matches!(
            Grid::new(0, 5, BoundaryMode::Toroidal),
            Err(WorldError::InvalidDimensions { height: 0, width: 5 })
        ));
        assert!(Grid::new(3, 0, BoundaryMode::Bounded).is_err());
    }

    #[test]
    fn cells_are_row_major() {
        let grid = torus(2, 3);
        let coords: Vec<_> = grid.coords().collect();
        assert_eq!(coords.len(), 6);
        assert_eq!(coords.first(), Some(&CellCoord::new(0, 0)));
        assert_eq!(coords.get(3), Some(&CellCoord::new(1, 0)));
        assert_eq!(grid.cell(CellCoord::new(1, 2)).unwrap().coord(), CellCoord::new(1, 2));
        assert!(grid.cell(CellCoord::new(2, 0)).is_none());
        assert!(grid.cell(CellCoord::new(0, 3)).is_none());
    }

    #[test]
    fn torus_center_has_four_orthogonal_neighbors() {
        let grid = torus(5, 5);
        let center = CellCoord::new(2, 2);
        let neighbors = grid.neighbors_within_distance(center, 1);
        assert_eq!(
            neighbors,
            vec![
                CellCoord::new(1, 2),
                CellCoord::new(2, 1),
                CellCoord::new(2, 3),
                CellCoord::new(3, 2),
            ]
        );
    }

    #[test]
    fn torus_corner_wraps() {
        let grid = torus(5, 5);
        let neighbors = grid.orthogonal_neighbors(CellCoord::new(0, 0));
        assert_eq!(neighbors.len(), 4);
        assert!(neighbors.contains(&CellCoord::new(4, 0)));
        assert!(neighbors.contains(&CellCoord::new(0, 4)));
    }

    #[test]
    fn bounded_corner_has_two_orthogonal_neighbors() {
        let grid = bounded(5, 5);
        let neighbors = grid.orthogonal_neighbors(CellCoord::new(0, 0));
        assert_eq!(neighbors, vec![CellCoord::new(0, 1), CellCoord::new(1, 0)]);
        assert_eq!(grid.orthogonal_neighbors(CellCoord::new(4, 2)).len(), 3);
    }

    #[test]
    fn distance_two_diamond() {
        let grid = torus(9, 9);
        // 2k^2 + 2k cells for k = 2.
        assert_eq!(grid.neighbors_within_distance(CellCoord::new(4, 4), 2).len(), 12);
        assert!(grid.neighbors_within_distance(CellCoord::new(4, 4), 0).is_empty());
    }

    #[test]
    fn small_torus_deduplicates_and_skips_origin() {
        let grid = torus(2, 2);
        let neighbors = grid.neighbors_within_distance(CellCoord::new(0, 0), 1);
        assert_eq!(neighbors, vec![CellCoord::new(1, 0), CellCoord::new(0, 1)]);
        let single = torus(1, 1);
        assert!(single.orthogonal_neighbors(CellCoord::new(0, 0)).is_empty());
    }

    #[test]
    fn invalid_origin_yields_nothing() {
        let grid = bounded(3, 3);
        assert!(grid.neighbors_within_distance(CellCoord::new(7, 7), 1).is_empty());
    }

    #[test]
    fn resolve_respects_boundary() {
        let wrap = torus(3, 4);
        assert_eq!(wrap.resolve(-1, -1), Some(CellCoord::new(2, 3)));
        assert_eq!(wrap.resolve(3, 9), Some(CellCoord::new(0, 1)));
        let edge = bounded(3, 4);
        assert_eq!(edge.resolve(-1, 0), None);
        assert_eq!(edge.resolve(2, 3), Some(CellCoord::new(2, 3)));
        assert_eq!(edge.resolve(2, 4), None);
    }

    #[test]
    fn random_neighbor_draws_once_even_when_none() {
        let single = torus(1, 1);
        let mut rng = SimRng::seed_from_u64(4);
        assert_eq!(single.random_neighbor(CellCoord::new(0, 0), &mut rng), None);
        assert_eq!(rng.draws(), 1);

        let grid = torus(5, 5);
        let origin = CellCoord::new(2, 2);
        for _ in 0..50 {
            let next = grid.random_neighbor(origin, &mut rng).unwrap();
            assert!(grid.orthogonal_neighbors(origin).contains(&next));
        }
        assert_eq!(rng.draws(), 51);
    }

    #[test]
    fn environment_pass_draws_once_per_cell() {
        let mut grid = torus(3, 4);
        let mut rng = SimRng::seed_from_u64(42);
        grid.update_environment(&Climate::temperate(), &mut rng);
        assert_eq!(rng.draws(), 12);
        let total: usize = grid.weather_counts().values().sum();
        assert_eq!(total, 12);
    }
}
