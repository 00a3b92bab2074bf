//! Cells and their canonical coordinates

use std::fmt;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::core::types::{PlayerId, UnitId};
use crate::grid::compass::Sextant;

/// Canonical integer coordinates of a cell; the stable cell identity.
///
/// Only coordinates produced by [`Board::canonicalize`](crate::grid::board::Board::canonicalize)
/// identify cells; raw pairs must be folded first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// A single cell of the board.
///
/// Invariants: a non-hole cell holds at most one unit; a hole never holds
/// a unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    pub coord: Coord,
    /// Holes are impassable and can never be occupied.
    pub is_hole: bool,
    /// Sextant relative to the map center; `None` only at the center itself.
    pub sextant: Option<Sextant>,
    pub occupant: Option<UnitId>,
    /// Players that have ever had visibility over this cell. Never cleared.
    pub observed_by: AHashSet<PlayerId>,
}

impl Cell {
    pub fn new(coord: Coord, is_hole: bool) -> Self {
        Self {
            coord,
            is_hole,
            sextant: Sextant::of(coord.x, coord.y),
            occupant: None,
            observed_by: AHashSet::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.occupant.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_cell_has_no_sextant() {
        let cell = Cell::new(Coord::new(0, 0), false);
        assert_eq!(cell.sextant, None);
        assert!(cell.is_empty());
    }

    #[test]
    fn test_cell_sextant_matches_its_coordinates() {
        let cell = Cell::new(Coord::new(2, 1), false);
        assert_eq!(cell.sextant, Some(Sextant::NorthEast));
    }
}
