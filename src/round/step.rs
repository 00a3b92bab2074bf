//! Steps - the single-cell displacement implied by an intent

use serde::{Deserialize, Serialize};

use crate::grid::board::Board;
use crate::grid::cell::Coord;
use crate::grid::compass::Sextant;

/// One of the six hex headings, or the neutral heading used for holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    None,
    North,
    NorthEast,
    SouthEast,
    South,
    SouthWest,
    NorthWest,
}

impl Direction {
    /// Coordinate delta of a single step along this heading.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::None => (0, 0),
            Direction::North => (0, 1),
            Direction::NorthEast => (1, 0),
            Direction::SouthEast => (1, -1),
            Direction::South => (0, -1),
            Direction::SouthWest => (-1, 0),
            Direction::NorthWest => (-1, 1),
        }
    }

    pub fn from_sextant(sextant: Option<Sextant>) -> Direction {
        match sextant {
            None => Direction::None,
            Some(Sextant::North) => Direction::North,
            Some(Sextant::NorthEast) => Direction::NorthEast,
            Some(Sextant::SouthEast) => Direction::SouthEast,
            Some(Sextant::South) => Direction::South,
            Some(Sextant::SouthWest) => Direction::SouthWest,
            Some(Sextant::NorthWest) => Direction::NorthWest,
        }
    }
}

/// The concrete one-cell move resolved from an intent: where the unit
/// stands, where it will try to step, and the heading between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub from: Coord,
    pub to: Coord,
    pub direction: Direction,
    pub dx: i32,
    pub dy: i32,
}

impl Step {
    /// Derives the heading from the folded origin-to-destination sextant.
    /// A step onto its own origin carries the neutral heading.
    pub fn new(board: &Board, from: Coord, to: Coord) -> Self {
        let direction = Direction::from_sextant(board.sextant_between(from, to));
        let (dx, dy) = direction.delta();
        Self {
            from,
            to,
            direction,
            dx,
            dy,
        }
    }

    pub fn is_hold(&self) -> bool {
        self.from == self.to
    }
}
