//! Board topology - canonical folding, hole lattices, distance, rings
//!
//! The board is borderless: any raw coordinate folds to exactly one
//! canonical cell, either by wrapping both axes (rhombus/square torus) or by
//! translating overflowing sextants back across the hexagon.

use ahash::AHashMap;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::types::UnitId;
use crate::grid::cell::{Cell, Coord};
use crate::grid::compass::{self, Sextant};

/// Overall outline of the playable area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shape {
    Hexagon,
    Rhombus,
    /// Geometrically identical to Rhombus; kept as a separate label.
    Square,
}

/// Periodic hole lattice selecting how densely units can pack the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DegreesOfFreedom {
    /// Triangular tiling; one cell in three is a hole.
    Three,
    /// Rhombille tiling; one cell in four is a hole.
    Four,
    /// Pentagonal tiling (p6, orbifold 632); one cell in seven is a hole.
    Five,
    /// Hexagonal tiling; no holes.
    Six,
}

impl DegreesOfFreedom {
    /// Fraction of cells that stay passable, as (numerator, denominator).
    fn passable_fraction(self) -> (usize, usize) {
        match self {
            DegreesOfFreedom::Three => (2, 3),
            DegreesOfFreedom::Four => (3, 4),
            DegreesOfFreedom::Five => (6, 7),
            DegreesOfFreedom::Six => (1, 1),
        }
    }
}

/// `x mod m`, shifted so the representative lies in `[z, z + m)`.
fn math_mod(x: i32, m: i32, z: i32) -> i32 {
    (x - z).rem_euclid(m) + z
}

/// Hole test on canonical coordinates: a periodic residue-class lattice
/// keyed by the degrees-of-freedom value.
pub fn is_hole(x: i32, y: i32, degrees_of_freedom: DegreesOfFreedom) -> bool {
    match degrees_of_freedom {
        DegreesOfFreedom::Three => matches!(
            (math_mod(x, 3, 0), math_mod(y, 3, 0)),
            (0, 0) | (1, 1) | (2, 2)
        ),
        DegreesOfFreedom::Four => math_mod(x, 2, 0) == 0 && math_mod(y, 2, 0) == 0,
        DegreesOfFreedom::Five => matches!(
            (math_mod(x, 7, 0), math_mod(y, 7, 0)),
            (0, 0) | (1, 4) | (2, 1) | (3, 5) | (4, 2) | (5, 6) | (6, 3)
        ),
        DegreesOfFreedom::Six => false,
    }
}

/// The board: cell arena plus all shape-dependent geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    length: i32,
    shape: Shape,
    degrees_of_freedom: DegreesOfFreedom,
    diameter: i32,
    total_cells: usize,
    default_unit_count: usize,
    cells: AHashMap<Coord, Cell>,
}

impl Board {
    pub fn new(length: i32, shape: Shape, degrees_of_freedom: DegreesOfFreedom) -> Self {
        assert!(length > 1, "board length must be at least 2, got {length}");
        let diameter = 2 * length - 1;
        let total_cells = match shape {
            Shape::Hexagon => (3 * length * length - 3 * length + 1) as usize,
            Shape::Rhombus | Shape::Square => (diameter * diameter) as usize,
        };
        let (passable, out_of) = degrees_of_freedom.passable_fraction();
        // Scaled down to leave room to move, then folded to an odd number.
        let default_unit_count = (total_cells * passable / out_of) / 14 * 2 + 1;

        let mut board = Self {
            length,
            shape,
            degrees_of_freedom,
            diameter,
            total_cells,
            default_unit_count,
            cells: AHashMap::with_capacity(total_cells),
        };
        for y in -length..=length {
            for x in -length..=length {
                board.cell_at(x, y);
            }
        }
        debug_assert_eq!(board.cells.len(), board.total_cells);
        board
    }

    pub fn length(&self) -> i32 {
        self.length
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn degrees_of_freedom(&self) -> DegreesOfFreedom {
        self.degrees_of_freedom
    }

    /// Width of the canonical region along any axis.
    pub fn diameter(&self) -> i32 {
        self.diameter
    }

    pub fn total_cells(&self) -> usize {
        self.total_cells
    }

    /// Number of resource units a placement pattern aims for.
    pub fn default_unit_count(&self) -> usize {
        self.default_unit_count
    }

    /// True when the coordinates already lie inside the canonical region.
    pub fn is_canonical(&self, x: i32, y: i32) -> bool {
        match self.shape {
            Shape::Hexagon => {
                x.abs() < self.length && y.abs() < self.length && (x + y).abs() < self.length
            }
            Shape::Rhombus | Shape::Square => {
                x.abs() <= self.length - 1 && y.abs() <= self.length - 1
            }
        }
    }

    /// Folds any raw coordinate pair onto its unique canonical cell.
    ///
    /// Hexagon: translate by the sextant-keyed offset until the hexagon
    /// inequalities hold. Rhombus/square: modular reduction on both axes.
    pub fn canonicalize(&self, x: i32, y: i32) -> Coord {
        match self.shape {
            Shape::Hexagon => {
                let (mut x, mut y) = (x, y);
                while !self.is_canonical(x, y) {
                    match Sextant::of(x, y) {
                        Some(Sextant::North) => {
                            x += self.length - 1;
                            y -= self.diameter;
                        }
                        Some(Sextant::NorthEast) => {
                            x -= self.length;
                            y -= self.length - 1;
                        }
                        Some(Sextant::SouthEast) => {
                            x -= self.diameter;
                            y += self.length;
                        }
                        Some(Sextant::South) => {
                            x -= self.length - 1;
                            y += self.diameter;
                        }
                        Some(Sextant::SouthWest) => {
                            x += self.length;
                            y += self.length - 1;
                        }
                        Some(Sextant::NorthWest) => {
                            x += self.diameter;
                            y -= self.length;
                        }
                        None => unreachable!("the center is always canonical"),
                    }
                }
                Coord::new(x, y)
            }
            Shape::Rhombus | Shape::Square => Coord::new(
                math_mod(x, self.diameter, -(self.length - 1)),
                math_mod(y, self.diameter, -(self.length - 1)),
            ),
        }
    }

    /// Folds raw coordinates and returns the memoized cell, creating it on
    /// first access.
    pub fn cell_at(&mut self, x: i32, y: i32) -> Coord {
        let coord = self.canonicalize(x, y);
        let degrees_of_freedom = self.degrees_of_freedom;
        self.cells
            .entry(coord)
            .or_insert_with(|| Cell::new(coord, is_hole(coord.x, coord.y, degrees_of_freedom)));
        coord
    }

    /// Looks up a canonical cell. Panics on coordinates that were never
    /// folded; that is a caller bug, not a runtime condition.
    pub fn cell(&self, coord: Coord) -> &Cell {
        self.cells
            .get(&coord)
            .expect("coordinate outside the canonical board")
    }

    pub(crate) fn cell_mut(&mut self, coord: Coord) -> &mut Cell {
        self.cells
            .get_mut(&coord)
            .expect("coordinate outside the canonical board")
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    pub fn occupant(&self, coord: Coord) -> Option<UnitId> {
        self.cell(coord).occupant
    }

    /// Hex distance between two cells, folded through the topology.
    ///
    /// On wrap-around rhombus/square boards a delta crossing the NE/SW fold
    /// takes the shortcut through the wrap, measured by walking the
    /// triangular fold region.
    pub fn distance(&self, a: Coord, b: Coord) -> i32 {
        let delta = self.canonicalize(b.x - a.x, b.y - a.y);
        let hex = delta
            .x
            .abs()
            .max(delta.y.abs())
            .max((delta.x + delta.y).abs());
        match self.shape {
            Shape::Hexagon => hex,
            Shape::Rhombus | Shape::Square => {
                if (delta.x + delta.y).abs() >= self.length {
                    self.length - 1
                        + compass::explore_depth(
                            delta.x.abs(),
                            delta.y.abs(),
                            self.length - 1,
                            self.length,
                        )
                } else {
                    hex
                }
            }
        }
    }

    /// Sextant of `b` as seen from `a`, after folding the delta.
    pub fn sextant_between(&self, a: Coord, b: Coord) -> Option<Sextant> {
        let delta = self.canonicalize(b.x - a.x, b.y - a.y);
        Sextant::of(delta.x, delta.y)
    }

    /// The ordered ring of cells at the given distance: clockwise, starting
    /// from the North sextant, 6·distance entries. Holes are included; on
    /// small maps a wrapped ring may repeat coordinates, so consumers dedupe
    /// preserving first occurrence.
    pub fn ring(&self, center: Coord, distance: i32) -> Vec<Coord> {
        assert!(distance > 0, "ring distance must be positive");
        let mut coords = Vec::with_capacity(6 * distance as usize);

        // North sextant
        for x in (-distance + 1)..=0 {
            coords.push(self.canonicalize(center.x + x, center.y + distance));
        }
        // North-east sextant
        for x in 1..=distance {
            coords.push(self.canonicalize(center.x + x, center.y + distance - x));
        }
        // South-east sextant
        for y in (-distance..=-1).rev() {
            coords.push(self.canonicalize(center.x + distance, center.y + y));
        }
        // South sextant
        for x in (0..=(distance - 1)).rev() {
            coords.push(self.canonicalize(center.x + x, center.y - distance));
        }
        // South-west sextant
        for x in (-distance..=-1).rev() {
            coords.push(self.canonicalize(center.x + x, center.y - distance - x));
        }
        // North-west sextant
        for y in 1..=distance {
            coords.push(self.canonicalize(center.x - distance, center.y + y));
        }

        coords
    }

    /// Adjacency ring; holes included, see [`Board::ring`].
    pub fn adjacent(&self, center: Coord) -> Vec<Coord> {
        self.ring(center, 1)
    }

    /// Starting seats at maximal mutual distance: three on a hexagon
    /// (120-degree rotations of one seat), two on a rhombus/square
    /// (opposite corners of the NE/SW diagonal). Seat coordinates are
    /// chosen to stay clear of every hole lattice.
    pub fn starting_coords(&self) -> Vec<Coord> {
        match self.shape {
            Shape::Hexagon => {
                let max = self.length - 1;
                let start = (max + 1) / 2;
                vec![
                    Coord::new(start, 0),
                    Coord::new(-start, start),
                    Coord::new(0, -start),
                ]
            }
            Shape::Rhombus | Shape::Square => {
                let max = self.length - 1 + (self.length + 1) / 3;
                let x = (max + 3) / 4;
                let y = max / 4;
                vec![Coord::new(x, y), Coord::new(-x, -y)]
            }
        }
    }

    /// Draws a uniformly random non-hole cell.
    pub fn random_cell<R: Rng>(&self, rng: &mut R) -> Coord {
        loop {
            let x = rng.gen_range(0..self.diameter);
            let y = rng.gen_range(0..self.diameter);
            let coord = self.canonicalize(x, y);
            if !self.cell(coord).is_hole {
                return coord;
            }
        }
    }

    /// Draws a uniformly random empty non-hole cell.
    pub fn random_empty_cell<R: Rng>(&self, rng: &mut R) -> Coord {
        loop {
            let coord = self.random_cell(rng);
            if self.cell(coord).is_empty() {
                return coord;
            }
        }
    }

    /// True when the hole lattice tiles seamlessly across the wrap for this
    /// shape and length. Misaligned combinations still play, but the lattice
    /// period breaks at the fold.
    pub fn hole_lattice_aligned(&self) -> bool {
        match (self.degrees_of_freedom, self.shape) {
            (DegreesOfFreedom::Six, _) => true,
            (DegreesOfFreedom::Three, Shape::Rhombus | Shape::Square) => self.length % 3 == 2,
            (DegreesOfFreedom::Five, Shape::Rhombus | Shape::Square) => self.length % 7 == 4,
            (DegreesOfFreedom::Five, Shape::Hexagon) => self.length % 7 == 2,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_counts_per_shape() {
        let hexagon = Board::new(4, Shape::Hexagon, DegreesOfFreedom::Six);
        assert_eq!(hexagon.total_cells(), 37);
        assert_eq!(hexagon.cells().count(), 37);

        let rhombus = Board::new(4, Shape::Rhombus, DegreesOfFreedom::Six);
        assert_eq!(rhombus.total_cells(), 49);
        assert_eq!(rhombus.cells().count(), 49);
    }

    #[test]
    fn test_canonicalization_is_idempotent() {
        for shape in [Shape::Hexagon, Shape::Rhombus] {
            let board = Board::new(5, shape, DegreesOfFreedom::Six);
            for x in -13..=13 {
                for y in -13..=13 {
                    let once = board.canonicalize(x, y);
                    let twice = board.canonicalize(once.x, once.y);
                    assert_eq!(once, twice, "({x},{y}) on {shape:?}");
                    assert!(board.is_canonical(once.x, once.y));
                }
            }
        }
    }

    #[test]
    fn test_hexagon_fold_wraps_to_the_far_side() {
        let board = Board::new(3, Shape::Hexagon, DegreesOfFreedom::Six);
        // One step north out of the top corner re-enters from the south.
        assert_eq!(board.canonicalize(0, 3), Coord::new(2, -2));
        // Walking east along y=0 wraps onto the western edge.
        assert_eq!(board.canonicalize(3, 0), Coord::new(0, -2));
    }

    #[test]
    fn test_rhombus_fold_is_modular_on_both_axes() {
        let board = Board::new(3, Shape::Rhombus, DegreesOfFreedom::Six);
        assert_eq!(board.canonicalize(3, 0), Coord::new(-2, 0));
        assert_eq!(board.canonicalize(-3, -4), Coord::new(2, 1));
    }

    #[test]
    fn test_distance_is_symmetric_across_folds() {
        for shape in [Shape::Hexagon, Shape::Rhombus] {
            let board = Board::new(4, shape, DegreesOfFreedom::Six);
            let coords: Vec<Coord> = board.cells().map(|c| c.coord).collect();
            for &a in &coords {
                for &b in &coords {
                    assert_eq!(
                        board.distance(a, b),
                        board.distance(b, a),
                        "{a} vs {b} on {shape:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_distance_uses_the_wrap_shortcut() {
        let board = Board::new(4, Shape::Hexagon, DegreesOfFreedom::Six);
        // One step north out of the top edge lands on this far-side cell,
        // so the two are neighbours through the wrap.
        let a = Coord::new(0, 3);
        let b = board.canonicalize(0, 4);
        assert_eq!(b, Coord::new(3, -3));
        assert_eq!(board.distance(a, b), 1);
    }

    #[test]
    fn test_rhombus_fold_distance_accounts_for_the_triangle() {
        let board = Board::new(4, Shape::Rhombus, DegreesOfFreedom::Six);
        // Delta (3,3) crosses the NE/SW fold; the plain hex formula would
        // say 6, the wrap shortcut is shorter.
        let a = Coord::new(-3, -3);
        let b = Coord::new(0, 0);
        let d = board.distance(a, b);
        assert!(d < 6, "expected the fold shortcut, got {d}");
        assert_eq!(d, board.distance(b, a));
    }

    #[test]
    fn test_adjacency_ring_order_and_size() {
        let board = Board::new(5, Shape::Hexagon, DegreesOfFreedom::Six);
        let ring = board.adjacent(Coord::new(0, 0));
        assert_eq!(
            ring,
            vec![
                Coord::new(0, 1),   // North
                Coord::new(1, 0),   // North-east
                Coord::new(1, -1),  // South-east
                Coord::new(0, -1),  // South
                Coord::new(-1, 0),  // South-west
                Coord::new(-1, 1),  // North-west
            ]
        );
    }

    #[test]
    fn test_rings_have_six_d_entries_at_distance_d() {
        let board = Board::new(9, Shape::Hexagon, DegreesOfFreedom::Six);
        for d in 1..4 {
            let ring = board.ring(Coord::new(0, 0), d);
            assert_eq!(ring.len(), 6 * d as usize);
            for coord in ring {
                assert_eq!(board.distance(Coord::new(0, 0), coord), d);
            }
        }
    }

    #[test]
    fn test_hole_lattice_densities() {
        // One cell in three for the triangular lattice.
        let count = (0..3)
            .flat_map(|x| (0..3).map(move |y| (x, y)))
            .filter(|&(x, y)| is_hole(x, y, DegreesOfFreedom::Three))
            .count();
        assert_eq!(count, 3);

        // One cell in seven for the pentagonal lattice.
        let count = (0..7)
            .flat_map(|x| (0..7).map(move |y| (x, y)))
            .filter(|&(x, y)| is_hole(x, y, DegreesOfFreedom::Five))
            .count();
        assert_eq!(count, 7);

        assert!(!is_hole(0, 0, DegreesOfFreedom::Six));
    }

    #[test]
    fn test_starting_seats_are_distinct_and_canonical() {
        for shape in [Shape::Hexagon, Shape::Rhombus] {
            let board = Board::new(9, shape, DegreesOfFreedom::Six);
            let seats = board.starting_coords();
            for (i, &a) in seats.iter().enumerate() {
                assert!(board.is_canonical(a.x, a.y));
                for &b in &seats[i + 1..] {
                    assert_ne!(a, b);
                }
            }
        }
    }

    #[test]
    fn test_starting_seats_avoid_the_usable_hole_lattices() {
        for degrees_of_freedom in [
            DegreesOfFreedom::Three,
            DegreesOfFreedom::Five,
            DegreesOfFreedom::Six,
        ] {
            let board = Board::new(9, Shape::Hexagon, degrees_of_freedom);
            for seat in board.starting_coords() {
                assert!(
                    !board.cell(seat).is_hole,
                    "seat {seat} is a hole under {degrees_of_freedom:?}"
                );
            }
        }
    }

    #[test]
    fn test_default_unit_count_is_odd() {
        for degrees_of_freedom in [
            DegreesOfFreedom::Three,
            DegreesOfFreedom::Four,
            DegreesOfFreedom::Five,
            DegreesOfFreedom::Six,
        ] {
            let board = Board::new(9, Shape::Hexagon, degrees_of_freedom);
            assert_eq!(board.default_unit_count() % 2, 1);
            assert!(board.default_unit_count() < board.total_cells());
        }
    }
}
