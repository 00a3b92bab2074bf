//! Direction and rotation arithmetic over the six hex sextants

use serde::{Deserialize, Serialize};

/// One sixth of the map, relative to its center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sextant {
    North,
    NorthEast,
    SouthEast,
    South,
    SouthWest,
    NorthWest,
}

impl Sextant {
    /// Clockwise sextant order, starting North. Paths that follow this
    /// ordering minimise the number of turns toward a target.
    pub const CLOCKWISE: [Sextant; 6] = [
        Sextant::North,
        Sextant::NorthEast,
        Sextant::SouthEast,
        Sextant::South,
        Sextant::SouthWest,
        Sextant::NorthWest,
    ];

    /// Classifies a coordinate delta by sign tests on x, y and x+y.
    /// The origin lies in no sextant.
    pub fn of(x: i32, y: i32) -> Option<Sextant> {
        if x <= 0 && y > 0 && x + y > 0 {
            Some(Sextant::North)
        } else if x > 0 && y >= 0 {
            Some(Sextant::NorthEast)
        } else if x > 0 && y < 0 && x + y >= 0 {
            Some(Sextant::SouthEast)
        } else if x >= 0 && y < 0 && x + y < 0 {
            Some(Sextant::South)
        } else if x < 0 && y <= 0 {
            Some(Sextant::SouthWest)
        } else if x < 0 && y > 0 && x + y <= 0 {
            Some(Sextant::NorthWest)
        } else {
            None
        }
    }

    fn index(self) -> i32 {
        match self {
            Sextant::North => 0,
            Sextant::NorthEast => 1,
            Sextant::SouthEast => 2,
            Sextant::South => 3,
            Sextant::SouthWest => 4,
            Sextant::NorthWest => 5,
        }
    }

    /// Number of clockwise turns needed to reach `to` from `self`.
    pub fn turns_to(self, to: Sextant) -> i32 {
        let turns = to.index() - self.index();
        if turns >= 0 {
            turns
        } else {
            turns + 6
        }
    }
}

/// Rotates a coordinate pair by `turns` sextants clockwise (negative turns
/// rotate anticlockwise). Closed-form linear transform per residue; the
/// cycle length is 6.
pub fn rotate(x: i32, y: i32, turns: i32) -> (i32, i32) {
    match turns.rem_euclid(6) {
        1 => (x + y, -x),
        2 => (y, -x - y),
        3 => (-x, -y),
        4 => (-x - y, x),
        5 => (-y, x + y),
        _ => (x, y),
    }
}

/// Walks the depth of the triangular cell disposition at the north-east
/// fold of a wrap-around rhombus. The returned depth feeds the shortcut
/// term of the rhombus distance.
pub fn explore_depth(x: i32, y: i32, max: i32, max_sum: i32) -> i32 {
    if x == max || y == max || x + y == max_sum {
        1
    } else {
        1 + explore_depth(x, y, max - 1, max_sum + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sextant_classification() {
        assert_eq!(Sextant::of(0, 3), Some(Sextant::North));
        assert_eq!(Sextant::of(-1, 3), Some(Sextant::North));
        assert_eq!(Sextant::of(2, 0), Some(Sextant::NorthEast));
        assert_eq!(Sextant::of(2, 1), Some(Sextant::NorthEast));
        assert_eq!(Sextant::of(3, -2), Some(Sextant::SouthEast));
        assert_eq!(Sextant::of(0, -3), Some(Sextant::South));
        assert_eq!(Sextant::of(1, -3), Some(Sextant::South));
        assert_eq!(Sextant::of(-2, 0), Some(Sextant::SouthWest));
        assert_eq!(Sextant::of(-2, -1), Some(Sextant::SouthWest));
        assert_eq!(Sextant::of(-3, 2), Some(Sextant::NorthWest));
        assert_eq!(Sextant::of(0, 0), None);
    }

    #[test]
    fn test_every_nonzero_delta_has_a_sextant() {
        for x in -4..=4 {
            for y in -4..=4 {
                if x == 0 && y == 0 {
                    continue;
                }
                assert!(Sextant::of(x, y).is_some(), "unclassified delta ({x},{y})");
            }
        }
    }

    #[test]
    fn test_turn_counts_follow_clockwise_order() {
        assert_eq!(Sextant::North.turns_to(Sextant::North), 0);
        assert_eq!(Sextant::North.turns_to(Sextant::SouthEast), 2);
        assert_eq!(Sextant::SouthEast.turns_to(Sextant::North), 4);
        assert_eq!(Sextant::NorthWest.turns_to(Sextant::North), 1);
    }

    #[test]
    fn test_rotation_cycle_length_is_six() {
        let (x, y) = (3, -1);
        assert_eq!(rotate(x, y, 6), (x, y));
        assert_eq!(rotate(x, y, -6), (x, y));

        let mut point = (x, y);
        for _ in 0..6 {
            point = rotate(point.0, point.1, 1);
        }
        assert_eq!(point, (x, y));
    }

    #[test]
    fn test_rotation_preserves_sextant_succession() {
        // One clockwise turn moves a point one sextant along the ordering.
        let (x, y) = rotate(0, 2, 1);
        assert_eq!(Sextant::of(x, y), Some(Sextant::NorthEast));
        let (x, y) = rotate(x, y, 1);
        assert_eq!(Sextant::of(x, y), Some(Sextant::SouthEast));
    }

    #[test]
    fn test_clockwise_and_anticlockwise_cancel() {
        for x in -3..=3 {
            for y in -3..=3 {
                let cw = rotate(x, y, 1);
                assert_eq!(rotate(cw.0, cw.1, -1), (x, y));
            }
        }
    }

    #[test]
    fn test_explore_depth_hits_the_boundary() {
        // Already on the edge of the triangle: depth 1.
        assert_eq!(explore_depth(4, 0, 4, 5), 1);
        assert_eq!(explore_depth(2, 3, 4, 5), 1);
        // One step inside: the recursion shrinks the triangle once.
        assert_eq!(explore_depth(3, 1, 4, 5), 2);
    }
}
