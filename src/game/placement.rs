//! Resource placement - seeding the board with passive neutral units

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::grid::board::{self, DegreesOfFreedom};
use crate::grid::cell::Coord;
use crate::grid::compass;

use super::Game;

/// How the passive resource units are scattered at game start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourcePattern {
    /// Completely random empty cells.
    Casual,
    /// Regular intervals on the pentagonal lattice, evenly distributed.
    Uniform,
    /// Random placement mirrored through the sixfold snowflake symmetry.
    Snowflake,
    /// No resources at all.
    Empty,
}

/// Fills the board with resource units until the board's default unit count
/// is reached (Uniform places one per lattice position instead).
pub(super) fn place_resources(game: &mut Game) {
    let owner = game.resource_player();
    match game.config().resource_pattern {
        ResourcePattern::Casual => {
            while game.unit_count() < game.board().default_unit_count() {
                let cell = {
                    let (board, rng) = game.board_and_rng();
                    board.random_empty_cell(rng)
                };
                game.spawn_unit(owner, cell);
            }
        }
        ResourcePattern::Uniform => {
            let mut lattice: Vec<Coord> = game
                .board()
                .cells()
                .filter(|cell| {
                    !cell.is_hole
                        && cell.is_empty()
                        && board::is_hole(cell.coord.x, cell.coord.y, DegreesOfFreedom::Five)
                })
                .map(|cell| cell.coord)
                .collect();
            lattice.sort();
            for coord in lattice {
                game.spawn_unit(owner, coord);
            }
        }
        ResourcePattern::Snowflake => place_snowflake(game, owner),
        ResourcePattern::Empty => {}
    }
}

/// Walks one sextant's triangle of cells and, with a density proportional
/// to the target count, stamps each accepted cell together with its six
/// rotations and their mirror twins.
fn place_snowflake(game: &mut Game, owner: crate::core::types::PlayerId) {
    let target = game.board().default_unit_count();
    let total = game.board().total_cells();
    let density = (target as f64 / total as f64).min(1.0);
    let length = game.board().length();
    let mut placed = 0;

    let center = game.board().canonicalize(0, 0);
    if !game.board().cell(center).is_hole && game.board().cell(center).is_empty() {
        game.spawn_unit(owner, center);
        placed += 1;
    }

    while placed < target {
        for y in 0..length {
            for x in 0..(length - y) {
                if placed >= target {
                    break;
                }
                if !game.rng().gen_bool(density) {
                    continue;
                }
                for (sx, sy) in symmetric_family(x, y) {
                    let coord = game.board().canonicalize(sx, sy);
                    let cell = game.board().cell(coord);
                    if !cell.is_hole && cell.is_empty() {
                        game.spawn_unit(owner, coord);
                        placed += 1;
                    }
                }
            }
        }
    }
}

/// The twelve snowflake images of a point: its six sextant rotations plus
/// the mirrored twin of each.
fn symmetric_family(x: i32, y: i32) -> [(i32, i32); 12] {
    let mut family = [(0, 0); 12];
    for turn in 0..6 {
        family[turn as usize] = compass::rotate(x, y, turn);
        family[6 + turn as usize] = compass::rotate(y, x, turn);
    }
    family
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GameConfig;
    use crate::grid::board::Shape;

    fn config(resource_pattern: ResourcePattern) -> GameConfig {
        GameConfig {
            length: 5,
            shape: Shape::Hexagon,
            degrees_of_freedom: DegreesOfFreedom::Six,
            resource_pattern,
            invulnerable_units: false,
            seed: 99,
        }
    }

    #[test]
    fn test_empty_pattern_places_nothing() {
        let game = Game::new(config(ResourcePattern::Empty), &[]).unwrap();
        assert_eq!(game.unit_count(), 0);
    }

    #[test]
    fn test_casual_pattern_reaches_the_default_count() {
        let game = Game::new(config(ResourcePattern::Casual), &[]).unwrap();
        assert_eq!(game.unit_count(), game.board().default_unit_count());
    }

    #[test]
    fn test_snowflake_pattern_reaches_the_default_count() {
        let game = Game::new(config(ResourcePattern::Snowflake), &[]).unwrap();
        assert!(game.unit_count() >= game.board().default_unit_count());
    }

    #[test]
    fn test_uniform_pattern_follows_the_pentagonal_lattice() {
        let game = Game::new(config(ResourcePattern::Uniform), &[]).unwrap();
        assert!(game.unit_count() > 0);
        for unit_id in game.unit_ids() {
            let at = game.unit(unit_id).cell;
            assert!(board::is_hole(at.x, at.y, DegreesOfFreedom::Five));
        }
    }

    #[test]
    fn test_same_seed_places_identically() {
        let a = Game::new(config(ResourcePattern::Snowflake), &[]).unwrap();
        let b = Game::new(config(ResourcePattern::Snowflake), &[]).unwrap();
        let cells_a: Vec<_> = a.unit_ids().iter().map(|&u| a.unit(u).cell).collect();
        let cells_b: Vec<_> = b.unit_ids().iter().map(|&u| b.unit(u).cell).collect();
        assert_eq!(cells_a, cells_b);
    }
}
