//! Decision policies - external producers of per-unit orders
//!
//! The engine treats decision making as an opaque collaborator: given the
//! game (for fog-of-war-gated queries), a policy returns zero or one order
//! per unit the player owns. The reference implementations below double as
//! demo players and test drivers; richer archetypes live outside the core.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand::SeedableRng;

use crate::core::types::{PlayerId, UnitId};
use crate::game::{Game, Order};

pub trait Policy {
    /// Produces the player's orders for the round about to be played.
    fn decide(&mut self, game: &mut Game, player: PlayerId) -> Vec<(UnitId, Order)>;
}

/// Holds every unit in place. The stance of the passive resource player.
#[derive(Debug, Clone, Copy, Default)]
pub struct HoldPolicy;

impl Policy for HoldPolicy {
    fn decide(&mut self, game: &mut Game, player: PlayerId) -> Vec<(UnitId, Order)> {
        game.units_of(player)
            .into_iter()
            .map(|unit| (unit, Order::Hold))
            .collect()
    }
}

/// Wanders: holds roughly 40% of the time, otherwise steps onto a random
/// adjacent cell. Carries its own seeded RNG so runs stay reproducible.
#[derive(Debug, Clone)]
pub struct RandomWalkPolicy {
    rng: ChaCha8Rng,
}

impl RandomWalkPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomWalkPolicy {
    fn decide(&mut self, game: &mut Game, player: PlayerId) -> Vec<(UnitId, Order)> {
        let mut orders = Vec::new();
        for unit in game.units_of(player) {
            if self.rng.gen_bool(0.4) {
                orders.push((unit, Order::Hold));
                continue;
            }
            let cells = game.selectable_cells(unit);
            if cells.is_empty() {
                orders.push((unit, Order::Hold));
            } else {
                let pick = cells[self.rng.gen_range(0..cells.len())];
                orders.push((unit, Order::Target(pick)));
            }
        }
        orders
    }
}

/// Chases the closest visible enemy of each unit; holds when nothing is in
/// sight.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChasePolicy;

impl Policy for ChasePolicy {
    fn decide(&mut self, game: &mut Game, player: PlayerId) -> Vec<(UnitId, Order)> {
        let mut orders = Vec::new();
        for unit in game.units_of(player) {
            let at = game.unit(unit).cell;
            let mut prey: Option<(i32, crate::grid::cell::Coord)> = None;
            for coord in game.visible_cells(unit) {
                let Some(occupant) = game.board().occupant(coord) else {
                    continue;
                };
                if game.unit(occupant).owner == player {
                    continue;
                }
                let distance = game.board().distance(at, coord);
                if prey.map_or(true, |(best, _)| distance < best) {
                    prey = Some((distance, coord));
                }
            }
            let order = match prey {
                Some((_, coord)) => Order::Target(coord),
                None => Order::Hold,
            };
            orders.push((unit, order));
        }
        orders
    }
}
