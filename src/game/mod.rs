//! Game orchestration - players, entity arenas and the round lifecycle
//!
//! The game owns every arena (cells through the board, units, players) and
//! all relations between them are id-to-id mappings. Policy code never
//! mutates occupancy or ownership directly; only the resolver's grant
//! actions do.

pub mod placement;

pub use placement::ResourcePattern;

use ahash::{AHashMap, AHashSet};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::GameConfig;
use crate::core::error::Result;
use crate::core::types::{IdAllocator, PlayerId, UnitId};
use crate::grid::board::{Board, DegreesOfFreedom};
use crate::grid::cell::Coord;
use crate::round::intent::Intent;
use crate::round::step::Direction;
use crate::round::{resolver, Round};
use crate::units::Unit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Active,
    Over,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerStatus {
    Playing,
    Defeated,
    Victorious,
}

/// One participant. The passive resource player is created by the game
/// itself and simply owns the neutral units scattered at start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub status: PlayerStatus,
    pub starting_cell: Option<Coord>,
    pub units: AHashSet<UnitId>,
}

impl Player {
    fn new(id: PlayerId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            status: PlayerStatus::Playing,
            starting_cell: None,
            units: AHashSet::new(),
        }
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }
}

/// One order for one unit, as accepted from policy code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Work toward the given cell; raw coordinates are folded on submission.
    Target(Coord),
    /// Keep walking along a fixed heading.
    March(Direction),
    /// Stay put.
    Hold,
}

#[derive(Debug, Clone)]
pub struct Game {
    config: GameConfig,
    board: Board,
    players: AHashMap<PlayerId, Player>,
    units: AHashMap<UnitId, Unit>,
    current_round: Round,
    previous_round: Option<Round>,
    round_counter: u64,
    status: GameStatus,
    resource_player: PlayerId,
    ids: IdAllocator,
    rng: ChaCha8Rng,
}

impl Game {
    /// Builds a game: board, seated players (one starting unit each, as
    /// many seats as the shape offers), the passive resource player, and
    /// the configured resource placement.
    pub fn new(config: GameConfig, player_names: &[&str]) -> Result<Game> {
        config.validate()?;
        let board = Board::new(config.length, config.shape, config.degrees_of_freedom);
        if config.degrees_of_freedom != DegreesOfFreedom::Six && !board.hole_lattice_aligned() {
            tracing::warn!(
                "hole lattice {:?} does not tile length {} on a {:?} board; the pattern breaks at the fold",
                config.degrees_of_freedom,
                config.length,
                config.shape
            );
        }

        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut game = Game {
            config,
            board,
            players: AHashMap::new(),
            units: AHashMap::new(),
            current_round: Round::new(0),
            previous_round: None,
            round_counter: 0,
            status: GameStatus::Active,
            resource_player: PlayerId(0),
            ids: IdAllocator::new(),
            rng,
        };

        game.resource_player = game.add_player("Resource");

        let seats = game.board.starting_coords();
        for (index, name) in player_names.iter().enumerate() {
            let player = game.add_player(name);
            if let Some(&seat) = seats.get(index) {
                game.players
                    .get_mut(&player)
                    .expect("player just added")
                    .starting_cell = Some(seat);
                game.spawn_unit(player, seat);
            }
        }

        placement::place_resources(&mut game);
        game.assert_consistent();
        Ok(game)
    }

    /// Registers a new player without units.
    pub fn add_player(&mut self, name: &str) -> PlayerId {
        let id = self.ids.next_player_id();
        self.players.insert(id, Player::new(id, name));
        id
    }

    /// Creates a unit on an empty non-hole cell. Spawning marks the cell as
    /// observed by the owner.
    pub fn spawn_unit(&mut self, owner: PlayerId, at: Coord) -> UnitId {
        assert!(
            self.players.contains_key(&owner),
            "spawning a unit for an unknown player"
        );
        {
            let cell = self.board.cell(at);
            assert!(!cell.is_hole, "cannot spawn a unit on the hole at {at}");
            assert!(
                cell.is_empty(),
                "cannot spawn a unit on the occupied cell {at}"
            );
        }

        let id = self.ids.next_unit_id();
        self.units.insert(id, Unit::new(id, owner, at));
        let cell = self.board.cell_mut(at);
        cell.occupant = Some(id);
        cell.observed_by.insert(owner);
        self.players
            .get_mut(&owner)
            .expect("owner checked above")
            .units
            .insert(id);
        id
    }

    // --- accessors ---------------------------------------------------

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn resource_player(&self) -> PlayerId {
        self.resource_player
    }

    /// Number of the round currently accepting orders.
    pub fn round_number(&self) -> u64 {
        self.round_counter
    }

    pub fn current_round(&self) -> &Round {
        &self.current_round
    }

    pub fn previous_round(&self) -> Option<&Round> {
        self.previous_round.as_ref()
    }

    pub fn unit(&self, id: UnitId) -> &Unit {
        self.units.get(&id).expect("unknown unit id")
    }

    pub fn player(&self, id: PlayerId) -> &Player {
        self.players.get(&id).expect("unknown player id")
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// All unit ids in ascending order.
    pub fn unit_ids(&self) -> Vec<UnitId> {
        let mut ids: Vec<UnitId> = self.units.keys().copied().collect();
        ids.sort();
        ids
    }

    /// All player ids in ascending order.
    pub fn player_ids(&self) -> Vec<PlayerId> {
        let mut ids: Vec<PlayerId> = self.players.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Unit ids owned by one player, in ascending order.
    pub fn units_of(&self, player: PlayerId) -> Vec<UnitId> {
        let mut ids: Vec<UnitId> = self.player(player).units.iter().copied().collect();
        ids.sort();
        ids
    }

    // --- per-round unit queries --------------------------------------

    /// Adjacent non-hole cells, in clockwise ring order starting North.
    /// Memoized until the next round begins.
    pub fn selectable_cells(&mut self, unit: UnitId) -> Vec<Coord> {
        if let Some(cached) = self.unit(unit).selectable_cache() {
            return cached.clone();
        }
        let at = self.unit(unit).cell;
        let mut cells: Vec<Coord> = Vec::with_capacity(6);
        for coord in self.board.adjacent(at) {
            if !self.board.cell(coord).is_hole && !cells.contains(&coord) {
                cells.push(coord);
            }
        }
        self.unit_mut(unit).set_selectable_cache(cells.clone());
        cells
    }

    /// The two-ring neighbourhood: the unit's adjacent non-hole cells plus
    /// each of their adjacent non-hole cells (which re-includes the unit's
    /// own cell, and shadows anything behind an unbroken hole wall).
    /// Memoized until the next round begins; marks every returned cell as
    /// observed by the owner.
    pub fn visible_cells(&mut self, unit: UnitId) -> Vec<Coord> {
        if let Some(cached) = self.unit(unit).visible_cache() {
            return cached.clone();
        }
        let owner = self.unit(unit).owner;
        let at = self.unit(unit).cell;
        let mut cells: Vec<Coord> = Vec::new();
        for near in self.board.adjacent(at) {
            if self.board.cell(near).is_hole {
                continue;
            }
            if !cells.contains(&near) {
                cells.push(near);
            }
            self.board.cell_mut(near).observed_by.insert(owner);
            for far in self.board.adjacent(near) {
                if self.board.cell(far).is_hole {
                    continue;
                }
                if !cells.contains(&far) {
                    cells.push(far);
                }
                self.board.cell_mut(far).observed_by.insert(owner);
            }
        }
        self.unit_mut(unit).set_visible_cache(cells.clone());
        cells
    }

    /// Union of the visible sets of all the player's units.
    pub fn player_visible_cells(&mut self, player: PlayerId) -> AHashSet<Coord> {
        let mut all = AHashSet::new();
        for unit in self.units_of(player) {
            all.extend(self.visible_cells(unit));
        }
        all
    }

    /// The selectable cell closest to `target`, breaking distance ties by
    /// the fewest clockwise turns from the candidate's sextant toward the
    /// target's sextant; biases paths toward fewer direction changes.
    /// Returns the current cell when already on the target.
    pub fn closest_selectable_cell(&mut self, unit: UnitId, target: Coord) -> Coord {
        let current = self.unit(unit).cell;
        if current == target {
            return current;
        }
        let target_sextant = self.board.sextant_between(current, target);
        let mut best = current;
        let mut best_distance = self.board.diameter() + 1;
        let mut best_turns = 6;
        for candidate in self.selectable_cells(unit) {
            let distance = self.board.distance(target, candidate);
            let turns = match (self.board.sextant_between(current, candidate), target_sextant) {
                (Some(from), Some(to)) => from.turns_to(to),
                _ => 6,
            };
            if distance < best_distance || (distance == best_distance && turns < best_turns) {
                best_distance = distance;
                best_turns = turns;
                best = candidate;
            }
        }
        best
    }

    /// The selectable cell maximizing the summed distance to the given
    /// units, breaking ties toward candidates that keep more of those units
    /// inside their own adjacency (still watching the threats). Returns the
    /// current cell when there is nowhere better.
    pub fn farthest_selectable_cell(&mut self, unit: UnitId, threats: &[UnitId]) -> Coord {
        let mut best = self.unit(unit).cell;
        let mut best_total = 0;
        let mut best_watched = 0;
        for candidate in self.selectable_cells(unit) {
            let near: AHashSet<Coord> = self.board.adjacent(candidate).into_iter().collect();
            let mut total = 0;
            let mut watched = 0;
            for &threat in threats {
                let at = self.unit(threat).cell;
                total += self.board.distance(at, candidate);
                if near.contains(&at) {
                    watched += 1;
                }
            }
            if total > best_total || (total == best_total && watched > best_watched) {
                best_total = total;
                best_watched = watched;
                best = candidate;
            }
        }
        best
    }

    // --- orders and the round lifecycle ------------------------------

    /// Submits one order for one unit, overwriting any pending intent the
    /// unit already had this round.
    pub fn submit_order(&mut self, unit: UnitId, order: Order) {
        assert!(
            self.units.contains_key(&unit),
            "submitting an order for an unknown unit"
        );
        let intent = match order {
            Order::Hold => {
                let at = self.unit(unit).cell;
                Intent::build(self, unit, at, false)
            }
            Order::Target(raw) => {
                let target = self.board.canonicalize(raw.x, raw.y);
                Intent::build(self, unit, target, false)
            }
            Order::March(direction) => {
                assert!(
                    direction != Direction::None,
                    "a march order needs a heading"
                );
                let at = self.unit(unit).cell;
                let (dx, dy) = direction.delta();
                let target = self.board.canonicalize(at.x + dx, at.y + dy);
                Intent::build(self, unit, target, true)
            }
        };
        self.current_round.intents.insert(unit, intent);
    }

    /// Re-submits the unit's previous intent, re-derived from its current
    /// position. Returns false when the unit has no previous intent.
    pub fn submit_cloned_previous(&mut self, unit: UnitId) -> bool {
        let Some(previous) = self.unit(unit).previous_intent.clone() else {
            return false;
        };
        let intent = Intent::clone_from(self, &previous);
        self.current_round.intents.insert(unit, intent);
        true
    }

    /// Runs one full round: caches reset, implicit holds for unordered
    /// units, resolution, victory evaluation, round rotation. Returns the
    /// completed round.
    pub fn advance_round(&mut self) -> Result<&Round> {
        let unit_ids = self.unit_ids();
        for &id in &unit_ids {
            self.units
                .get_mut(&id)
                .expect("unit listed above")
                .invalidate_caches();
        }
        for &id in &unit_ids {
            if !self.current_round.intents.contains_key(&id) {
                self.submit_order(id, Order::Hold);
            }
        }

        resolver::resolve_round(self)?;

        let total_units = self.units.len();
        for player_id in self.player_ids() {
            let owned = self.player(player_id).unit_count();
            let player = self.players.get_mut(&player_id).expect("player listed");
            if owned == 0 {
                player.status = PlayerStatus::Defeated;
            } else if owned == total_units {
                player.status = PlayerStatus::Victorious;
                self.status = GameStatus::Over;
            }
        }

        tracing::debug!(
            "round {} resolved: {}/{} intents granted",
            self.current_round.number,
            self.current_round.granted_intents,
            self.current_round.total_intents
        );

        self.round_counter += 1;
        let finished = std::mem::replace(&mut self.current_round, Round::new(self.round_counter));
        self.previous_round = Some(finished);

        self.assert_consistent();
        Ok(self.previous_round.as_ref().expect("round just completed"))
    }

    /// Audits the cross-arena invariants. Any violation is a defect in the
    /// engine itself and fails immediately rather than corrupting the next
    /// round's determinism.
    pub fn assert_consistent(&self) {
        let mut occupied: AHashSet<Coord> = AHashSet::new();
        for unit in self.units.values() {
            let cell = self.board.cell(unit.cell);
            assert!(!cell.is_hole, "unit {:?} stands on a hole", unit.id);
            assert_eq!(
                cell.occupant,
                Some(unit.id),
                "cell {} does not track its occupant",
                unit.cell
            );
            assert!(
                self.player(unit.owner).units.contains(&unit.id),
                "player {:?} does not track unit {:?}",
                unit.owner,
                unit.id
            );
            assert!(
                occupied.insert(unit.cell),
                "two units share the cell {}",
                unit.cell
            );
        }
        for cell in self.board.cells() {
            if let Some(id) = cell.occupant {
                assert!(!cell.is_hole, "hole {} is occupied", cell.coord);
                assert_eq!(
                    self.unit(id).cell,
                    cell.coord,
                    "unit {id:?} does not know it stands on {}",
                    cell.coord
                );
            }
        }
        if let Some(round) = &self.previous_round {
            for intent in round.intents.values() {
                assert!(
                    !intent.is_pending(),
                    "completed round {} left unit {:?} pending",
                    round.number,
                    intent.unit
                );
            }
        }
    }

    // --- crate-internal mutation used by the resolver ----------------

    pub(crate) fn unit_mut(&mut self, id: UnitId) -> &mut Unit {
        self.units.get_mut(&id).expect("unknown unit id")
    }

    pub(crate) fn current_round_mut(&mut self) -> &mut Round {
        &mut self.current_round
    }

    pub(crate) fn take_current_intents(&mut self) -> AHashMap<UnitId, Intent> {
        std::mem::take(&mut self.current_round.intents)
    }

    pub(crate) fn restore_current_intents(&mut self, intents: AHashMap<UnitId, Intent>) {
        self.current_round.intents = intents;
    }

    pub(crate) fn complete_current_round(&mut self, granted: usize, total: usize) {
        self.current_round.granted_intents = granted;
        self.current_round.total_intents = total;
        self.current_round.status = crate::round::RoundStatus::Completed;
    }

    /// Moves a unit onto an empty non-hole cell, marking the destination as
    /// observed by the owner.
    pub(crate) fn move_unit(&mut self, id: UnitId, to: Coord) {
        let owner = {
            let unit = self.unit(id);
            assert!(
                self.board.occupant(to).is_none(),
                "moving {id:?} onto the occupied cell {to}"
            );
            assert!(
                !self.board.cell(to).is_hole,
                "moving {id:?} into the hole at {to}"
            );
            unit.owner
        };
        let from = self.unit(id).cell;
        self.board.cell_mut(from).occupant = None;
        let unit = self.unit_mut(id);
        unit.previous_cell = Some(from);
        unit.cell = to;
        let cell = self.board.cell_mut(to);
        cell.occupant = Some(id);
        cell.observed_by.insert(owner);
    }

    /// Transfers a unit between players.
    pub(crate) fn transfer_unit(&mut self, id: UnitId, new_owner: PlayerId) {
        let old_owner = self.unit(id).owner;
        self.players
            .get_mut(&old_owner)
            .expect("unknown old owner")
            .units
            .remove(&id);
        let unit = self.unit_mut(id);
        unit.previous_owner = Some(old_owner);
        unit.owner = new_owner;
        self.players
            .get_mut(&new_owner)
            .expect("unknown new owner")
            .units
            .insert(id);
    }

    pub(crate) fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    pub(crate) fn board_and_rng(&mut self) -> (&Board, &mut ChaCha8Rng) {
        (&self.board, &mut self.rng)
    }
}
