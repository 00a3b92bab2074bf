//! End-to-end tests for the round resolution pipeline

use hexfold::core::config::GameConfig;
use hexfold::core::types::PlayerId;
use hexfold::game::{Game, GameStatus, Order, PlayerStatus, ResourcePattern};
use hexfold::grid::board::{DegreesOfFreedom, Shape};
use hexfold::grid::cell::Coord;
use hexfold::policy::{Policy, RandomWalkPolicy};
use hexfold::round::{DenyReason, Outcome};

fn bare_game(length: i32) -> Game {
    let config = GameConfig {
        length,
        shape: Shape::Hexagon,
        degrees_of_freedom: DegreesOfFreedom::Six,
        resource_pattern: ResourcePattern::Empty,
        invulnerable_units: false,
        seed: 17,
    };
    Game::new(config, &[]).expect("valid test config")
}

#[test]
fn test_every_intent_is_decided_after_a_round() {
    let config = GameConfig {
        length: 6,
        resource_pattern: ResourcePattern::Snowflake,
        ..GameConfig::default()
    };
    let mut game = Game::new(config, &["a", "b"]).unwrap();
    let round = game.advance_round().unwrap();
    assert!(round.total_intents > 0);
    for intent in round.intents.values() {
        assert_ne!(intent.outcome, Outcome::Pending);
        assert_ne!(
            intent.deny_reason(),
            Some(DenyReason::UnforeseenConsequences),
            "resolution left a defect marker"
        );
    }
}

#[test]
fn test_two_units_contesting_an_empty_cell_both_get_movement_block() {
    let mut game = bare_game(5);
    let p1 = game.add_player("left");
    let p2 = game.add_player("right");
    let left = game.spawn_unit(p1, Coord::new(0, 0));
    let right = game.spawn_unit(p2, Coord::new(2, 0));

    game.submit_order(left, Order::Target(Coord::new(1, 0)));
    game.submit_order(right, Order::Target(Coord::new(1, 0)));
    let round = game.advance_round().unwrap();

    assert_eq!(
        round.intent(left).unwrap().deny_reason(),
        Some(DenyReason::MovementBlock)
    );
    assert_eq!(
        round.intent(right).unwrap().deny_reason(),
        Some(DenyReason::MovementBlock)
    );
    assert_eq!(game.unit(left).cell, Coord::new(0, 0));
    assert_eq!(game.unit(right).cell, Coord::new(2, 0));
    assert_eq!(game.board().occupant(Coord::new(1, 0)), None);
}

#[test]
fn test_three_unit_cycle_is_denied_as_circular() {
    let mut game = bare_game(5);
    let p = game.add_player("ring");
    // Three mutually adjacent cells.
    let a = game.spawn_unit(p, Coord::new(0, 0));
    let b = game.spawn_unit(p, Coord::new(1, 0));
    let c = game.spawn_unit(p, Coord::new(0, 1));

    game.submit_order(a, Order::Target(Coord::new(1, 0)));
    game.submit_order(b, Order::Target(Coord::new(0, 1)));
    game.submit_order(c, Order::Target(Coord::new(0, 0)));
    let round = game.advance_round().unwrap();

    for unit in [a, b, c] {
        assert_eq!(
            round.intent(unit).unwrap().deny_reason(),
            Some(DenyReason::CircularLoop),
            "unit {unit:?}"
        );
    }
    assert_eq!(game.unit(a).cell, Coord::new(0, 0));
    assert_eq!(game.unit(b).cell, Coord::new(1, 0));
    assert_eq!(game.unit(c).cell, Coord::new(0, 1));
}

#[test]
fn test_two_unit_swap_is_denied_as_circular() {
    let mut game = bare_game(5);
    let p1 = game.add_player("a");
    let p2 = game.add_player("b");
    let a = game.spawn_unit(p1, Coord::new(0, 0));
    let b = game.spawn_unit(p2, Coord::new(1, 0));

    game.submit_order(a, Order::Target(Coord::new(1, 0)));
    game.submit_order(b, Order::Target(Coord::new(0, 0)));
    let round = game.advance_round().unwrap();

    assert_eq!(
        round.intent(a).unwrap().deny_reason(),
        Some(DenyReason::CircularLoop)
    );
    assert_eq!(
        round.intent(b).unwrap().deny_reason(),
        Some(DenyReason::CircularLoop)
    );
    // Nobody was captured.
    assert_eq!(game.unit(a).owner, p1);
    assert_eq!(game.unit(b).owner, p2);
}

#[test]
fn test_lone_attacker_converts_an_undefended_enemy() {
    let mut game = bare_game(5);
    let p1 = game.add_player("attacker");
    let p2 = game.add_player("defender");
    let attacker = game.spawn_unit(p1, Coord::new(0, 0));
    let victim = game.spawn_unit(p2, Coord::new(1, 0));

    game.submit_order(attacker, Order::Target(Coord::new(1, 0)));
    let round = game.advance_round().unwrap();

    assert!(round.intent(attacker).unwrap().is_granted());
    assert_eq!(game.unit(victim).owner, p1);
    assert_eq!(game.unit(victim).previous_owner, Some(p2));
    assert_eq!(game.player(p1).unit_count(), 2);
    assert_eq!(game.player(p2).unit_count(), 0);
}

#[test]
fn test_rival_attackers_cancel_each_other_out() {
    let mut game = bare_game(5);
    let p1 = game.add_player("west");
    let p2 = game.add_player("east");
    let p3 = game.add_player("middle");
    let west = game.spawn_unit(p1, Coord::new(-1, 0));
    let east = game.spawn_unit(p2, Coord::new(1, 0));
    let middle = game.spawn_unit(p3, Coord::new(0, 0));

    game.submit_order(west, Order::Target(Coord::new(0, 0)));
    game.submit_order(east, Order::Target(Coord::new(0, 0)));
    let round = game.advance_round().unwrap();

    assert_eq!(
        round.intent(west).unwrap().deny_reason(),
        Some(DenyReason::ConversionBlock)
    );
    assert_eq!(
        round.intent(east).unwrap().deny_reason(),
        Some(DenyReason::ConversionBlock)
    );
    // The defender held and keeps its owner: one cell, one occupant.
    assert!(round.intent(middle).unwrap().is_granted());
    assert_eq!(game.unit(middle).owner, p3);
    assert_eq!(game.board().occupant(Coord::new(0, 0)), Some(middle));
}

#[test]
fn test_escort_saves_the_defender_from_a_contested_attack() {
    let mut game = bare_game(5);
    let p1 = game.add_player("attacker");
    let p2 = game.add_player("defender");
    let attacker = game.spawn_unit(p1, Coord::new(-1, 0));
    let defender = game.spawn_unit(p2, Coord::new(0, 0));
    let escort = game.spawn_unit(p2, Coord::new(1, 0));

    game.submit_order(attacker, Order::Target(Coord::new(0, 0)));
    game.submit_order(escort, Order::Target(Coord::new(0, 0)));
    let round = game.advance_round().unwrap();

    // Two players contest the defender: the owner's escort succeeds, the
    // foreign attack is deflected.
    assert!(round.intent(escort).unwrap().is_granted());
    assert_eq!(
        round.intent(attacker).unwrap().deny_reason(),
        Some(DenyReason::ConversionBlock)
    );
    assert_eq!(game.unit(defender).owner, p2);
}

#[test]
fn test_contested_attacker_cannot_capture() {
    let mut game = bare_game(5);
    let p1 = game.add_player("chain-head");
    let p2 = game.add_player("chain-tail");
    // head attacks mid; mid attacks tail. Mid is contested, so only head
    // resolves; mid's attack must wait until the snapshot clears it.
    let head = game.spawn_unit(p1, Coord::new(-1, 0));
    let mid = game.spawn_unit(p2, Coord::new(0, 0));
    let tail = game.spawn_unit(p1, Coord::new(1, 0));

    game.submit_order(head, Order::Target(Coord::new(0, 0)));
    game.submit_order(mid, Order::Target(Coord::new(1, 0)));
    let round = game.advance_round().unwrap();

    // Head captures mid first; mid's own attack died with the conversion.
    assert!(round.intent(head).unwrap().is_granted());
    assert_eq!(
        round.intent(mid).unwrap().deny_reason(),
        Some(DenyReason::UnitConversion)
    );
    assert_eq!(game.unit(mid).owner, p1);
    assert_eq!(game.unit(tail).owner, p1);
}

#[test]
fn test_uncontested_hold_is_granted_without_reaffirmation() {
    let mut game = bare_game(5);
    let p = game.add_player("idle");
    let unit = game.spawn_unit(p, Coord::new(2, 2));

    // No order submitted at all: the engine files an implicit hold.
    let round = game.advance_round().unwrap();
    let intent = round.intent(unit).unwrap();
    assert!(intent.is_granted());
    assert_eq!(intent.step.from, intent.step.to);
}

#[test]
fn test_round_counter_increases_by_one_per_call() {
    let mut game = bare_game(4);
    let p = game.add_player("clock");
    game.spawn_unit(p, Coord::new(0, 0));

    for expected in 0..5u64 {
        assert_eq!(game.round_number(), expected);
        let round = game.advance_round().unwrap();
        assert_eq!(round.number, expected);
    }
    assert_eq!(game.round_number(), 5);
}

#[test]
fn test_game_ends_exactly_when_one_player_owns_everything() {
    let mut game = bare_game(5);
    let p1 = game.add_player("hunter");
    let p2 = game.add_player("prey");
    let hunter = game.spawn_unit(p1, Coord::new(0, 0));
    let prey_a = game.spawn_unit(p2, Coord::new(1, 0));
    let prey_b = game.spawn_unit(p2, Coord::new(-2, 0));

    game.submit_order(hunter, Order::Target(Coord::new(1, 0)));
    game.advance_round().unwrap();
    assert_eq!(game.unit(prey_a).owner, p1);
    // One enemy unit still stands: not over yet.
    assert_eq!(game.status(), GameStatus::Active);
    assert_eq!(game.player(p2).status, PlayerStatus::Playing);

    // Walk the hunter over to the last prey and take it.
    game.submit_order(hunter, Order::Target(Coord::new(-1, 0)));
    game.advance_round().unwrap();
    assert_eq!(game.unit(hunter).cell, Coord::new(-1, 0));
    game.submit_order(hunter, Order::Target(Coord::new(-2, 0)));
    game.advance_round().unwrap();

    assert_eq!(game.unit(prey_b).owner, p1);
    assert_eq!(game.status(), GameStatus::Over);
    assert_eq!(game.player(p1).status, PlayerStatus::Victorious);
    assert_eq!(game.player(p2).status, PlayerStatus::Defeated);
}

#[test]
fn test_converted_unit_inherits_the_capturing_heading() {
    let mut game = bare_game(5);
    let p1 = game.add_player("attacker");
    let p2 = game.add_player("defender");
    let attacker = game.spawn_unit(p1, Coord::new(0, 0));
    let victim = game.spawn_unit(p2, Coord::new(1, 0));

    game.submit_order(attacker, Order::Target(Coord::new(1, 0)));
    game.advance_round().unwrap();

    let inherited = game.unit(victim).previous_intent.clone().unwrap();
    assert_eq!(inherited.unit, victim);
    assert_eq!(inherited.deny_reason(), Some(DenyReason::UnitConversion));

    // Resubmitting the inherited intent keeps the unit moving along the
    // capturer's north-east heading instead of freezing.
    assert!(game.submit_cloned_previous(victim));
    game.advance_round().unwrap();
    assert_eq!(game.unit(victim).cell, Coord::new(2, 0));
}

#[test]
fn test_identical_seeds_replay_identical_games() {
    fn run(seed: u64) -> Vec<(PlayerId, Coord)> {
        let config = GameConfig {
            length: 6,
            shape: Shape::Hexagon,
            degrees_of_freedom: DegreesOfFreedom::Six,
            resource_pattern: ResourcePattern::Snowflake,
            invulnerable_units: false,
            seed,
        };
        let mut game = Game::new(config, &["a", "b"]).unwrap();
        let players: Vec<PlayerId> = game
            .player_ids()
            .into_iter()
            .filter(|&p| p != game.resource_player())
            .collect();
        let mut policies: Vec<RandomWalkPolicy> = players
            .iter()
            .enumerate()
            .map(|(i, _)| RandomWalkPolicy::new(seed + i as u64))
            .collect();

        for _ in 0..8 {
            for (player, policy) in players.iter().zip(policies.iter_mut()) {
                for (unit, order) in policy.decide(&mut game, *player) {
                    game.submit_order(unit, order);
                }
            }
            game.advance_round().unwrap();
        }

        game.unit_ids()
            .into_iter()
            .map(|u| (game.unit(u).owner, game.unit(u).cell))
            .collect()
    }

    assert_eq!(run(2024), run(2024));
}

#[test]
fn test_wrap_around_chase_across_the_fold() {
    let mut game = bare_game(4);
    let p1 = game.add_player("edge");
    let p2 = game.add_player("far");
    // Adjacent only through the wrap: one step north of (0,3) folds to
    // (3,-3).
    let edge = game.spawn_unit(p1, Coord::new(0, 3));
    let far = game.spawn_unit(p2, Coord::new(3, -3));

    game.submit_order(edge, Order::Target(Coord::new(3, -3)));
    let round = game.advance_round().unwrap();

    assert!(round.intent(edge).unwrap().is_granted());
    assert_eq!(game.unit(far).owner, p1);
}
