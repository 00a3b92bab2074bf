//! Round resolution - the four-phase fixed-point pipeline
//!
//! An intent is satisfied only when its outcome is unambiguous and
//! non-conflicting under every execution order of this round's intents.
//! Phases 2 and 3 therefore repeat until a pass decides nothing new: each
//! grant frees or claims cells, which can enable or invalidate other
//! intents. Holes are rejected before anything moves, simultaneous-mover
//! ambiguity resolves before capture ambiguity (a captured unit's vacated
//! claim can unblock move contests), and holds are decided last.
//!
//! Every iteration over the intent arena is in sorted unit-id order, so a
//! given game state always resolves the same way.

use ahash::AHashMap;

use crate::core::error::{EngineError, Result};
use crate::core::types::{PlayerId, UnitId};
use crate::game::Game;
use crate::grid::cell::Coord;
use crate::round::intent::{DenyReason, Intent, Outcome};
use std::collections::BTreeMap;

type IntentMap = AHashMap<UnitId, Intent>;

/// Resolves the game's current round in place: every submitted intent ends
/// Granted or Denied, unit positions and ownership are updated, and the
/// round is marked Completed.
pub fn resolve_round(game: &mut Game) -> Result<()> {
    let mut intents = game.take_current_intents();

    deny_circular_intents(game, &mut intents);
    resolve_move_intents(game, &mut intents)?;
    resolve_attack_intents(game, &mut intents)?;
    resolve_hold_intents(game, &mut intents);
    let (granted, total) = finalize_outcomes(game, &mut intents);

    game.restore_current_intents(intents);
    game.complete_current_round(granted, total);
    Ok(())
}

fn sorted_unit_ids(intents: &IntentMap) -> Vec<UnitId> {
    let mut ids: Vec<UnitId> = intents.keys().copied().collect();
    ids.sort();
    ids
}

/// Phase 1: deny every closed chain of units that all step onto the cell of
/// the next one. Granting any of them would make the ring's outcome depend
/// on execution order.
fn deny_circular_intents(game: &mut Game, intents: &mut IntentMap) {
    let mut next_of: AHashMap<UnitId, UnitId> = AHashMap::new();
    for id in sorted_unit_ids(intents) {
        let intent = &intents[&id];
        if let Some(occupant) = game.board().occupant(intent.step.to) {
            if occupant != id {
                next_of.insert(id, occupant);
            }
        }
    }

    let mut starts: Vec<UnitId> = next_of.keys().copied().collect();
    starts.sort();
    for start in starts {
        let mut chain: Vec<UnitId> = Vec::new();
        let mut current = start;
        let closes_on_start = loop {
            if chain.contains(&current) {
                break current == start;
            }
            chain.push(current);
            match next_of.get(&current) {
                Some(&next) => current = next,
                None => break false,
            }
        };
        if closes_on_start {
            for id in chain {
                deny_intent(game, intents, id, DenyReason::CircularLoop);
            }
        }
    }
}

/// Phase 2: contests over empty cells, iterated to a fixed point. A grant
/// moves the unit immediately, so its vacated origin can admit another
/// mover in a later pass.
fn resolve_move_intents(game: &mut Game, intents: &mut IntentMap) -> Result<()> {
    let cap = intents.len() + 2;
    let mut passes = 0;
    let mut changed = true;
    while changed {
        passes += 1;
        if passes > cap {
            return Err(stalled(game, passes, intents.len()));
        }
        changed = false;

        let mut contested: BTreeMap<Coord, Vec<UnitId>> = BTreeMap::new();
        for id in sorted_unit_ids(intents) {
            let intent = &intents[&id];
            if intent.is_pending() {
                contested.entry(intent.step.to).or_default().push(id);
            }
        }

        for (cell, contestors) in contested {
            // Occupancy is read live: an earlier grant in this pass may
            // have filled or emptied the cell since grouping.
            if game.board().occupant(cell).is_some() {
                continue;
            }
            if game.board().cell(cell).is_hole {
                for id in contestors {
                    deny_intent(game, intents, id, DenyReason::MovementHole);
                }
            } else if let [single] = contestors[..] {
                grant_intent(game, intents, single);
            } else {
                for id in contestors {
                    deny_intent(game, intents, id, DenyReason::MovementBlock);
                }
            }
            changed = true;
        }
    }
    Ok(())
}

/// Phase 3: contests over occupied cells, iterated to a fixed point.
///
/// An intent counts as uncontested when its own unit is not itself a
/// contested target in this pass's snapshot, i.e. it cannot be captured
/// before it acts. A lone contesting player captures (enemy) or blocks
/// itself (friendly); with two or more players holding uncontested claims
/// the contest is irreducible, so the defender's own escorts succeed and
/// every foreign claim is deflected.
fn resolve_attack_intents(game: &mut Game, intents: &mut IntentMap) -> Result<()> {
    let cap = intents.len() + 2;
    let mut passes = 0;
    let mut changed = true;
    while changed {
        passes += 1;
        if passes > cap {
            return Err(stalled(game, passes, intents.len()));
        }
        changed = false;

        let mut contested: BTreeMap<UnitId, BTreeMap<PlayerId, Vec<UnitId>>> = BTreeMap::new();
        for id in sorted_unit_ids(intents) {
            let intent = &intents[&id];
            if !intent.is_pending() {
                continue;
            }
            if intent.step.to == game.unit(id).cell {
                continue;
            }
            if let Some(defender) = game.board().occupant(intent.step.to) {
                contested
                    .entry(defender)
                    .or_default()
                    .entry(game.unit(id).owner)
                    .or_default()
                    .push(id);
            }
        }

        for (&defender, players) in &contested {
            // Read live: the defender may have changed hands this pass.
            let defender_owner = game.unit(defender).owner;

            if players.len() == 1 {
                let (&player, attackers) = players.iter().next().expect("non-empty group");
                for &attacker in attackers {
                    if contested.contains_key(&attacker) {
                        continue;
                    }
                    if player == defender_owner {
                        // Friendly pile-up: the escort blocked itself.
                        deny_intent(game, intents, attacker, DenyReason::MovementBlock);
                    } else if game.config().invulnerable_units {
                        deny_intent(game, intents, attacker, DenyReason::ConversionBlock);
                    } else {
                        grant_intent(game, intents, attacker);
                    }
                    changed = true;
                }
            } else {
                let mut unconflicted: BTreeMap<PlayerId, Vec<UnitId>> = BTreeMap::new();
                for (&player, attackers) in players {
                    let free: Vec<UnitId> = attackers
                        .iter()
                        .copied()
                        .filter(|attacker| !contested.contains_key(attacker))
                        .collect();
                    if !free.is_empty() {
                        unconflicted.insert(player, free);
                    }
                }
                if unconflicted.len() > 1 {
                    for (&player, attackers) in &unconflicted {
                        for &attacker in attackers {
                            if player == defender_owner {
                                grant_intent(game, intents, attacker);
                            } else {
                                deny_intent(game, intents, attacker, DenyReason::ConversionBlock);
                            }
                        }
                    }
                    changed = true;
                }
            }
        }
    }
    Ok(())
}

/// Phase 4: anything still pending that targets its own cell is a hold; a
/// unit legitimately holds once nothing displaces or captures it.
fn resolve_hold_intents(game: &mut Game, intents: &mut IntentMap) {
    for id in sorted_unit_ids(intents) {
        let intent = &intents[&id];
        if intent.is_pending() && intent.step.to == game.unit(id).cell {
            grant_intent(game, intents, id);
        }
    }
}

/// Post-condition sweep: counts outcomes and force-denies anything the
/// pipeline failed to decide. A survivor here is an algorithmic defect, not
/// a legitimate game outcome.
fn finalize_outcomes(game: &mut Game, intents: &mut IntentMap) -> (usize, usize) {
    let total = intents.len();
    let mut granted = 0;
    for id in sorted_unit_ids(intents) {
        match intents[&id].outcome {
            Outcome::Granted => granted += 1,
            Outcome::Denied(_) => {}
            Outcome::Pending => {
                tracing::error!(
                    "intent of unit {:?} survived resolution in round {}; denying as a defect",
                    id,
                    game.round_number()
                );
                deny_intent(game, intents, id, DenyReason::UnforeseenConsequences);
            }
        }
    }
    (granted, total)
}

fn stalled(game: &Game, passes: usize, intents: usize) -> EngineError {
    EngineError::ResolutionStalled {
        round: game.round_number(),
        passes,
        intents,
    }
}

/// Denies a pending intent and records it on its unit. Re-denying an
/// already-decided intent is a no-op; denial paths can legitimately race
/// within one pass.
fn deny_intent(game: &mut Game, intents: &mut IntentMap, unit: UnitId, reason: DenyReason) {
    let intent = intents.get_mut(&unit).expect("denying an unknown intent");
    if !intent.is_pending() {
        return;
    }
    intent.outcome = Outcome::Denied(reason);
    let record = intent.clone();
    let unit = game.unit_mut(unit);
    unit.previous_intent = Some(record.clone());
    unit.intent_history.push(record);
}

/// Grants a pending intent and applies the action its destination implies
/// right now: empty cell - move; enemy occupant - convert; own occupant
/// elsewhere - defend; own cell - hold.
fn grant_intent(game: &mut Game, intents: &mut IntentMap, unit: UnitId) {
    let (to, actor_owner) = {
        let intent = &intents[&unit];
        assert!(intent.is_pending(), "granting an already-decided intent");
        (intent.step.to, game.unit(unit).owner)
    };

    match game.board().occupant(to) {
        None => game.move_unit(unit, to),
        Some(occupant) if game.unit(occupant).owner == actor_owner => {
            // Defend or hold: either way the unit stays where it is.
        }
        Some(occupant) => convert_unit(game, intents, occupant, unit),
    }

    let intent = intents.get_mut(&unit).expect("granting an unknown intent");
    intent.outcome = Outcome::Granted;
    let record = intent.clone();
    let unit = game.unit_mut(unit);
    unit.previous_intent = Some(record.clone());
    unit.intent_history.push(record);
}

/// Capture: the victim's own pending intent dies first, then the victim
/// inherits a denied, re-derived clone of the capturing intent (so the new
/// owner's policy picks up the capturer's heading instead of freezing), and
/// finally ownership transfers.
fn convert_unit(game: &mut Game, intents: &mut IntentMap, victim: UnitId, capturer: UnitId) {
    debug_assert!(
        !game.config().invulnerable_units,
        "conversion reached with invulnerable units"
    );

    if intents.contains_key(&victim) {
        deny_intent(game, intents, victim, DenyReason::UnitConversion);
    }

    let capturing = intents
        .get(&capturer)
        .expect("converting without a capturing intent")
        .clone();
    let old_owner = game.unit(victim).owner;
    let new_owner = game.unit(capturer).owner;

    let mut inherited = Intent::clone_from(game, &capturing);
    inherited.unit = victim;
    inherited.player = old_owner;
    inherited.outcome = Outcome::Denied(DenyReason::UnitConversion);
    game.unit_mut(victim).previous_intent = Some(inherited);

    game.transfer_unit(victim, new_owner);
}
