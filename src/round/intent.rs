//! Intents - proposed unit actions and their lifecycle
//!
//! An intent belongs to one unit for one round. It is Pending until the
//! resolver decides it; once Granted or Denied it never changes again.

use serde::{Deserialize, Serialize};

use crate::core::types::{PlayerId, UnitId};
use crate::game::Game;
use crate::grid::cell::Coord;
use crate::round::step::Step;

/// What the intent is trying to achieve, derived from the occupancy and
/// ownership of the target cell at submission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntentAction {
    /// Stay on the current cell.
    Hold,
    /// Move toward an empty (or unseen) cell.
    Move,
    /// Chase and capture an enemy unit.
    Chase,
    /// Escort and defend a friendly unit.
    Escort,
    /// Keep walking along a fixed compass heading.
    March,
}

/// Why a denied intent was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DenyReason {
    /// Part of a closed chain of units all capturing the next one.
    CircularLoop,
    /// Pre-empted by the acting unit being captured first.
    UnitConversion,
    /// Blocked by another unit claiming the same movement.
    MovementBlock,
    /// The destination is a hole.
    MovementHole,
    /// A capture deflected by defenders or rival attackers.
    ConversionBlock,
    /// Safety net for an intent the resolver failed to decide. Never a
    /// legitimate outcome; flagged as a defect wherever it appears.
    UnforeseenConsequences,
}

/// Terminal-once outcome of an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Pending,
    Granted,
    Denied(DenyReason),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intent {
    pub unit: UnitId,
    pub player: PlayerId,
    /// The cell the unit stood on when the intent was submitted.
    pub origin: Coord,
    /// Requested destination; `None` for a directional march.
    pub target_cell: Option<Coord>,
    /// The unit standing on the target cell, resolved only when the target
    /// was visible to the acting player at submission time.
    pub target_unit: Option<UnitId>,
    /// The single-cell move that works toward the target this round.
    pub step: Step,
    pub action: IntentAction,
    pub outcome: Outcome,
}

impl Intent {
    /// Builds a pending intent for `unit` toward `target`.
    ///
    /// The target unit is resolved through the fog of war: occupants of
    /// cells the acting player cannot currently see are not referenced.
    pub fn build(game: &mut Game, unit: UnitId, target: Coord, marching: bool) -> Self {
        let player = game.unit(unit).owner;
        let origin = game.unit(unit).cell;

        let target_unit = if game.player_visible_cells(player).contains(&target) {
            game.board().occupant(target)
        } else {
            None
        };

        let next = game.closest_selectable_cell(unit, target);
        let step = Step::new(game.board(), origin, next);

        let mut action = match target_unit {
            None => IntentAction::Move,
            Some(other) if game.unit(other).owner != player => IntentAction::Chase,
            Some(_) if origin == target => IntentAction::Hold,
            Some(_) => IntentAction::Escort,
        };

        let mut target_cell = Some(target);
        let mut target_unit = target_unit;
        if marching && action != IntentAction::Hold {
            target_cell = None;
            target_unit = None;
            action = IntentAction::March;
        }

        Self {
            unit,
            player,
            origin,
            target_cell,
            target_unit,
            step,
            action,
            outcome: Outcome::Pending,
        }
    }

    /// Re-derives `source` from its unit's current position.
    ///
    /// A tracked target unit is chased to wherever it stands now, as long
    /// as it is still visible; a plain target cell is re-targeted until
    /// reached; otherwise the recorded heading is reapplied from the new
    /// position and refolded, because the same heading from a new cell may
    /// canonicalize differently after the wrap.
    pub fn clone_from(game: &mut Game, source: &Intent) -> Self {
        let unit = source.unit;
        let player = game.unit(unit).owner;

        if let Some(target_unit) = source.target_unit {
            if target_unit != unit {
                let target = game.unit(target_unit).cell;
                if game.player_visible_cells(player).contains(&target) {
                    return Self::build(game, unit, target, false);
                }
            }
        }

        if let Some(target) = source.target_cell {
            if !game.board().cell(target).is_hole && target != game.unit(unit).cell {
                return Self::build(game, unit, target, false);
            }
        }

        let at = game.unit(unit).cell;
        let target = game
            .board()
            .canonicalize(at.x + source.step.dx, at.y + source.step.dy);
        Self::build(game, unit, target, true)
    }

    pub fn is_pending(&self) -> bool {
        self.outcome == Outcome::Pending
    }

    pub fn is_granted(&self) -> bool {
        self.outcome == Outcome::Granted
    }

    pub fn deny_reason(&self) -> Option<DenyReason> {
        match self.outcome {
            Outcome::Denied(reason) => Some(reason),
            _ => None,
        }
    }
}
