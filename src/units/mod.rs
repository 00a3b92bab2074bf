//! Units - owned, positioned game pieces
//!
//! A unit always belongs to exactly one player and occupies exactly one
//! non-hole cell. Units are never destroyed; capture transfers ownership.

use serde::{Deserialize, Serialize};

use crate::core::types::{PlayerId, UnitId};
use crate::grid::cell::Coord;
use crate::round::intent::Intent;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub owner: PlayerId,
    pub previous_owner: Option<PlayerId>,
    pub cell: Coord,
    pub previous_cell: Option<Coord>,
    /// The last resolved intent, or the inherited clone installed when the
    /// unit was converted.
    pub previous_intent: Option<Intent>,
    /// Every decided intent of this unit, oldest first.
    pub intent_history: Vec<Intent>,
    #[serde(skip)]
    selectable_cache: Option<Vec<Coord>>,
    #[serde(skip)]
    visible_cache: Option<Vec<Coord>>,
}

impl Unit {
    pub fn new(id: UnitId, owner: PlayerId, cell: Coord) -> Self {
        Self {
            id,
            owner,
            previous_owner: None,
            cell,
            previous_cell: None,
            previous_intent: None,
            intent_history: Vec::new(),
            selectable_cache: None,
            visible_cache: None,
        }
    }

    /// Drops the memoized selectable/visible sets. Issued at the start of
    /// every round, before any of them is recomputed.
    pub fn invalidate_caches(&mut self) {
        self.selectable_cache = None;
        self.visible_cache = None;
    }

    pub(crate) fn selectable_cache(&self) -> Option<&Vec<Coord>> {
        self.selectable_cache.as_ref()
    }

    pub(crate) fn set_selectable_cache(&mut self, cells: Vec<Coord>) {
        self.selectable_cache = Some(cells);
    }

    pub(crate) fn visible_cache(&self) -> Option<&Vec<Coord>> {
        self.visible_cache.as_ref()
    }

    pub(crate) fn set_visible_cache(&mut self, cells: Vec<Coord>) {
        self.visible_cache = Some(cells);
    }
}
