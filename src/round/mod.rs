//! Rounds - one simultaneous game tick and its resolution

pub mod intent;
pub mod resolver;
pub mod step;

pub use intent::{DenyReason, Intent, IntentAction, Outcome};
pub use step::{Direction, Step};

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::UnitId;

/// Lifecycle of a round. Completion is irreversible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundStatus {
    Running,
    Completed,
}

/// One game tick: the intents submitted for it and, once completed, their
/// decided outcomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    pub number: u64,
    /// At most one intent per unit; re-submission overwrites.
    pub intents: AHashMap<UnitId, Intent>,
    pub granted_intents: usize,
    pub total_intents: usize,
    pub status: RoundStatus,
}

impl Round {
    pub fn new(number: u64) -> Self {
        Self {
            number,
            intents: AHashMap::new(),
            granted_intents: 0,
            total_intents: 0,
            status: RoundStatus::Running,
        }
    }

    pub fn intent(&self, unit: UnitId) -> Option<&Intent> {
        self.intents.get(&unit)
    }
}
