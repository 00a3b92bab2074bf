//! Game configuration with documented parameters
//!
//! Everything that shapes a game is collected here: map geometry, hole
//! density, resource placement and the seed that makes a run reproducible.

use serde::{Deserialize, Serialize};

use crate::core::error::{EngineError, Result};
use crate::game::placement::ResourcePattern;
use crate::grid::board::{DegreesOfFreedom, Shape};

/// Configuration for one game
///
/// Two games built from equal configurations and fed equal orders produce
/// identical trajectories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Map radius. The playable diameter is `2 * length - 1`.
    pub length: i32,

    /// Overall outline of the playable area.
    ///
    /// Square is geometrically identical to Rhombus; both wrap as a torus,
    /// while Hexagon folds each overflowing sextant back across the map.
    pub shape: Shape,

    /// Hole-lattice density overlaid on the grid.
    ///
    /// Six means no holes; Three/Four/Five punch periodic residue-class
    /// lattices that thin out how densely units can pack.
    pub degrees_of_freedom: DegreesOfFreedom,

    /// How the passive resource units are scattered at game start.
    pub resource_pattern: ResourcePattern,

    /// When set, no unit ever changes owner; would-be captures are denied
    /// as conversion blocks during resolution.
    pub invulnerable_units: bool,

    /// Seed for the game RNG (placement patterns, random cell draws).
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            length: 9,
            shape: Shape::Hexagon,
            degrees_of_freedom: DegreesOfFreedom::Six,
            resource_pattern: ResourcePattern::Snowflake,
            invulnerable_units: false,
            seed: 12345,
        }
    }
}

impl GameConfig {
    /// Rejects parameter combinations the geometry cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.length < 2 {
            return Err(EngineError::InvalidConfig(format!(
                "map length must be at least 2, got {}",
                self.length
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_degenerate_length_is_rejected() {
        let config = GameConfig {
            length: 1,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
