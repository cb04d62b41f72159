//! Difficulty tiers and the parameter bundle handed to the world at level start.

use serde::{Deserialize, Serialize};
use thiserror::Error;

const MIN_GRID_SIZE: u32 = 5;
const MAX_GRID_SIZE: u32 = 64;

/// Difficulty tiers selectable by the player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Small grid, few and hesitant enemies.
    Easy,
    /// Default tier.
    #[default]
    Normal,
    /// Large grid with many sharp enemies.
    Hard,
}

impl Difficulty {
    /// Default parameter bundle for the tier.
    #[must_use]
    pub const fn profile(self) -> DifficultyProfile {
        match self {
            Self::Easy => DifficultyProfile {
                grid_size: 15,
                enemy_count: 3,
                wall_percent: 0.15,
                skill_count: 3,
                npc_bomb_chance: 0.01,
            },
            Self::Normal => DifficultyProfile {
                grid_size: 20,
                enemy_count: 5,
                wall_percent: 0.2,
                skill_count: 5,
                npc_bomb_chance: 0.02,
            },
            Self::Hard => DifficultyProfile {
                grid_size: 25,
                enemy_count: 8,
                wall_percent: 0.25,
                skill_count: 8,
                npc_bomb_chance: 0.03,
            },
        }
    }
}

/// Opaque parameter bundle describing a level.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    /// Side length of the square grid.
    pub grid_size: u32,
    /// Number of enemies spawned per level.
    pub enemy_count: u32,
    /// Fraction of all tiles turned into destructible walls.
    pub wall_percent: f32,
    /// Number of hidden bomb skills seeded under destructible walls.
    pub skill_count: u32,
    /// Probability that an idle enemy bombs a lone destructible wall.
    pub npc_bomb_chance: f32,
}

impl DifficultyProfile {
    /// Checks that every field lies in a range the generator can honour.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if !(MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&self.grid_size) {
            return Err(ProfileError::GridSize {
                size: self.grid_size,
                min: MIN_GRID_SIZE,
                max: MAX_GRID_SIZE,
            });
        }
        if !(0.0..=1.0).contains(&self.wall_percent) {
            return Err(ProfileError::Fraction {
                field: "wall_percent",
                value: self.wall_percent,
            });
        }
        if !(0.0..=1.0).contains(&self.npc_bomb_chance) {
            return Err(ProfileError::Fraction {
                field: "npc_bomb_chance",
                value: self.npc_bomb_chance,
            });
        }
        Ok(())
    }

    /// Number of destructible walls the generator aims to place.
    #[must_use]
    pub fn destructible_target(&self) -> usize {
        let cells = f64::from(self.grid_size) * f64::from(self.grid_size);
        (cells * f64::from(self.wall_percent)).floor() as usize
    }
}

impl Default for DifficultyProfile {
    fn default() -> Self {
        Difficulty::default().profile()
    }
}

/// Reasons a difficulty profile is rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ProfileError {
    /// The grid is too small to hold the spawn corner or too large to search.
    #[error("grid size {size} is outside the supported range {min}..={max}")]
    GridSize {
        /// Requested side length.
        size: u32,
        /// Smallest supported side length.
        min: u32,
        /// Largest supported side length.
        max: u32,
    },
    /// A probability or fraction fell outside `[0, 1]`.
    #[error("{field} must lie within [0, 1], got {value}")]
    Fraction {
        /// Name of the offending field.
        field: &'static str,
        /// Value supplied.
        value: f32,
    },
}
