//! Immutable per-agent behaviour traits.

use bomber_core::Difficulty;
use rand::Rng;

const TRAIT_MIN: f32 = 0.3;
const TRAIT_MAX: f32 = 0.9;
const TRAIT_CEILING: f32 = 1.0;
const TRAIT_FLOOR: f32 = 0.1;

/// Aggression, caution and intelligence of a single enemy.
///
/// Each trait lies in `[0.1, 1.0]`. Aggression drives the hunt probability,
/// caution is the danger score an agent tolerates before fleeing, and
/// intelligence stretches the hunt range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Personality {
    aggression: f32,
    caution: f32,
    intelligence: f32,
}

impl Personality {
    /// Creates a personality from explicit trait values, clamped to the valid range.
    #[must_use]
    pub fn new(aggression: f32, caution: f32, intelligence: f32) -> Self {
        Self {
            aggression: aggression.clamp(TRAIT_FLOOR, TRAIT_CEILING),
            caution: caution.clamp(TRAIT_FLOOR, TRAIT_CEILING),
            intelligence: intelligence.clamp(TRAIT_FLOOR, TRAIT_CEILING),
        }
    }

    /// Draws traits uniformly from `[0.3, 0.9)` and nudges them by tier.
    ///
    /// Hard raises the traits by `(0.2, 0.1, 0.3)`, Easy lowers them by
    /// `(0.2, 0.1, 0.2)`.
    pub fn roll<R: Rng>(difficulty: Difficulty, rng: &mut R) -> Self {
        let aggression = rng.gen_range(TRAIT_MIN..TRAIT_MAX);
        let caution = rng.gen_range(TRAIT_MIN..TRAIT_MAX);
        let intelligence = rng.gen_range(TRAIT_MIN..TRAIT_MAX);

        let (da, dc, di) = match difficulty {
            Difficulty::Easy => (-0.2, -0.1, -0.2),
            Difficulty::Normal => (0.0, 0.0, 0.0),
            Difficulty::Hard => (0.2, 0.1, 0.3),
        };

        Self::new(aggression + da, caution + dc, intelligence + di)
    }

    /// Appetite for chasing the player.
    #[must_use]
    pub const fn aggression(&self) -> f32 {
        self.aggression
    }

    /// Danger score the agent tolerates before it escapes.
    #[must_use]
    pub const fn caution(&self) -> f32 {
        self.caution
    }

    /// Scales the hunt range.
    #[must_use]
    pub const fn intelligence(&self) -> f32 {
        self.intelligence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn rolled_traits_stay_in_tier_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        for _ in 0..200 {
            let easy = Personality::roll(Difficulty::Easy, &mut rng);
            assert!(easy.aggression() >= TRAIT_FLOOR && easy.aggression() < 0.7);
            assert!(easy.caution() >= 0.2 - f32::EPSILON && easy.caution() < 0.8);

            let hard = Personality::roll(Difficulty::Hard, &mut rng);
            assert!(hard.aggression() >= 0.5 - f32::EPSILON);
            assert!(hard.intelligence() <= TRAIT_CEILING);

            let normal = Personality::roll(Difficulty::Normal, &mut rng);
            assert!(normal.caution() >= TRAIT_MIN && normal.caution() < TRAIT_MAX);
        }
    }

    #[test]
    fn explicit_traits_are_clamped() {
        let personality = Personality::new(2.0, -1.0, 0.5);
        assert_eq!(personality.aggression(), TRAIT_CEILING);
        assert_eq!(personality.caution(), TRAIT_FLOOR);
        assert_eq!(personality.intelligence(), 0.5);
    }
}
