#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy decision engine that reads the arena and proposes enemy commands.
//!
//! Every enemy owns a brain: a Wander/Hunt/Escape state machine driven by its
//! personality traits, the danger model and an escape gate that must prove a
//! refuge is reachable before any bomb is placed. Brains only emit
//! [`Command`] values; the world remains the single writer.

mod brain;
pub mod danger;
mod personality;
mod tactics;

use std::collections::BTreeMap;

use bomber_core::{
    ActorRef, ArenaView, Command, Difficulty, DifficultyProfile, EnemyId, Event,
};
use bomber_world::BOMB_FUSE_TICKS;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use brain::{Brain, Tuning};

pub use brain::AiState;
pub use personality::Personality;

/// Ticks between two decisions of the same enemy.
pub const DEFAULT_DECISION_INTERVAL: u32 = 30;

/// Configuration parameters required to construct the enemy AI system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    difficulty: Difficulty,
    npc_bomb_chance: f32,
    rng_seed: Option<u64>,
    decision_interval: u32,
}

impl Config {
    /// Creates a configuration using the tier's default profile.
    #[must_use]
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            npc_bomb_chance: difficulty.profile().npc_bomb_chance,
            rng_seed: None,
            decision_interval: DEFAULT_DECISION_INTERVAL,
        }
    }

    /// Takes the opportunistic bomb chance from a custom profile.
    #[must_use]
    pub fn with_profile(mut self, profile: &DifficultyProfile) -> Self {
        self.npc_bomb_chance = profile.npc_bomb_chance;
        self
    }

    /// Seeds every brain's random source for reproducible behaviour.
    #[must_use]
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Overrides the number of ticks between decisions. Zero is treated as one.
    #[must_use]
    pub fn with_decision_interval(mut self, ticks: u32) -> Self {
        self.decision_interval = ticks.max(1);
        self
    }

    /// Difficulty tier the brains are tuned for.
    #[must_use]
    pub const fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Ticks between two decisions of the same enemy.
    #[must_use]
    pub const fn decision_interval(&self) -> u32 {
        self.decision_interval
    }

    /// Steps an enemy is guaranteed to take before its own bomb detonates.
    ///
    /// The escape gate only accepts refuges within this many moves.
    #[must_use]
    pub fn escape_steps(&self) -> u32 {
        (BOMB_FUSE_TICKS / self.decision_interval)
            .saturating_sub(1)
            .max(1)
    }

    fn tuning(&self) -> Tuning {
        Tuning {
            difficulty: self.difficulty,
            npc_bomb_chance: self.npc_bomb_chance,
            decision_interval: self.decision_interval,
            escape_steps: self.escape_steps(),
        }
    }
}

/// Pure system that owns one brain per living enemy.
#[derive(Debug)]
pub struct EnemyAi {
    config: Config,
    seeder: ChaCha8Rng,
    brains: BTreeMap<EnemyId, Brain>,
}

impl EnemyAi {
    /// Creates the system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let seeder = match config.rng_seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        Self {
            config,
            seeder,
            brains: BTreeMap::new(),
        }
    }

    /// Attaches a brain with freshly rolled traits to the enemy.
    ///
    /// Registering an enemy twice keeps its existing brain.
    pub fn register(&mut self, enemy: EnemyId) {
        if self.brains.contains_key(&enemy) {
            return;
        }

        let personality = Personality::roll(self.config.difficulty, &mut self.seeder);
        self.register_with_personality(enemy, personality);
    }

    /// Attaches a brain with explicit traits, replacing any existing one.
    pub fn register_with_personality(&mut self, enemy: EnemyId, personality: Personality) {
        let rng = ChaCha8Rng::seed_from_u64(self.seeder.gen());
        tracing::debug!(
            enemy = enemy.get(),
            aggression = personality.aggression(),
            caution = personality.caution(),
            intelligence = personality.intelligence(),
            "registered enemy brain"
        );
        let _ = self.brains.insert(enemy, Brain::new(enemy, personality, rng));
    }

    /// Consumes world events to keep the brains in sync with the world.
    ///
    /// A generated or loaded level discards every brain; the spawn events that
    /// follow it register the new wave.
    pub fn observe(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::LevelGenerated { level, .. } => {
                    tracing::debug!(level = *level, dropped = self.brains.len(), "resetting enemy brains");
                    self.brains.clear();
                }
                Event::EnemySpawned { enemy, .. } => self.register(*enemy),
                Event::EnemyEliminated { enemy, .. } => {
                    let _ = self.brains.remove(enemy);
                }
                Event::BombDetonated {
                    owner: ActorRef::Enemy(enemy),
                    hit_player,
                    ..
                } => {
                    if let Some(brain) = self.brains.get_mut(enemy) {
                        brain.record_detonation(*hit_player);
                    }
                }
                Event::MoveRejected {
                    actor: ActorRef::Enemy(enemy),
                    ..
                } => {
                    if let Some(brain) = self.brains.get_mut(enemy) {
                        brain.forget_path();
                    }
                }
                _ => {}
            }
        }
    }

    /// Advances the enemy's brain by one tick, emitting at most one command.
    pub fn think(&mut self, enemy: EnemyId, view: &ArenaView<'_>, out: &mut Vec<Command>) {
        let tuning = self.config.tuning();
        if let Some(brain) = self.brains.get_mut(&enemy) {
            brain.think(view, &tuning, out);
        }
    }

    /// Current state of the enemy's brain.
    #[must_use]
    pub fn state(&self, enemy: EnemyId) -> Option<AiState> {
        self.brains.get(&enemy).map(Brain::state)
    }

    /// Traits of the enemy's brain.
    #[must_use]
    pub fn personality(&self, enemy: EnemyId) -> Option<Personality> {
        self.brains.get(&enemy).map(Brain::personality)
    }

    /// Share of the enemy's resolved bombs that struck the player.
    #[must_use]
    pub fn hit_ratio(&self, enemy: EnemyId) -> Option<f32> {
        self.brains.get(&enemy).map(Brain::hit_ratio)
    }

    /// Identifiers of every enemy with a brain, in ascending order.
    pub fn enemies(&self) -> impl Iterator<Item = EnemyId> + '_ {
        self.brains.keys().copied()
    }

    /// Configuration the system was created with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }
}
