#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game-loop orchestration that interleaves the world and the enemy brains.
//!
//! A session owns the authoritative [`World`] and the [`EnemyAi`] system. Each
//! [`Session::step`] advances the simulation by one tick: hazards age, every
//! living enemy decides in ascending id order against the state left by the
//! previous enemy, and finally pickups under the player resolve.

use bomber_core::{Command, Event};
use bomber_system_enemy_ai::EnemyAi;
use bomber_world::{self as world, query, World};

/// Authoritative world paired with the brains that drive its enemies.
#[derive(Debug)]
pub struct Session {
    world: World,
    ai: EnemyAi,
    steps: u64,
}

impl Session {
    /// Creates a session and attaches a brain to every enemy already spawned.
    #[must_use]
    pub fn new(world: World, mut ai: EnemyAi) -> Self {
        for enemy in query::enemy_ids(&world) {
            ai.register(enemy);
        }

        Self {
            world,
            ai,
            steps: 0,
        }
    }

    /// Applies an externally issued command such as player input.
    ///
    /// Resulting events are appended to `out_events` and forwarded to the
    /// enemy brains.
    pub fn submit(&mut self, command: Command, out_events: &mut Vec<Event>) {
        let start = out_events.len();
        world::apply(&mut self.world, command, out_events);
        self.observe_from(start, out_events);
    }

    /// Advances the simulation by exactly one tick.
    pub fn step(&mut self, out_events: &mut Vec<Event>) {
        self.steps = self.steps.saturating_add(1);
        self.submit(Command::Tick, out_events);

        let mut commands = Vec::new();
        for enemy in query::enemy_ids(&self.world) {
            if query::is_game_over(&self.world) {
                break;
            }

            commands.clear();
            self.ai
                .think(enemy, &query::arena_view(&self.world), &mut commands);
            for command in commands.drain(..) {
                self.submit(command, out_events);
            }
        }

        self.submit(Command::CollectPickups, out_events);
    }

    /// Authoritative world state.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Enemy decision engine.
    #[must_use]
    pub const fn ai(&self) -> &EnemyAi {
        &self.ai
    }

    /// Number of ticks stepped since the session started.
    #[must_use]
    pub const fn steps(&self) -> u64 {
        self.steps
    }

    /// Reports whether the player has run out of lives.
    #[must_use]
    pub fn is_over(&self) -> bool {
        query::is_game_over(&self.world)
    }

    fn observe_from(&mut self, start: usize, events: &[Event]) {
        let fresh = events.get(start..).unwrap_or_default();
        for event in fresh {
            match event {
                Event::LevelCleared { level } => {
                    tracing::info!(level = *level, score = query::score(&self.world), "level cleared");
                }
                Event::GameOver { score } => {
                    tracing::info!(score = *score, steps = self.steps, "game over");
                }
                _ => {}
            }
        }
        self.ai.observe(fresh);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bomber_core::{ArenaLayout, CellCoord, Difficulty};
    use bomber_system_enemy_ai::Config as AiConfig;

    fn session(difficulty: Difficulty, seed: u64) -> Session {
        Session::new(
            World::new(world::Config::new(difficulty).with_rng_seed(seed)),
            EnemyAi::new(AiConfig::new(difficulty).with_rng_seed(seed)),
        )
    }

    #[test]
    fn new_session_attaches_a_brain_to_every_enemy() {
        let session = session(Difficulty::Normal, 3);
        let enemies: Vec<_> = session.ai().enemies().collect();

        assert_eq!(enemies, query::enemy_ids(session.world()));
        assert_eq!(enemies.len(), 5);
    }

    #[test]
    fn step_advances_the_clock_once() {
        let mut session = session(Difficulty::Easy, 1);
        let mut events = Vec::new();
        session.step(&mut events);

        assert_eq!(events.first(), Some(&Event::TimeAdvanced { tick: 1 }));
        assert_eq!(
            events
                .iter()
                .filter(|event| matches!(event, Event::TimeAdvanced { .. }))
                .count(),
            1
        );
        assert_eq!(session.steps(), 1);
        assert_eq!(query::tick_index(session.world()), 1);
    }

    #[test]
    fn loaded_layout_replaces_the_brains() {
        let mut session = session(Difficulty::Normal, 8);
        let layout = ArenaLayout::open(11)
            .with_enemy(CellCoord::new(5, 5))
            .with_enemy(CellCoord::new(8, 8));
        let mut events = Vec::new();
        session.submit(Command::LoadLayout { layout }, &mut events);

        let enemies: Vec<_> = session.ai().enemies().collect();
        assert_eq!(enemies.len(), 2);
        assert_eq!(enemies, query::enemy_ids(session.world()));
    }

    #[test]
    fn every_enemy_acts_on_its_first_decision() {
        let mut session = session(Difficulty::Normal, 4);
        let layout = ArenaLayout::open(13)
            .with_enemy(CellCoord::new(6, 6))
            .with_enemy(CellCoord::new(9, 9));
        let mut events = Vec::new();
        session.submit(Command::LoadLayout { layout }, &mut events);
        events.clear();

        session.step(&mut events);
        let acted = events
            .iter()
            .filter(|event| {
                matches!(
                    event,
                    Event::EnemyMoved { .. } | Event::BombPlaced { .. }
                )
            })
            .count();
        assert_eq!(acted, 2);
    }

    #[test]
    fn seeded_sessions_replay_identically() {
        let record = |seed| {
            let mut session = session(Difficulty::Hard, seed);
            let mut events = Vec::new();
            for _ in 0..600 {
                session.step(&mut events);
            }
            events
        };

        assert_eq!(record(21), record(21));
    }
}
