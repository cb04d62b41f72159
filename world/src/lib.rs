#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Bomber.
//!
//! The world owns the tile grid, the hazard registry and every actor. It is
//! mutated exclusively through [`apply`], which reports the outcome of each
//! [`Command`] as a stream of [`Event`] values. Systems observe the world
//! through the [`query`] module.

mod actors;
pub mod blast;
mod grid;
mod hazards;
pub mod navigation;

use bomber_core::{
    ActorRef, ArenaLayout, BombType, CellCoord, Command, Difficulty, DifficultyProfile, Direction,
    EnemyId, Event, PlacementError, TileKind, WELCOME_BANNER,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use actors::{Enemy, HitOutcome, Player};
use grid::{TileGrid, PLAYER_SPAWN};
use hazards::{Bomb, HazardRegistry};

pub use actors::{ENEMY_BOMB_COOLDOWN_TICKS, FREEZE_TICKS};
pub use hazards::{BOMB_FUSE_TICKS, EXPLOSION_TICKS, REMOTE_FUSE_TICKS};

const WALL_SCORE: u32 = 10;
const SKILL_SCORE: u32 = 50;
const ENEMY_SCORE: u32 = 100;
const LEVEL_CLEAR_SCORE: u32 = 500;

const ENEMY_BOMB_RANGE: u32 = 2;
const HARD_ENEMY_BOMB_RANGE: u32 = 3;

/// Configuration applied when a world is created.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    difficulty: Difficulty,
    profile: DifficultyProfile,
    rng_seed: Option<u64>,
    power_up_lifetime: Option<u32>,
}

impl Config {
    /// Creates a configuration using the tier's default profile.
    #[must_use]
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            profile: difficulty.profile(),
            rng_seed: None,
            power_up_lifetime: None,
        }
    }

    /// Replaces the level parameters while keeping the difficulty tier.
    #[must_use]
    pub fn with_profile(mut self, profile: DifficultyProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Seeds the world's random source for reproducible levels.
    #[must_use]
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Gives dropped power-ups a finite lifetime in ticks.
    #[must_use]
    pub fn with_power_up_lifetime(mut self, ticks: u32) -> Self {
        self.power_up_lifetime = Some(ticks);
        self
    }

    /// Difficulty tier of the world.
    #[must_use]
    pub const fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Level parameters used whenever a level is generated.
    #[must_use]
    pub const fn profile(&self) -> &DifficultyProfile {
        &self.profile
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Difficulty::default())
    }
}

/// Represents the authoritative Bomber world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: Config,
    rng: ChaCha8Rng,
    grid: TileGrid,
    hazards: HazardRegistry,
    player: Player,
    enemies: Vec<Enemy>,
    next_enemy: u32,
    level: u32,
    score: u32,
    tick_index: u64,
    game_over: bool,
    level_clear_pending: bool,
}

impl World {
    /// Creates a world and generates its first level.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let size = config.profile.grid_size;
        let mut world = Self {
            banner: WELCOME_BANNER,
            rng,
            grid: TileGrid::with_fixed_walls(size),
            hazards: HazardRegistry::default(),
            player: Player::new(PLAYER_SPAWN),
            enemies: Vec::new(),
            next_enemy: 0,
            level: 1,
            score: 0,
            tick_index: 0,
            game_over: false,
            level_clear_pending: false,
            config,
        };
        let mut discarded = Vec::new();
        world.generate_level(size, &mut discarded);
        world
    }

    fn enemy_bomb_range(&self) -> u32 {
        match self.config.difficulty {
            Difficulty::Hard => HARD_ENEMY_BOMB_RANGE,
            Difficulty::Easy | Difficulty::Normal => ENEMY_BOMB_RANGE,
        }
    }

    fn enemy(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.iter().find(|enemy| enemy.id == id)
    }

    fn enemy_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|enemy| enemy.id == id)
    }

    fn is_walkable(&self, cell: CellCoord) -> bool {
        self.grid.kind(cell) == Some(TileKind::Empty) && !self.hazards.has_bomb(cell)
    }

    fn spawn_enemy(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        let id = EnemyId::new(self.next_enemy);
        self.next_enemy = self.next_enemy.wrapping_add(1);
        self.enemies
            .push(Enemy::new(id, cell, self.enemy_bomb_range()));
        out_events.push(Event::EnemySpawned { enemy: id, cell });
    }

    /// Regenerates the grid at `size` and spawns a fresh enemy wave.
    fn generate_level(&mut self, size: u32, out_events: &mut Vec<Event>) {
        let profile = self.config.profile;
        let generated = grid::generate(size, &profile, &mut self.rng);
        self.grid = generated.grid;
        self.hazards.reset(generated.skills);
        self.enemies.clear();
        self.player.respawn(PLAYER_SPAWN);
        out_events.push(Event::LevelGenerated {
            level: self.level,
            grid_size: size,
        });

        for _ in 0..profile.enemy_count {
            match grid::enemy_spawn(&self.grid, &mut self.rng) {
                Some(cell) => self.spawn_enemy(cell, out_events),
                None => {
                    tracing::warn!(level = self.level, "no free tile left for an enemy spawn");
                    break;
                }
            }
        }
    }

    fn load_layout(&mut self, layout: &ArenaLayout, out_events: &mut Vec<Event>) {
        self.grid = TileGrid::from_layout(layout);
        self.hazards.reset(Vec::new());
        self.player = Player::new(layout.player());
        self.enemies.clear();
        self.level = 1;
        self.score = 0;
        self.level_clear_pending = false;
        out_events.push(Event::LevelGenerated {
            level: self.level,
            grid_size: layout.size(),
        });

        for cell in layout.enemies() {
            self.spawn_enemy(*cell, out_events);
        }
        tracing::debug!(
            size = layout.size(),
            enemies = layout.enemies().len(),
            "loaded arena layout"
        );
    }

    fn advance_tick(&mut self, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced {
            tick: self.tick_index,
        });

        self.player.tick_statuses();
        for enemy in &mut self.enemies {
            enemy.tick_statuses();
        }

        self.hazards.age_effects();
        for bomb in self.hazards.age_bombs() {
            self.detonate(bomb, out_events);
        }

        let _ = self.resolve_contacts(0, out_events);
    }

    /// Moves an actor one tile, reporting whether the step was legal.
    fn try_move(&mut self, actor: ActorRef, direction: Direction, out_events: &mut Vec<Event>) -> bool {
        let from = match actor {
            ActorRef::Player => Some(self.player.cell),
            ActorRef::Enemy(id) => self
                .enemy(id)
                .filter(|enemy| enemy.frozen == 0)
                .map(|enemy| enemy.cell),
        };
        let target = from.and_then(|cell| cell.step(direction));

        let (Some(from), Some(to)) = (from, target.filter(|cell| self.is_walkable(*cell))) else {
            out_events.push(Event::MoveRejected { actor, target });
            return false;
        };

        match actor {
            ActorRef::Player => {
                self.player.cell = to;
                out_events.push(Event::PlayerMoved { from, to });
            }
            ActorRef::Enemy(id) => {
                if let Some(enemy) = self.enemy_mut(id) {
                    enemy.cell = to;
                }
                out_events.push(Event::EnemyMoved {
                    enemy: id,
                    from,
                    to,
                });
            }
        }

        let _ = self.resolve_contacts(0, out_events);
        true
    }

    /// Places a bomb on the owner's tile, reporting whether it was accepted.
    fn try_place_bomb(&mut self, owner: ActorRef, out_events: &mut Vec<Event>) -> bool {
        let placement = match owner {
            ActorRef::Player => self.player_placement(),
            ActorRef::Enemy(id) => self.enemy_placement(id),
        };

        let (cell, kind, range, remote) = match placement {
            Ok(placement) => placement,
            Err(reason) => {
                out_events.push(Event::BombPlacementRejected { owner, reason });
                return false;
            }
        };

        let bomb = self.hazards.add_bomb(owner, cell, kind, range, remote).id;
        match owner {
            ActorRef::Player => self.player.record_bomb_placed(),
            ActorRef::Enemy(id) => {
                if let Some(enemy) = self.enemy_mut(id) {
                    enemy.active_bomb = true;
                }
            }
        }

        out_events.push(Event::BombPlaced {
            bomb,
            owner,
            cell,
            kind,
            range,
            remote,
        });
        true
    }

    fn player_placement(&self) -> Result<(CellCoord, BombType, u32, bool), PlacementError> {
        let cell = self.player.cell;
        if !self.player.can_place_bomb() {
            return Err(PlacementError::CapReached);
        }
        if self.hazards.has_bomb(cell) {
            return Err(PlacementError::TileOccupied);
        }
        Ok((
            cell,
            self.player.active_bomb(),
            self.player.next_bomb_range(),
            self.player.has_remote(),
        ))
    }

    fn enemy_placement(&self, id: EnemyId) -> Result<(CellCoord, BombType, u32, bool), PlacementError> {
        let enemy = self.enemy(id).ok_or(PlacementError::UnknownEnemy)?;
        if enemy.frozen > 0 {
            return Err(PlacementError::Frozen);
        }
        if enemy.active_bomb {
            return Err(PlacementError::CapReached);
        }
        if enemy.bomb_cooldown > 0 {
            return Err(PlacementError::OnCooldown);
        }
        if self.hazards.has_bomb(enemy.cell) {
            return Err(PlacementError::TileOccupied);
        }
        Ok((enemy.cell, BombType::Fire, enemy.bomb_range, false))
    }

    fn detonate(&mut self, bomb: Bomb, out_events: &mut Vec<Event>) {
        let cells = blast::footprint(self.grid.view(), bomb.cell, bomb.range);

        for cell in &cells {
            if self.grid.kind(*cell) != Some(TileKind::Destructible) {
                continue;
            }

            let _ = self.grid.set(*cell, TileKind::Empty);
            self.score = self.score.saturating_add(WALL_SCORE);
            out_events.push(Event::TileDestroyed { cell: *cell });

            if let Some(kind) = self.hazards.reveal_skill(*cell) {
                out_events.push(Event::SkillRevealed { cell: *cell, kind });
            }

            let lifetime = self.config.power_up_lifetime;
            if let Some(kind) = self.hazards.roll_power_up(*cell, &mut self.rng, lifetime) {
                out_events.push(Event::PowerUpSpawned { cell: *cell, kind });
            }
        }

        let first = self.hazards.ignite(&cells, bomb.kind);
        let hit_player = self.resolve_contacts(first, out_events);

        tracing::debug!(
            bomb = bomb.id.get(),
            owner = ?bomb.owner,
            kind = ?bomb.kind,
            tiles = cells.len(),
            hit_player,
            "bomb detonated"
        );
        out_events.push(Event::BombDetonated {
            bomb: bomb.id,
            owner: bomb.owner,
            cell: bomb.cell,
            hit_player,
        });
        self.on_bomb_resolved(bomb.owner);
    }

    /// Releases the owner's bomb slot once its bomb left the live set.
    fn on_bomb_resolved(&mut self, owner: ActorRef) {
        match owner {
            ActorRef::Player => self.player.record_bomb_resolved(),
            ActorRef::Enemy(id) => {
                if let Some(enemy) = self.enemy_mut(id) {
                    enemy.record_bomb_resolved();
                }
            }
        }
    }

    /// Strikes actors standing on explosion tiles from index `first` onwards.
    ///
    /// Returns whether the player was struck.
    fn resolve_contacts(&mut self, first: usize, out_events: &mut Vec<Event>) -> bool {
        let player_cell = self.player.cell;
        let mut player_hits = Vec::new();
        let mut enemy_hits = Vec::new();

        if let Some(explosions) = self.hazards.explosions_mut().get_mut(first..) {
            for explosion in explosions {
                if explosion.cell == player_cell && explosion.strike(ActorRef::Player) {
                    player_hits.push(explosion.kind);
                }

                for enemy in &self.enemies {
                    if enemy.cell == explosion.cell && explosion.strike(ActorRef::Enemy(enemy.id)) {
                        enemy_hits.push((enemy.id, explosion.kind));
                    }
                }
            }
        }

        let hit_player = !player_hits.is_empty();
        for kind in player_hits {
            self.strike_player(kind, out_events);
        }

        for (id, kind) in enemy_hits {
            self.strike_enemy(id, kind, out_events);
        }

        hit_player
    }

    fn strike_player(&mut self, kind: BombType, out_events: &mut Vec<Event>) {
        if self.game_over {
            return;
        }

        match self.player.hit(kind.damage(), kind.effect()) {
            HitOutcome::Absorbed => out_events.push(Event::ShieldAbsorbed),
            HitOutcome::Damaged {
                damage,
                health,
                slowed,
                life_lost,
            } => {
                out_events.push(Event::PlayerDamaged { damage, health });
                if slowed {
                    out_events.push(Event::PlayerSlowed);
                }
                if life_lost {
                    let lives = self.player.lives();
                    out_events.push(Event::LifeLost { lives });
                    if lives == 0 {
                        self.game_over = true;
                        tracing::debug!(score = self.score, "player defeated");
                        out_events.push(Event::GameOver { score: self.score });
                    }
                }
            }
        }
    }

    fn strike_enemy(&mut self, id: EnemyId, kind: BombType, out_events: &mut Vec<Event>) {
        if kind == BombType::Ice {
            if let Some(enemy) = self.enemy_mut(id) {
                enemy.freeze();
                out_events.push(Event::EnemyFrozen { enemy: id });
            }
            return;
        }

        let Some(index) = self.enemies.iter().position(|enemy| enemy.id == id) else {
            return;
        };
        let enemy = self.enemies.remove(index);
        self.score = self.score.saturating_add(ENEMY_SCORE);
        out_events.push(Event::EnemyEliminated {
            enemy: id,
            cell: enemy.cell,
        });

        if self.enemies.is_empty() {
            self.level_clear_pending = true;
        }
    }

    fn detonate_remote_bombs(&mut self, out_events: &mut Vec<Event>) {
        for bomb in self.hazards.take_remote_bombs(ActorRef::Player) {
            self.detonate(bomb, out_events);
        }
    }

    fn collect_pickups(&mut self, out_events: &mut Vec<Event>) {
        let cell = self.player.cell;

        for kind in self.hazards.take_skills_at(cell) {
            self.player.grant_bomb_type(kind);
            self.score = self.score.saturating_add(SKILL_SCORE);
            out_events.push(Event::SkillCollected { kind });
        }

        for kind in self.hazards.take_power_ups_at(cell) {
            self.player.apply_power_up(kind);
            out_events.push(Event::PowerUpCollected { kind });
        }
    }

    fn finish_level_if_cleared(&mut self, out_events: &mut Vec<Event>) {
        if !self.level_clear_pending || !self.enemies.is_empty() || self.game_over {
            return;
        }

        self.level_clear_pending = false;
        self.score = self.score.saturating_add(LEVEL_CLEAR_SCORE);
        out_events.push(Event::LevelCleared { level: self.level });
        tracing::debug!(level = self.level, score = self.score, "level cleared");

        self.level = self.level.saturating_add(1);
        let size = self.grid.size();
        self.generate_level(size, out_events);
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Once the game is over every command is ignored.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.game_over {
        return;
    }

    match command {
        Command::LoadLayout { layout } => world.load_layout(&layout, out_events),
        Command::Tick => world.advance_tick(out_events),
        Command::MovePlayer { direction } => {
            let _ = world.try_move(ActorRef::Player, direction, out_events);
        }
        Command::PlacePlayerBomb => {
            let _ = world.try_place_bomb(ActorRef::Player, out_events);
        }
        Command::CycleBombType => {
            if let Some(kind) = world.player.cycle_bomb_type() {
                out_events.push(Event::BombTypeSelected { kind });
            }
        }
        Command::DetonateRemoteBombs => world.detonate_remote_bombs(out_events),
        Command::StepEnemy { enemy, direction } => {
            let _ = world.try_move(ActorRef::Enemy(enemy), direction, out_events);
        }
        Command::PlaceEnemyBomb { enemy } => {
            let _ = world.try_place_bomb(ActorRef::Enemy(enemy), out_events);
        }
        Command::CollectPickups => world.collect_pickups(out_events),
    }

    world.finish_level_if_cleared(out_events);
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use bomber_core::{
        ActorRef, ArenaView, BombType, CellCoord, Difficulty, DifficultyProfile, EnemyId,
        EnemySnapshot, PlayerSnapshot, TileView,
    };

    use super::World;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Difficulty tier the world was created with.
    #[must_use]
    pub fn difficulty(world: &World) -> Difficulty {
        world.config.difficulty()
    }

    /// Level parameters used for generation.
    #[must_use]
    pub fn profile(world: &World) -> &DifficultyProfile {
        world.config.profile()
    }

    /// Number of ticks simulated so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// One-based counter of the current level.
    #[must_use]
    pub fn level(world: &World) -> u32 {
        world.level
    }

    /// Accumulated score.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.score
    }

    /// Reports whether the player ran out of lives.
    #[must_use]
    pub fn is_game_over(world: &World) -> bool {
        world.game_over
    }

    /// Read-only view of the tile matrix.
    #[must_use]
    pub fn tile_view(world: &World) -> TileView<'_> {
        world.grid.view()
    }

    /// Snapshot of the player's state.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        world.player.snapshot()
    }

    /// Bomb types the player owns, in rotation order.
    #[must_use]
    pub fn owned_bomb_types(world: &World) -> &[BombType] {
        world.player.owned_bombs()
    }

    /// Snapshot of a single enemy, if it is still alive.
    #[must_use]
    pub fn enemy(world: &World, id: EnemyId) -> Option<EnemySnapshot> {
        world.enemy(id).map(|enemy| enemy.snapshot())
    }

    /// Identifiers of every living enemy in ascending order.
    #[must_use]
    pub fn enemy_ids(world: &World) -> Vec<EnemyId> {
        let mut ids: Vec<EnemyId> = world.enemies.iter().map(|enemy| enemy.id).collect();
        ids.sort();
        ids
    }

    /// Tiles holding remote bombs the player may still trigger.
    #[must_use]
    pub fn outstanding_remote_bombs(world: &World) -> Vec<CellCoord> {
        world
            .hazards
            .bombs()
            .iter()
            .filter(|bomb| bomb.remote && bomb.owner == ActorRef::Player)
            .map(|bomb| bomb.cell)
            .collect()
    }

    /// Captures everything an agent may observe this tick.
    #[must_use]
    pub fn arena_view(world: &World) -> ArenaView<'_> {
        ArenaView::new(
            world.grid.view(),
            world.hazards.bomb_snapshots(),
            world.hazards.explosion_snapshots(),
            world.hazards.power_up_snapshots(),
            world.player.snapshot(),
            world.enemies.iter().map(|enemy| enemy.snapshot()).collect(),
        )
    }

    /// Every bomb skill on the level, hidden or revealed.
    #[must_use]
    pub fn skills(world: &World) -> Vec<SkillSnapshot> {
        world
            .hazards
            .skills()
            .iter()
            .map(|skill| SkillSnapshot {
                cell: skill.cell(),
                kind: skill.kind(),
                revealed: skill.is_revealed(),
            })
            .collect()
    }

    /// Vertical float offsets of visible power-ups, for presentation layers.
    #[must_use]
    pub fn power_up_float_offsets(world: &World) -> Vec<(CellCoord, f32)> {
        world
            .hazards
            .power_ups()
            .iter()
            .map(|power_up| (power_up.cell, power_up.float_offset()))
            .collect()
    }

    /// Immutable representation of a bomb skill.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct SkillSnapshot {
        /// Tile holding the skill.
        pub cell: CellCoord,
        /// Bomb type granted on pickup.
        pub kind: BombType,
        /// Whether the covering wall was destroyed.
        pub revealed: bool,
    }
}
